use splinepond::render::{StatusDisplay, status_text};

//==================================================
//=== Window Title
//==================================================

/// Status line shown in the window title
///
/// Writing the title is a round trip to the windowing system, so a new
/// title is only handed out when the text changed.
pub struct TitleStatus {
    prefix: String,
    current: String,
    pending: Option<String>,
}

impl TitleStatus {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            current: String::new(),
            pending: None,
        }
    }

    /// Title to write to the window, if it changed since the last call
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl StatusDisplay for TitleStatus {
    fn show_status(&mut self, segments_per_piece: u32, speed: f32) {
        let title = format!(
            "{} | {}",
            self.prefix,
            status_text(segments_per_piece, speed)
        );

        if title != self.current {
            self.current.clone_from(&title);
            self.pending = Some(title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_written_only_on_change() {
        let mut status = TitleStatus::new("splinepond");

        status.show_status(20, 1.0);
        assert_eq!(
            status.take_pending().as_deref(),
            Some("splinepond | Segments: 20 | Speed: 1.0x")
        );

        status.show_status(20, 1.0);
        assert_eq!(status.take_pending(), None);

        status.show_status(21, 1.0);
        assert_eq!(
            status.take_pending().as_deref(),
            Some("splinepond | Segments: 21 | Speed: 1.0x")
        );
    }

    #[test]
    fn unseen_changes_collapse_into_latest() {
        let mut status = TitleStatus::new("x");
        status.show_status(1, 1.0);
        status.show_status(2, 1.5);
        assert_eq!(
            status.take_pending().as_deref(),
            Some("x | Segments: 2 | Speed: 1.5x")
        );
    }
}
