/// ### Screen coordinate system
///
/// Physical pixels as reported by the window.
///
/// - Origin = Top-left corner
/// - Right-plane = Window width
/// - Bottom-plane = Window height
///
/// ```
/// //   0,0 __________ w,0
/// //      |         |
/// //      | w/2,h/2 |
/// //  0,h |_________| w,h
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScreenPos2D(glam::Vec2);

impl std::ops::Deref for ScreenPos2D {
    type Target = glam::Vec2;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ScreenPos2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self(glam::vec2(x, y))
    }
}

/// ### Normalized device coordinate system
///
/// Y grows upwards, the window spans `[-1, 1]` on both axes regardless of
/// its aspect ratio. Curves live here.
///
/// ```
/// //   -1,1 __________ 1,1
/// //       |         |
/// //       |   0,0   |
/// // -1,-1 |_________| 1,-1
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NdcPos2D(glam::Vec2);

impl std::ops::Deref for NdcPos2D {
    type Target = glam::Vec2;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl NdcPos2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self(glam::vec2(x, y))
    }

    /// NDC position of `screen_position`, `None` for an empty window
    pub fn from_screen_pos(
        window_size: &winit::dpi::PhysicalSize<u32>,
        screen_position: ScreenPos2D,
    ) -> Option<Self> {
        let (width, height) = extent(window_size)?;

        let ndc_x = screen_position.x / width * 2.0 - 1.0;
        let ndc_y = -(screen_position.y / height * 2.0 - 1.0);

        Some(Self::new(ndc_x, ndc_y))
    }

    pub fn to_vec2(self) -> glam::Vec2 {
        self.0
    }
}

fn extent(window_size: &winit::dpi::PhysicalSize<u32>) -> Option<(f32, f32)> {
    if window_size.width == 0 || window_size.height == 0 {
        return None;
    }
    Some((window_size.width as f32, window_size.height as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use winit::dpi::PhysicalSize;

    #[test]
    fn test_ndc_pos_2d() {
        let window_size = PhysicalSize::new(800u32, 600u32);

        let cases = [
            // Top left corner
            ((0., 0.), (-1., 1.)),
            // Top side middle
            ((400., 0.), (0., 1.)),
            // Center
            ((400., 300.), (0., 0.)),
            // Right side middle
            ((800., 300.), (1., 0.)),
            // Bottom left corner
            ((0., 600.), (-1., -1.)),
            // Bottom right corner
            ((800., 600.), (1., -1.)),
            // Outside the window
            ((-400., 900.), (-2., -2.)),
        ];

        for ((sx, sy), (nx, ny)) in cases {
            let ndc_pos =
                NdcPos2D::from_screen_pos(&window_size, ScreenPos2D::new(sx, sy)).unwrap();
            assert_relative_eq!(ndc_pos.x, nx);
            assert_relative_eq!(ndc_pos.y, ny);
        }
    }

    #[test]
    fn aspect_ratio_is_ignored() {
        let wide = PhysicalSize::new(1600u32, 400u32);
        let ndc_pos = NdcPos2D::from_screen_pos(&wide, ScreenPos2D::new(1200., 100.)).unwrap();
        assert_relative_eq!(ndc_pos.x, 0.5);
        assert_relative_eq!(ndc_pos.y, 0.5);
    }

    #[test]
    fn empty_window_has_no_mapping() {
        let empty = PhysicalSize::new(0u32, 600u32);
        assert!(NdcPos2D::from_screen_pos(&empty, ScreenPos2D::new(10., 10.)).is_none());
    }
}
