use super::ambient::Ambient;
use super::curve::Curve;
use super::point::Point;
use glam::Vec2;
use rand::Rng;

/// Result of offering a point to the curve in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// The curve already holds the maximum number of points
    Full,
}

/// Result of [`CurveRegistry::commit_if_eligible`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The curve had too few points and was dropped
    Discarded,
}

/// Committed curves in render order plus the one curve being collected
#[derive(Debug, Clone)]
pub struct CurveRegistry {
    committed: Vec<Curve>,
    in_progress: Curve,
}

impl CurveRegistry {
    /// Creates an empty registry whose curve in progress does not drift
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            committed: Vec::new(),
            in_progress: Curve::new(Vec2::ZERO, 0.0, rng),
        }
    }

    /// Replaces the curve in progress with a fresh empty one
    pub fn begin_new_curve(&mut self, velocity: Vec2, point_speed: f32, rng: &mut impl Rng) {
        self.in_progress = Curve::new(velocity, point_speed, rng);
    }

    /// Commits the curve in progress when it is drawable, then starts the next one
    ///
    /// A curve below four points is dropped for good.
    pub fn commit_if_eligible(&mut self, next: &Ambient, rng: &mut impl Rng) -> CommitOutcome {
        let finished = std::mem::replace(&mut self.in_progress, Curve::with_ambient(next, rng));

        if finished.is_drawable() {
            log::info!(
                "Committed curve #{} with {} points",
                self.committed.len(),
                finished.len()
            );
            self.committed.push(finished);
            CommitOutcome::Committed
        } else {
            log::debug!("Discarded curve with {} points", finished.len());
            CommitOutcome::Discarded
        }
    }

    /// Drops every curve and starts over with a curve that does not drift
    pub fn reset_all(&mut self, rng: &mut impl Rng) {
        self.committed.clear();
        self.begin_new_curve(Vec2::ZERO, 0.0, rng);
    }

    /// Adds a point to the curve in progress unless it is full
    pub fn append_point(&mut self, position: Vec2, direction: Vec2) -> AppendOutcome {
        if self.in_progress.is_full() {
            log::warn!("Maximum number of control points reached, point dropped");
            return AppendOutcome::Full;
        }

        self.in_progress.append(Point::new(position, direction));
        AppendOutcome::Appended
    }

    pub fn committed(&self) -> &[Curve] {
        &self.committed
    }

    pub fn committed_mut(&mut self) -> &mut [Curve] {
        &mut self.committed
    }

    pub fn in_progress(&self) -> &Curve {
        &self.in_progress
    }

    /// Committed curves followed by the curve in progress
    pub fn iter(&self) -> impl Iterator<Item = &Curve> {
        self.committed
            .iter()
            .chain(std::iter::once(&self.in_progress))
    }
}
