//! Curve model, its animation and the mode state machine.
//!
//! [`Sketch`] owns all mutable state. Input events and ticks both run on the
//! thread driving the event loop, one after the other, so every tick sees a
//! consistent snapshot.

pub mod ambient;
pub mod animation;
pub mod basis;
pub mod curve;
pub mod mode;
pub mod point;
pub mod registry;

pub use ambient::Ambient;
pub use basis::BasisFamily;
pub use curve::Curve;
pub use mode::{Effect, InputEvent, ModeState};
pub use point::Point;
pub use registry::{AppendOutcome, CommitOutcome, CurveRegistry};

use crate::config::Options;
use crate::render::{CurveDraw, Frame};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub struct Sketch {
    mode: ModeState,
    registry: CurveRegistry,
    ambient: Ambient,
    rng: StdRng,
}

impl Sketch {
    /// Creates a [`Sketch`] from the startup options
    pub fn new(options: &Options) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self::with_rng(
            ModeState::new(options.segments_per_piece, options.speed),
            rng,
        )
    }

    pub fn with_rng(mode: ModeState, mut rng: StdRng) -> Self {
        Self {
            mode,
            registry: CurveRegistry::new(&mut rng),
            ambient: Ambient::default(),
            rng,
        }
    }

    /// Applies one input event to the mode flags and the curves
    pub fn handle(&mut self, event: InputEvent) {
        let (mode, effect) = self.mode.apply(event);
        if mode != self.mode {
            log::debug!("{event:?} -> {mode:?}");
        }
        self.mode = mode;

        match effect {
            Effect::None => (),
            Effect::ResetAll => {
                log::info!("Clearing all curves");
                self.registry.reset_all(&mut self.rng);
            }
            Effect::CommitAndRestart => {
                self.ambient = Ambient::random(&mut self.rng);
                log::debug!("New ambient motion {:?}", self.ambient);
                self.registry
                    .commit_if_eligible(&self.ambient, &mut self.rng);
            }
            Effect::AppendPoint(position) => {
                self.registry
                    .append_point(position, self.ambient.direction);
            }
        }
    }

    /// Runs the animation step with the elapsed milliseconds of this tick
    pub fn tick(&mut self, elapsed: f32) {
        animation::step(&mut self.registry, &self.mode, elapsed);
    }

    /// Plain data snapshot of everything the renderer needs for this tick
    pub fn frame(&self) -> Frame {
        let basis = self.mode.basis;
        let segments_per_piece = self.mode.segments_per_piece;

        Frame {
            basis,
            segments_per_piece,
            show_samples: self.mode.show_samples,
            show_segments: self.mode.show_segments,
            curves: self
                .registry
                .iter()
                .map(|curve| CurveDraw {
                    control_points: curve.positions(),
                    hue: curve.hue(),
                    brightness: curve.brightness(),
                    point_size: curve.point_size(),
                    sample_count: curve.sample_count_for(basis, segments_per_piece),
                })
                .collect(),
        }
    }

    pub fn mode(&self) -> &ModeState {
        &self.mode
    }

    pub fn registry(&self) -> &CurveRegistry {
        &self.registry
    }

    pub fn ambient(&self) -> &Ambient {
        &self.ambient
    }
}
