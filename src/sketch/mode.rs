use super::basis::BasisFamily;
use crate::config::*;
use glam::Vec2;

/// Logical input delivered by the window layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    IncreaseSegments,
    DecreaseSegments,
    Clear,
    SpeedUp,
    SpeedDown,
    TogglePause,
    ToggleSamples,
    ToggleSegments,
    ToggleCollect,
    SelectBezier,
    SelectCatmullRom,
    ToggleSizeOscillation,
    /// Pointer went down at a position in normalized device coordinates
    PointerPressed(Vec2),
    /// Pointer moved with the button held
    PointerDragged(Vec2),
}

/// What the registry has to do after a mode transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    /// Drop every curve
    ResetAll,
    /// Commit the curve in progress if eligible and start a new one
    CommitAndRestart,
    /// Add a point to the curve in progress
    AppendPoint(Vec2),
}

/// Global mode flags, folded from input events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeState {
    pub paused: bool,
    pub show_segments: bool,
    pub show_samples: bool,
    pub collecting_points: bool,
    pub size_oscillation: bool,
    pub basis: BasisFamily,
    pub segments_per_piece: u32,
    pub speed: f32,
}

impl Default for ModeState {
    fn default() -> Self {
        Self {
            paused: true,
            show_segments: true,
            show_samples: false,
            collecting_points: false,
            size_oscillation: false,
            basis: BasisFamily::Spline,
            segments_per_piece: DEFAULT_SEGMENTS_PER_PIECE,
            speed: DEFAULT_SPEED,
        }
    }
}

impl ModeState {
    pub fn new(segments_per_piece: u32, speed: f32) -> Self {
        Self {
            segments_per_piece,
            speed: speed.max(SPEED_FLOOR),
            ..Self::default()
        }
    }

    /// Returns the next state and the registry effect of `event`
    pub fn apply(self, event: InputEvent) -> (Self, Effect) {
        let mut next = self;
        let effect = match event {
            InputEvent::IncreaseSegments => {
                next.segments_per_piece = next.segments_per_piece.saturating_add(1);
                Effect::None
            }
            InputEvent::DecreaseSegments => {
                next.segments_per_piece = next.segments_per_piece.saturating_sub(1);
                Effect::None
            }
            InputEvent::Clear => Effect::ResetAll,
            InputEvent::SpeedUp => {
                next.speed += SPEED_STEP;
                Effect::None
            }
            InputEvent::SpeedDown => {
                next.speed = (next.speed - SPEED_STEP).max(SPEED_FLOOR);
                Effect::None
            }
            InputEvent::TogglePause => {
                next.paused = !next.paused;
                Effect::None
            }
            InputEvent::ToggleSamples => {
                next.show_samples = !next.show_samples;
                Effect::None
            }
            InputEvent::ToggleSegments => {
                next.show_segments = !next.show_segments;
                Effect::None
            }
            InputEvent::ToggleCollect => {
                next.collecting_points = !next.collecting_points;
                Effect::CommitAndRestart
            }
            InputEvent::SelectBezier => {
                next.basis = BasisFamily::Bezier;
                Effect::None
            }
            InputEvent::SelectCatmullRom => {
                next.basis = BasisFamily::CatmullRom;
                Effect::None
            }
            InputEvent::ToggleSizeOscillation => {
                next.size_oscillation = !next.size_oscillation;
                Effect::None
            }
            InputEvent::PointerPressed(position) | InputEvent::PointerDragged(position) => {
                if next.collecting_points {
                    Effect::AppendPoint(position)
                } else {
                    Effect::None
                }
            }
        };

        (next, effect)
    }
}
