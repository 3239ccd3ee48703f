use super::mode::ModeState;
use super::registry::CurveRegistry;

/// Advances every committed curve by `elapsed` milliseconds
///
/// Does nothing while paused. All curves share the same `elapsed`, the
/// curve in progress stays where it was drawn until it is committed.
pub fn step(registry: &mut CurveRegistry, mode: &ModeState, elapsed: f32) {
    if mode.paused {
        return;
    }

    for curve in registry.committed_mut() {
        curve.advance(elapsed, mode.speed, mode.size_oscillation);
    }
}
