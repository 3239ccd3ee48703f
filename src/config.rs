//! Tunables of the sketch and the runtime options loaded at startup.
//!
//! The `const` values are fixed behaviour of the curve model, `Options`
//! holds what a user may change through `splinepond.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Curves ──────────────────────────────────────────────────────────

/// Maximum number of control points a single curve accepts.
pub const MAX_CONTROL_POINTS: usize = 256;
/// Fewest control points that form a drawable (and committable) curve.
pub const MIN_CURVE_POINTS: usize = 4;

// ── Animation ───────────────────────────────────────────────────────

/// Hue advance in degrees per elapsed millisecond.
pub const HUE_RATE: f32 = 0.1;
/// Hue wraps back to zero once it reaches this value.
pub const HUE_WRAP: f32 = 360.0;
/// Oscillator time advance per elapsed millisecond (milliseconds to seconds).
pub const SIZE_TIME_RATE: f32 = 0.001;
/// Magnitude of the viewport along each axis, points bounce beyond it.
pub const VIEWPORT_EXTENT: f32 = 1.0;

// ── Speed & Segments ───────────────────────────────────────────────

/// Step of the global speed multiplier per speed-up/speed-down.
pub const SPEED_STEP: f32 = 0.1;
/// Lowest global speed multiplier.
pub const SPEED_FLOOR: f32 = 0.1;
/// Default global speed multiplier.
pub const DEFAULT_SPEED: f32 = 1.0;
/// Default number of segments drawn per curve piece.
pub const DEFAULT_SEGMENTS_PER_PIECE: u32 = 20;

// ── Randomization ───────────────────────────────────────────────────

/// Base speed draw: `BASE_SPEED_SCALE * U(0,1) + BASE_SPEED_OFFSET`.
pub const BASE_SPEED_SCALE: f32 = 0.001;
pub const BASE_SPEED_OFFSET: f32 = 0.0001;
/// Direction perturbation draw: `(U(0,1) - PERTURBATION_BIAS) * PERTURBATION_SCALE`.
pub const PERTURBATION_BIAS: f32 = 0.6;
pub const PERTURBATION_SCALE: f32 = 0.3;
/// Point size range of a new curve (lower bound, span).
pub const BASE_SIZE_MIN: f32 = 2.0;
pub const BASE_SIZE_SPAN: f32 = 20.0;
/// Size oscillation amplitude range (lower bound, span).
pub const SIZE_AMPLITUDE_MIN: f32 = 3.0;
pub const SIZE_AMPLITUDE_SPAN: f32 = 12.0;
/// Size oscillation frequency range (lower bound, span).
pub const SIZE_FREQUENCY_MIN: f32 = 0.5;
pub const SIZE_FREQUENCY_SPAN: f32 = 2.0;

// ── Window ──────────────────────────────────────────────────────────

pub const DEFAULT_WINDOW_WIDTH: u32 = 1024;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 768;
pub const DEFAULT_WINDOW_TITLE: &str = "splinepond";
pub const DEFAULT_CLEAR_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// Name of the options file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "splinepond.toml";

/// Runtime options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,
    /// Segments per piece at startup.
    pub segments_per_piece: u32,
    /// Global speed multiplier at startup.
    pub speed: f32,
    /// Fixed RNG seed, a random one is drawn from the OS when absent.
    pub seed: Option<u64>,
    pub clear_color: [f32; 3],
}

impl Default for Options {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            window_title: DEFAULT_WINDOW_TITLE.to_owned(),
            segments_per_piece: DEFAULT_SEGMENTS_PER_PIECE,
            speed: DEFAULT_SPEED,
            seed: None,
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}

impl Options {
    /// Loads options from a TOML file, falls back to defaults on any failure
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).unwrap_or_else(|e| {
                log::warn!(
                    "Options file {} is malformed, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }),
            Err(_) => {
                log::info!("No options file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parses options and clamps values that would break the sketch
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let mut options: Self = toml::from_str(content)?;
        options.speed = options.speed.max(SPEED_FLOOR);
        options.window_width = options.window_width.max(1);
        options.window_height = options.window_height.max(1);
        Ok(options)
    }

    /// First command line argument, otherwise [`CONFIG_FILE_NAME`] in the working directory
    pub fn config_path() -> PathBuf {
        std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Options::from_toml("").unwrap(), Options::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let options = Options::from_toml("segments_per_piece = 7\nseed = 42\n").unwrap();
        assert_eq!(options.segments_per_piece, 7);
        assert_eq!(options.seed, Some(42));
        assert_eq!(options.speed, DEFAULT_SPEED);
        assert_eq!(options.window_title, DEFAULT_WINDOW_TITLE);
    }

    #[test]
    fn speed_is_floored() {
        let options = Options::from_toml("speed = 0.0").unwrap();
        assert_eq!(options.speed, SPEED_FLOOR);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Options::from_toml("speed = \"fast\"").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let options = Options::load_from_file(Path::new("/nonexistent/splinepond.toml"));
        assert_eq!(options, Options::default());
    }
}
