//! Configuration management for vplotter
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Machine geometry (anchor separation, home cable lengths, gearing)
//! - Drawing placement (offsets, segment length)
//! - Pulse timing for pen-up travel and pen-down drawing
//! - Pen lift servo ramps
//! - Output pin map and pulse backend

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Fixed machine geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometrySettings {
    /// Horizontal distance between the two anchors (mm)
    pub width: f64,
    /// Left cable length at the home position (mm)
    pub left0: f64,
    /// Right cable length at the home position (mm)
    pub right0: f64,
    /// Cable travel per motor revolution (mm)
    pub rot_dist: f64,
    /// Steps per motor revolution
    pub rot_steps: f64,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            left0: 700.0,
            right0: 700.0,
            rot_dist: 40.0,
            rot_steps: 3200.0,
        }
    }
}

/// Placement of the drawing relative to home
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingSettings {
    /// Added to every X coordinate of the program (mm)
    pub offset_x: f64,
    /// Added to every Y coordinate of the program (mm)
    pub offset_y: f64,
    /// Longest straight piece a draw move is split into (mm)
    pub max_segment_length: f64,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            max_segment_length: 1.0,
        }
    }
}

/// Step pulse timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSettings {
    /// Half-period of a step pulse while drawing (microseconds)
    pub pen_down_half_period_us: u64,
    /// Half-period of a step pulse while travelling (microseconds)
    pub pen_up_half_period_us: u64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            pen_down_half_period_us: 800,
            pen_up_half_period_us: 300,
        }
    }
}

/// Pen lift servo ramps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenSettings {
    /// Servo command at the raised extreme (pulse width, microseconds)
    pub up_pulse_us: u32,
    /// Servo command at the lowered extreme (pulse width, microseconds)
    pub down_pulse_us: u32,
    /// Number of ramp increments when lowering
    pub down_ramp_steps: u32,
    /// Number of ramp increments when raising
    pub up_ramp_steps: u32,
    /// Delay after each lowering increment (microseconds)
    pub down_ramp_delay_us: u64,
    /// Delay after each raising increment (microseconds)
    pub up_ramp_delay_us: u64,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            up_pulse_us: 1000,
            down_pulse_us: 1800,
            down_ramp_steps: 80,
            up_ramp_steps: 80,
            down_ramp_delay_us: 5000,
            up_ramp_delay_us: 3000,
        }
    }
}

/// Output pin numbers consumed by the actuator realizations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinSettings {
    pub left_direction: u8,
    pub left_step: u8,
    pub left_enable: u8,
    pub right_direction: u8,
    pub right_step: u8,
    pub right_enable: u8,
    pub servo: u8,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            left_direction: 20,
            left_step: 21,
            left_enable: 16,
            right_direction: 19,
            right_step: 26,
            right_enable: 13,
            servo: 18,
        }
    }
}

impl PinSettings {
    fn all(&self) -> [u8; 7] {
        [
            self.left_direction,
            self.left_step,
            self.left_enable,
            self.right_direction,
            self.right_step,
            self.right_enable,
            self.servo,
        ]
    }
}

/// How step pulses are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseBackend {
    /// Software-timed toggle-and-sleep
    #[default]
    Toggle,
    /// Precomputed waveform played by the output
    Waveform,
}

impl std::fmt::Display for PulseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toggle => write!(f, "toggle"),
            Self::Waveform => write!(f, "waveform"),
        }
    }
}

/// Complete plotter configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: PulseBackend,
    pub geometry: GeometrySettings,
    #[serde(default)]
    pub drawing: DrawingSettings,
    #[serde(default)]
    pub motion: MotionSettings,
    #[serde(default)]
    pub pen: PenSettings,
    #[serde(default)]
    pub pins: PinSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                )
                .into())
            }
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| SettingsError::SaveError(e.to_string()))?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                )
                .into())
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let g = &self.geometry;
        positive("geometry.width", g.width)?;
        positive("geometry.left0", g.left0)?;
        positive("geometry.right0", g.right0)?;
        positive("geometry.rot_dist", g.rot_dist)?;
        positive("geometry.rot_steps", g.rot_steps)?;

        if g.left0 + g.right0 <= g.width
            || g.left0 + g.width <= g.right0
            || g.right0 + g.width <= g.left0
        {
            return Err(ConfigError::InvalidGeometry(format!(
                "width={}, left0={}, right0={} do not form a triangle",
                g.width, g.left0, g.right0
            )));
        }

        positive("drawing.max_segment_length", self.drawing.max_segment_length)?;
        if !self.drawing.offset_x.is_finite() || !self.drawing.offset_y.is_finite() {
            return Err(ConfigError::ValueOutOfRange {
                key: "drawing.offset".to_string(),
                value: format!("({}, {})", self.drawing.offset_x, self.drawing.offset_y),
            });
        }

        if self.pen.down_ramp_steps == 0 {
            return Err(out_of_range("pen.down_ramp_steps", 0));
        }
        if self.pen.up_ramp_steps == 0 {
            return Err(out_of_range("pen.up_ramp_steps", 0));
        }

        let pins = self.pins.all();
        let unique: HashSet<u8> = pins.iter().copied().collect();
        if unique.len() != pins.len() {
            return Err(ConfigError::ValueOutOfRange {
                key: "pins".to_string(),
                value: format!("{:?} contains duplicates", pins),
            });
        }

        Ok(())
    }

    /// Half-period for pen-down drawing pulses
    pub fn pen_down_half_period(&self) -> Duration {
        Duration::from_micros(self.motion.pen_down_half_period_us)
    }

    /// Half-period for pen-up travel pulses
    pub fn pen_up_half_period(&self) -> Duration {
        Duration::from_micros(self.motion.pen_up_half_period_us)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(key, value))
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
