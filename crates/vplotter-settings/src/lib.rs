//! vplotter Settings Crate
//!
//! Handles machine configuration: geometry, drawing offsets, pulse timing,
//! pen ramp parameters and the output pin map.

pub mod config;
pub mod error;

pub use config::{
    Config, DrawingSettings, GeometrySettings, MotionSettings, PenSettings, PinSettings,
    PulseBackend,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
