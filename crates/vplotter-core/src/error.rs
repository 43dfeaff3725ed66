//! Error handling for vplotter
//!
//! Provides error types for all layers of the plotter:
//! - Geometry errors (triangulation and cable reconstruction)
//! - G-Code errors (malformed program lines)
//! - Actuator errors (output pins, waveform playback)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when the machine geometry or a requested position has no
/// physical solution. Always fatal for the job in progress.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Anchor separation and home cable lengths do not form a triangle
    #[error("Invalid machine triangle: width={width}, left0={left0}, right0={right0}")]
    InvalidTriangle {
        /// Horizontal distance between the two anchors.
        width: f64,
        /// Home length of the left cable.
        left0: f64,
        /// Home length of the right cable.
        right0: f64,
    },

    /// Cable lengths cannot be triangulated back into a point
    #[error("Unreachable cable lengths: left={left:.3}, right={right:.3}")]
    Unreachable {
        /// Absolute left cable length.
        left: f64,
        /// Absolute right cable length.
        right: f64,
    },

    /// A cable length reconstructed from step counts went negative
    #[error("Negative {axis} cable length: {length:.3}")]
    NegativeCable {
        /// The axis whose cable went negative.
        axis: String,
        /// The computed length.
        length: f64,
    },
}

/// G-Code error type
///
/// Represents failures while reading or interpreting a program line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A motion operand is missing or is not a number
    #[error("Malformed line {line_number}: {reason}")]
    MalformedLine {
        /// The 1-based line number.
        line_number: usize,
        /// Why the line could not be interpreted.
        reason: String,
    },

    /// The program could not be read
    #[error("Failed to read program: {reason}")]
    Io {
        /// The underlying read failure.
        reason: String,
    },
}

/// Actuator error type
///
/// Failures reported by the hardware collaborator. Hardware operations
/// are not retried; a failed job is restarted from the beginning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActuatorError {
    /// The output rejected a pin number
    #[error("Invalid output pin {pin}")]
    InvalidPin {
        /// The offending pin.
        pin: u8,
    },

    /// Writing an output level or servo command failed
    #[error("Output error: {reason}")]
    Output {
        /// The reason reported by the output.
        reason: String,
    },

    /// A precomputed waveform could not be played
    #[error("Waveform error: {reason}")]
    Waveform {
        /// The reason reported by the output.
        reason: String,
    },
}

/// Main error type for vplotter
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Actuator error
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

impl Error {
    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is an actuator error
    pub fn is_actuator_error(&self) -> bool {
        matches!(self, Error::Actuator(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
