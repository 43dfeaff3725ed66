//! # vplotter Core
//!
//! Core types and utilities shared by every vplotter crate.
//! Provides the error hierarchy, the plotter data model and the
//! cancellation token handed to a running job.

pub mod cancel;
pub mod data;
pub mod error;

pub use cancel::CancellationToken;

pub use data::{Axis, AxisSet, CableLengths, PenState, Position, RunState};

pub use error::{ActuatorError, Error, GcodeError, GeometryError, Result};
