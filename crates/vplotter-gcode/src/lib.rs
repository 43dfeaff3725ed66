//! # vplotter G-Code
//!
//! Turns a G-code program into plotter motion:
//! - Line parsing for the plotter command subset
//! - The job runner state machine with cooperative cancellation
//! - A hardware-free plot time estimator

pub mod estimator;
pub mod job;
pub mod parser;

pub use estimator::{TimeEstimate, TimeEstimator};
pub use job::{JobReport, JobRunner};
pub use parser::{parse_line, Command, Program};
