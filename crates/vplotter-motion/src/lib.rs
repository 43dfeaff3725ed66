//! # vplotter Motion
//!
//! Everything between a Cartesian target and the motor step pins:
//! - Triangulation kinematics (position <-> cable length <-> steps)
//! - Segmentation of draw moves
//! - Fractional step carry and pulse planning
//! - The actuator interface and its toggle/waveform realizations
//! - Pen lift ramps
//! - The synchronized step driver and the `Plotter` facade

pub mod actuator;
pub mod driver;
pub mod kinematics;
pub mod pacer;
pub mod pen;
pub mod plotter;
pub mod pulse;
pub mod segmenter;
pub mod steps;
pub mod timing;

pub use actuator::{
    Actuator, DigitalOutput, ToggleActuator, TracingOutput, WaveformActuator, WaveformOutput,
    WavePulse,
};
pub use driver::{MoveSummary, StepDriver};
pub use kinematics::{triangulate, MachineGeometry, MAX_CABLE_STEPS};
pub use pacer::{NoopPacer, Pacer, RealtimePacer};
pub use pen::{PenController, PenRamp};
pub use plotter::Plotter;
pub use pulse::PulsePlan;
pub use segmenter::{plan, MoveMode, Segments};
pub use steps::{SegmentSteps, StepCarry, StepCounters};
