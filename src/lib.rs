//! # vplotter
//!
//! Drives a two-motor, cable-suspended drawing machine (V-plotter) from a
//! G-code program.
//!
//! ## Architecture
//!
//! vplotter is organized as a workspace with multiple crates:
//!
//! 1. **vplotter-core** - Error types, data model, cancellation token
//! 2. **vplotter-settings** - Configuration files and validation
//! 3. **vplotter-motion** - Kinematics, step generation, pen control, actuators
//! 4. **vplotter-gcode** - Parser, job runner, time estimator
//! 5. **vplotter** - Command line binary that integrates all crates

pub use vplotter_core::{
    ActuatorError, CancellationToken, Error, GcodeError, GeometryError, PenState, Position,
    Result, RunState,
};
pub use vplotter_gcode::{JobReport, JobRunner, TimeEstimate, TimeEstimator};
pub use vplotter_motion::{
    Actuator, MoveMode, NoopPacer, Pacer, Plotter, RealtimePacer, ToggleActuator, TracingOutput,
    WaveformActuator,
};
pub use vplotter_settings::{Config, PulseBackend};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout for results
/// - RUST_LOG environment variable support, INFO by default
/// - Pretty or JSON formatting
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
            .pretty();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Bind the configured pulse backend to an output.
///
/// Pin writes go to a [`TracingOutput`]. Dry runs skip all waiting; real
/// runs pace pulses and ramps in real time.
pub fn build_actuator(
    config: &Config,
    dry_run: bool,
) -> std::result::Result<Box<dyn Actuator>, ActuatorError> {
    let pacer: Box<dyn Pacer> = if dry_run {
        Box::new(NoopPacer)
    } else {
        Box::new(RealtimePacer)
    };
    let output = TracingOutput::new();
    let pins = config.pins.clone();

    tracing::debug!(backend = %config.backend, dry_run, "Binding actuator");
    let actuator: Box<dyn Actuator> = match config.backend {
        PulseBackend::Toggle => Box::new(ToggleActuator::acquire(output, pins, pacer)?),
        PulseBackend::Waveform => Box::new(WaveformActuator::acquire(output, pins, pacer)?),
    };
    Ok(actuator)
}
