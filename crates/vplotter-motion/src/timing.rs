//! Duration arithmetic for pulse trains and pen ramps
//!
//! Pure functions only. Waiting is done by a [`Pacer`](crate::pacer::Pacer),
//! so the time estimator can share these without ever sleeping.

use std::time::Duration;

/// Duration of `pulses` full step periods (two half-periods each)
pub fn pulse_train_duration(pulses: u64, half_period: Duration) -> Duration {
    let nanos = half_period.as_nanos() * 2 * u128::from(pulses);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Duration of a pen ramp with `steps` increments
pub fn ramp_duration(steps: u32, delay: Duration) -> Duration {
    delay.checked_mul(steps).unwrap_or(Duration::MAX)
}

/// Duration in fractional minutes
pub fn as_minutes(duration: Duration) -> f64 {
    duration.as_secs_f64() / 60.0
}
