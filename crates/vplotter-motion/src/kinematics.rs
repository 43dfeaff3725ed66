//! Triangulation kinematics
//!
//! The pen hangs from two anchors `width` apart. In anchor space the left
//! anchor sits at the origin and the right anchor at `(width, 0)`, with the
//! home position at `(x0, y0)` below them. Drawing coordinates are relative
//! to home, with Y pointing up towards the anchors.

use serde::{Deserialize, Serialize};
use vplotter_core::{Axis, CableLengths, GeometryError, Position};
use vplotter_settings::GeometrySettings;

/// Longest cable, in steps from its anchor, a target may require.
///
/// Step counters track the cable length relative to home, so bounding the
/// absolute length keeps every count and pulse train far inside `i64`.
pub const MAX_CABLE_STEPS: f64 = i32::MAX as f64;

/// Locate the home position from the anchor separation and home cable lengths.
///
/// Returns `(x0, y0)`, the home position measured from the left anchor,
/// with `y0` pointing down.
pub fn triangulate(width: f64, left0: f64, right0: f64) -> Result<(f64, f64), GeometryError> {
    let invalid = || GeometryError::InvalidTriangle {
        width,
        left0,
        right0,
    };

    if !(width > 0.0 && left0 > 0.0 && right0 > 0.0) {
        return Err(invalid());
    }

    let x0 = (width.powi(2) - right0.powi(2) + left0.powi(2)) / (2.0 * width);
    let discriminant = left0.powi(2) - x0.powi(2);
    if !(discriminant > 0.0) {
        return Err(invalid());
    }

    Ok((x0, discriminant.sqrt()))
}

/// Fixed geometry of one machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineGeometry {
    width: f64,
    left0: f64,
    right0: f64,
    rot_dist: f64,
    rot_steps: f64,
    x0: f64,
    y0: f64,
}

impl MachineGeometry {
    pub fn new(
        width: f64,
        left0: f64,
        right0: f64,
        rot_dist: f64,
        rot_steps: f64,
    ) -> Result<Self, GeometryError> {
        let (x0, y0) = triangulate(width, left0, right0)?;
        if !(rot_dist > 0.0 && rot_steps > 0.0) {
            return Err(GeometryError::InvalidTriangle {
                width,
                left0,
                right0,
            });
        }
        Ok(Self {
            width,
            left0,
            right0,
            rot_dist,
            rot_steps,
            x0,
            y0,
        })
    }

    pub fn from_settings(settings: &GeometrySettings) -> Result<Self, GeometryError> {
        Self::new(
            settings.width,
            settings.left0,
            settings.right0,
            settings.rot_dist,
            settings.rot_steps,
        )
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Home position measured from the left anchor (y pointing down)
    pub fn origin_offset(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    /// Home cable lengths
    pub fn home_lengths(&self) -> CableLengths {
        CableLengths::new(self.left0, self.right0)
    }

    /// Cable travel produced by a single step
    pub fn step_length(&self) -> f64 {
        self.rot_dist / self.rot_steps
    }

    /// Absolute cable lengths for a drawing position
    pub fn cable_lengths(&self, p: Position) -> CableLengths {
        let ax = p.x + self.x0;
        let ay = self.y0 - p.y;
        CableLengths::new(ax.hypot(ay), (self.width - ax).hypot(ay))
    }

    /// Cable lengths for a position the carriage can actually hang at,
    /// strictly below the anchor line and within [`MAX_CABLE_STEPS`].
    pub fn reachable_cable_lengths(&self, p: Position) -> Result<CableLengths, GeometryError> {
        let lengths = self.cable_lengths(p);
        let (left_steps, right_steps) = self.steps_from_delta(lengths.left, lengths.right);
        let within_reach =
            left_steps.abs() <= MAX_CABLE_STEPS && right_steps.abs() <= MAX_CABLE_STEPS;
        if !(p.x.is_finite() && self.y0 - p.y > 0.0 && within_reach) {
            return Err(GeometryError::Unreachable {
                left: lengths.left,
                right: lengths.right,
            });
        }
        Ok(lengths)
    }

    /// Change in cable lengths when moving from `from` to `to`
    pub fn cable_delta(&self, from: Position, to: Position) -> (f64, f64) {
        let a = self.cable_lengths(from);
        let b = self.cable_lengths(to);
        (b.left - a.left, b.right - a.right)
    }

    /// Convert cable length deltas into (fractional) motor steps
    pub fn steps_from_delta(&self, d_left: f64, d_right: f64) -> (f64, f64) {
        (
            d_left / self.rot_dist * self.rot_steps,
            d_right / self.rot_dist * self.rot_steps,
        )
    }

    /// Reconstruct a drawing position from step counts accumulated since home.
    pub fn position_from_steps(
        &self,
        cum_left: i64,
        cum_right: i64,
    ) -> Result<Position, GeometryError> {
        let left = cum_left as f64 / self.rot_steps * self.rot_dist + self.left0;
        let right = cum_right as f64 / self.rot_steps * self.rot_dist + self.right0;

        for (axis, length) in [(Axis::Left, left), (Axis::Right, right)] {
            if length < 0.0 {
                return Err(GeometryError::NegativeCable {
                    axis: axis.to_string(),
                    length,
                });
            }
        }

        let x = (self.width.powi(2) + left.powi(2) - right.powi(2)) / (2.0 * self.width);
        let discriminant = right.powi(2) - (self.width - x).powi(2);
        if discriminant < 0.0 {
            return Err(GeometryError::Unreachable { left, right });
        }
        let y = discriminant.sqrt();

        Ok(Position::new(x - self.x0, self.y0 - y))
    }
}
