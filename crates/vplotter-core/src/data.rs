//! Data models for the plotter
//!
//! This module provides:
//! - Cartesian pen position in drawing coordinates
//! - Absolute cable lengths
//! - Pen and job run states
//! - Motor axis identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pen-tip position in drawing coordinates (millimetres)
///
/// The origin is the home position. X grows to the right, Y grows
/// upwards towards the anchors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
}

impl Position {
    /// The home position
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite(),
            "Position must be finite: x={x}, y={y}"
        );
        Self { x, y }
    }

    /// Euclidean distance to another position
    pub fn distance_to(&self, other: &Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at parameter `t` on the segment from `self` to `other`
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Translate by an offset
    pub fn offset(&self, dx: f64, dy: f64) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3}", self.x, self.y)
    }
}

/// Absolute cable lengths from each anchor to the pen carriage
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CableLengths {
    pub left: f64,
    pub right: f64,
}

impl CableLengths {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

impl fmt::Display for CableLengths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L:{:.3} R:{:.3}", self.left, self.right)
    }
}

/// Pen lift state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PenState {
    /// Pen lifted off the paper (travel)
    #[default]
    Up,
    /// Pen touching the paper (draw)
    Down,
}

impl fmt::Display for PenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PenState::Up => write!(f, "Up"),
            PenState::Down => write!(f, "Down"),
        }
    }
}

/// Lifecycle of a plotting job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// No job started
    #[default]
    Idle,
    /// Streaming program lines
    Running,
    /// Stopped early at a line boundary on request
    Cancelled,
    /// Reached end of program or M2
    Completed,
    /// Aborted by a fatal error
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "Idle"),
            RunState::Running => write!(f, "Running"),
            RunState::Cancelled => write!(f, "Cancelled"),
            RunState::Completed => write!(f, "Completed"),
            RunState::Failed => write!(f, "Failed"),
        }
    }
}

/// One of the two cable motors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Left,
    Right,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Left => write!(f, "left"),
            Axis::Right => write!(f, "right"),
        }
    }
}

/// Set of axes stepped together by one pulse train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisSet {
    Left,
    Right,
    Both,
}

impl AxisSet {
    /// Whether the set steps the given axis
    pub fn contains(&self, axis: Axis) -> bool {
        matches!(
            (self, axis),
            (AxisSet::Both, _) | (AxisSet::Left, Axis::Left) | (AxisSet::Right, Axis::Right)
        )
    }
}

impl From<Axis> for AxisSet {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::Left => AxisSet::Left,
            Axis::Right => AxisSet::Right,
        }
    }
}
