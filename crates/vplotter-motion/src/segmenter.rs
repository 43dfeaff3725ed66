//! Subdivision of moves into waypoints
//!
//! Draw moves are cut into equal pieces no longer than the configured
//! maximum so the cable kinematics approximate a straight line. Travel
//! moves go straight to the target in a single waypoint.

use serde::{Deserialize, Serialize};
use vplotter_core::Position;

/// Whether a move draws or travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveMode {
    /// Pen up, no subdivision, fast pulses
    Travel,
    /// Pen down, subdivided, slow pulses
    Draw,
}

/// Ordered waypoints of one move, excluding the start point
///
/// Cloning yields an independent iterator from the same position, so a
/// plan can be replayed.
#[derive(Debug, Clone)]
pub struct Segments {
    from: Position,
    to: Position,
    count: usize,
    next: usize,
}

impl Segments {
    /// Total number of waypoints in the plan
    pub fn total(&self) -> usize {
        self.count
    }

    /// Restart from the first waypoint
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl Iterator for Segments {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.next >= self.count {
            return None;
        }
        self.next += 1;
        if self.next == self.count {
            Some(self.to)
        } else {
            Some(
                self.from
                    .lerp(&self.to, self.next as f64 / self.count as f64),
            )
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Segments {}

/// Plan the waypoints for a move from `from` to `to`.
///
/// A zero-length draw produces no waypoints; a travel always produces
/// exactly one.
pub fn plan(from: Position, to: Position, max_len: f64, mode: MoveMode) -> Segments {
    let count = match mode {
        MoveMode::Travel => 1,
        MoveMode::Draw => (from.distance_to(&to) / max_len).ceil() as usize,
    };
    Segments {
        from,
        to,
        count,
        next: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_travel_is_single_waypoint() {
        let to = Position::new(123.0, -45.0);
        let waypoints: Vec<_> = plan(Position::ORIGIN, to, 1.0, MoveMode::Travel).collect();
        assert_eq!(waypoints, vec![to]);
    }

    #[test]
    fn test_draw_subdivides() {
        let to = Position::new(0.0, 10.0);
        let waypoints: Vec<_> = plan(Position::ORIGIN, to, 3.0, MoveMode::Draw).collect();
        assert_eq!(waypoints.len(), 4);
        assert_eq!(waypoints[0], Position::new(0.0, 2.5));
        assert_eq!(waypoints[3], to);
    }

    #[test]
    fn test_zero_length_draw_is_empty() {
        let p = Position::new(5.0, 5.0);
        assert_eq!(plan(p, p, 1.0, MoveMode::Draw).total(), 0);
    }

    #[test]
    fn test_segments_restart() {
        let mut segments = plan(Position::ORIGIN, Position::new(4.0, 0.0), 1.0, MoveMode::Draw);
        let first: Vec<_> = segments.by_ref().collect();
        assert_eq!(segments.len(), 0);
        segments.restart();
        let second: Vec<_> = segments.collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_draw_plan_shape(
            x0 in -500.0f64..500.0, y0 in -500.0f64..500.0,
            x1 in -500.0f64..500.0, y1 in -500.0f64..500.0,
            max_len in 0.1f64..50.0,
        ) {
            let from = Position::new(x0, y0);
            let to = Position::new(x1, y1);
            let expected = (from.distance_to(&to) / max_len).ceil() as usize;

            let waypoints: Vec<_> = plan(from, to, max_len, MoveMode::Draw).collect();
            prop_assert_eq!(waypoints.len(), expected);
            if let Some(last) = waypoints.last() {
                prop_assert_eq!(*last, to);
            }

            let mut previous = from;
            for waypoint in &waypoints {
                prop_assert!(previous.distance_to(waypoint) <= max_len + 1e-9);
                previous = *waypoint;
            }
        }
    }
}
