//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use crate::math::Point2d;
use crate::Direction;
use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: Float> Interval<T> {
    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> T {
        (self.min + self.max) / (T::one() + T::one())
    }

    /// How far `value` lies beyond the end of the interval that is reached
    /// when travelling in the positive (`forward`) or negative direction.
    /// Negative while the value has not yet reached that end.
    pub fn overshoot(&self, value: T, forward: bool) -> T {
        if forward {
            value - self.max
        } else {
            self.min - value
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// The visible area of the simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    /// The horizontal extent.
    pub x: Interval<f64>,
    /// The vertical extent, with y increasing southwards.
    pub y: Interval<f64>,
}

impl Bounds {
    /// Creates bounds spanning `[0, width] x [0, height]`.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            x: Interval::new(0.0, width),
            y: Interval::new(0.0, height),
        }
    }

    /// The centre of the area.
    pub fn centre(&self) -> Point2d {
        Point2d::new(self.x.midpoint(), self.y.midpoint())
    }

    /// Whether the point lies inside the area.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }

    /// How far a point travelling in the given direction has gone
    /// past the edge of the area it is heading towards.
    pub fn overshoot(&self, point: Point2d, direction: Direction) -> f64 {
        match direction {
            Direction::North => self.y.overshoot(point.y, false),
            Direction::South => self.y.overshoot(point.y, true),
            Direction::East => self.x.overshoot(point.x, true),
            Direction::West => self.x.overshoot(point.x, false),
        }
    }
}
