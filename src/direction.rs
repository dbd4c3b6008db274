use crate::math::Vector2d;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A direction of travel. Screen coordinates are used, so travelling
/// north decreases y and travelling south increases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// A pair of opposing directions. Also used to name the phase
/// of a two-phase signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Direction {
    /// All four directions, in the order lights are laid out at an intersection.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// A unit vector pointing in the direction of travel.
    pub fn vector(self) -> Vector2d {
        match self {
            Direction::North => Vector2d::new(0.0, -1.0),
            Direction::South => Vector2d::new(0.0, 1.0),
            Direction::East => Vector2d::new(1.0, 0.0),
            Direction::West => Vector2d::new(-1.0, 0.0),
        }
    }

    /// The axis this direction lies on.
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    /// The lowercase name of the direction.
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl Axis {
    /// The perpendicular axis.
    pub fn orthogonal(self) -> Axis {
        match self {
            Axis::NorthSouth => Axis::EastWest,
            Axis::EastWest => Axis::NorthSouth,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::NorthSouth => f.write_str("North-South"),
            Axis::EastWest => f.write_str("East-West"),
        }
    }
}
