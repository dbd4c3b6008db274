use crate::math::{rot90, Point2d};
use crate::util::{Bounds, Interval};
use crate::vehicle::VehicleAttributes;
use crate::Direction;
use arrayvec::ArrayVec;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When new vehicles enter the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpawnMode {
    /// Attempt a spawn every `period` time units.
    Interval { period: f64 },
    /// Spawn on each tick with a probability of `rate` percent.
    Probabilistic { rate: f64 },
}

/// Vehicle spawning options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpawnConfig {
    /// When vehicles enter.
    pub mode: SpawnMode,
    /// The maximum number of live vehicles.
    pub max_vehicles: usize,
    /// The range nominal speeds are drawn from, in units per tick.
    pub speed: Interval<f64>,
    /// The colours vehicles are drawn in.
    pub palette: Vec<String>,
    /// The lateral offsets of the lanes from the road's centre line,
    /// measured to the right of the direction of travel.
    pub lane_offsets: Vec<f64>,
    /// How far outside the visible area vehicles enter.
    pub spawn_margin: f64,
}

/// Creates vehicles with randomised attributes.
#[derive(Clone, Debug)]
pub(crate) struct Spawner {
    config: SpawnConfig,
    /// The directions vehicles may travel in.
    directions: ArrayVec<Direction, 4>,
    /// The centres of the intersections, whose roads vehicles enter on.
    roads: Vec<Point2d>,
    /// The time accumulated towards the next interval spawn.
    elapsed: f64,
}

impl Spawner {
    pub(crate) fn new(
        config: SpawnConfig,
        directions: ArrayVec<Direction, 4>,
        roads: Vec<Point2d>,
    ) -> Self {
        Self {
            config,
            directions,
            roads,
            elapsed: 0.0,
        }
    }

    /// The maximum number of live vehicles.
    pub(crate) fn max_vehicles(&self) -> usize {
        self.config.max_vehicles
    }

    /// Replaces the spawning options, keeping the interval timer running.
    pub(crate) fn reconfigure(&mut self, config: SpawnConfig) {
        self.config = config;
    }

    /// Replaces the roads vehicles may enter on.
    pub(crate) fn set_roads(&mut self, directions: ArrayVec<Direction, 4>, roads: Vec<Point2d>) {
        self.directions = directions;
        self.roads = roads;
    }

    /// Restarts the interval timer.
    pub(crate) fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Determines how many spawns to attempt after `dt` time units have elapsed.
    pub(crate) fn attempts(&mut self, dt: f64, rng: &mut impl Rng) -> usize {
        match self.config.mode {
            SpawnMode::Interval { period } => {
                self.elapsed += dt;
                let count = (self.elapsed / period).floor();
                self.elapsed -= count * period;
                count as usize
            }
            SpawnMode::Probabilistic { rate } => {
                usize::from(rng.gen_range(0.0..100.0) < rate)
            }
        }
    }

    /// Draws the attributes of a new vehicle, positioned just outside the
    /// visible area on its approach lane.
    pub(crate) fn sample(&self, bounds: &Bounds, rng: &mut impl Rng) -> Option<VehicleAttributes> {
        let direction = *self.directions.choose(rng)?;
        let road = *self.roads.choose(rng)?;
        let color = self.config.palette.choose(rng)?.clone();
        let lane = rng.gen_range(0..self.config.lane_offsets.len().max(1));
        let offset = self.config.lane_offsets.get(lane).copied().unwrap_or(0.0);
        let Interval { min, max } = self.config.speed;
        let nominal_speed = Uniform::new_inclusive(min, max).sample(rng);

        let margin = self.config.spawn_margin;
        let mut position = road + offset * rot90(direction.vector());
        match direction {
            Direction::North => position.y = bounds.y.max + margin,
            Direction::South => position.y = bounds.y.min - margin,
            Direction::East => position.x = bounds.x.min - margin,
            Direction::West => position.x = bounds.x.max + margin,
        }

        Some(VehicleAttributes {
            direction,
            position,
            nominal_speed,
            color,
            lane,
        })
    }
}
