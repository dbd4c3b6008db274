use self::speed::{speed_for, Waiting};
use crate::intersection::Approach;
use crate::math::Point2d;
use crate::{Direction, VehicleId};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use self::speed::SpeedZones;

mod speed;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The direction of travel, fixed for the vehicle's lifetime.
    direction: Direction,
    /// The world space coordinates of the vehicle.
    position: Point2d,
    /// The distance travelled per tick.
    speed: f64,
    /// The free-flow speed assigned at spawn.
    nominal_speed: f64,
    /// The vehicle's colour.
    color: String,
    /// The index of the lane the vehicle travels in.
    lane: usize,
    /// The time spent stopped at a red light since last moving freely.
    waiting_time: f64,
    /// The signed distance to the governing stop line after the last update.
    distance_to_stop_line: Option<f64>,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleAttributes {
    /// The direction of travel.
    pub direction: Direction,
    /// The initial world space coordinates.
    pub position: Point2d,
    /// The free-flow speed, in units per tick.
    pub nominal_speed: f64,
    /// The vehicle's colour.
    pub color: String,
    /// The index of the lane the vehicle travels in.
    pub lane: usize,
}

/// A read-only copy of the parts of a vehicle needed to draw it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
    pub color: String,
    pub speed: f64,
}

impl Vehicle {
    /// Creates a new vehicle, initially travelling at its nominal speed.
    pub(crate) fn new(id: VehicleId, attributes: &VehicleAttributes) -> Self {
        Self {
            id,
            direction: attributes.direction,
            position: attributes.position,
            speed: attributes.nominal_speed,
            nominal_speed: attributes.nominal_speed,
            color: attributes.color.clone(),
            lane: attributes.lane,
            waiting_time: 0.0,
            distance_to_stop_line: None,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The direction of travel.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The coordinates in world space of the vehicle.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The distance travelled on the last tick.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The free-flow speed assigned at spawn.
    pub fn nominal_speed(&self) -> f64 {
        self.nominal_speed
    }

    /// The vehicle's colour.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// The index of the lane the vehicle travels in.
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// The time spent waiting at a red light.
    pub fn waiting_time(&self) -> f64 {
        self.waiting_time
    }

    /// Whether the vehicle is stopped.
    pub fn has_stopped(&self) -> bool {
        self.speed == 0.0
    }

    /// The signed distance to the stop line of the intersection the vehicle is
    /// approaching, or `None` if there are no more intersections ahead.
    pub fn distance_to_stop_line(&self) -> Option<f64> {
        self.distance_to_stop_line
    }

    /// Takes a snapshot of the vehicle.
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            direction: self.direction,
            color: self.color.clone(),
            speed: self.speed,
        }
    }

    /// Sets the vehicle's speed from the governing light, then moves it.
    ///
    /// # Parameters
    /// * `governing` - The approach to the governing intersection, if there is one
    /// * `zones` - The reaction distances
    /// * `dt` - The elapsed time this tick
    pub(crate) fn update(&mut self, governing: Option<Approach>, zones: &SpeedZones, dt: f64) {
        let (speed, waiting) = speed_for(
            self.nominal_speed,
            governing.map(|approach| approach.distance),
            governing.and_then(|approach| approach.light),
            zones,
        );
        self.speed = speed;
        match waiting {
            Waiting::Accumulate => self.waiting_time += dt,
            Waiting::Hold => {}
            Waiting::Reset => self.waiting_time = 0.0,
        }
        self.position += self.speed * self.direction.vector();
    }

    /// Caches the distance to the governing stop line.
    pub(crate) fn set_distance_to_stop_line(&mut self, distance: Option<f64>) {
        self.distance_to_stop_line = distance;
    }

    /// Whether the position and speed are finite.
    pub(crate) fn is_valid(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite() && self.speed.is_finite()
    }
}
