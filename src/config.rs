//! Simulation configuration and its validation.

use crate::intersection::Topology;
use crate::light::Timing;
use crate::spawn::{SpawnConfig, SpawnMode};
use crate::util::Interval;
use crate::vehicle::SpeedZones;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The signal control policy used at every intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalMode {
    /// Alternate fixed north-south and east-west phases.
    FixedTwoPhase,
    /// Independent light timers with an all-red check before turning green.
    TimerFallback,
}

/// Signal timing options. Times are in simulated time units.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalConfig {
    /// The policy used at every intersection.
    pub mode: SignalMode,
    /// The length of a green-then-yellow phase.
    pub green_time: f64,
    /// The portion of the phase spent yellow.
    pub yellow_time: f64,
    /// The length of one signal step.
    pub signal_period: f64,
}

/// The placement and shape of the intersections.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    /// The number of intersections, placed eastwards from the centre of the area.
    pub intersection_count: usize,
    /// The approaches present at each intersection.
    pub intersection_type: Topology,
    /// The distance between neighbouring intersection centres.
    pub intersection_spacing: f64,
    /// The width of each road.
    pub road_width: f64,
    /// The distance from an intersection's centre back to each stop line.
    pub stop_line_offset: f64,
    /// How far upstream of the road edge each detector sits.
    pub detector_distance: f64,
}

/// Vehicle movement options.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KineticsConfig {
    /// Vehicles within this distance of a stop line stop for red.
    pub stop_zone: f64,
    /// Vehicles within this distance of a stop line slow for yellow.
    pub slow_zone: f64,
    /// How far past the edge of the area a vehicle travels before it is removed.
    pub removal_buffer: f64,
}

/// The full configuration of a [Simulation](crate::Simulation).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The width of the visible area.
    pub width: f64,
    /// The height of the visible area.
    pub height: f64,
    pub signal: SignalConfig,
    pub layout: LayoutConfig,
    pub kinetics: KineticsConfig,
    pub spawn: SpawnConfig,
    /// Seeds the random source. A random seed is drawn if `None`.
    pub seed: Option<u64>,
}

/// A configuration that cannot be simulated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite, non-negative number, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} must be a finite, positive number, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("green time must span at least two signal steps, got {0}")]
    GreenTooShort(u32),
    #[error("yellow time must span at least one signal step")]
    NoYellow,
    #[error("yellow time ({yellow} steps) must be shorter than green time ({green} steps)")]
    YellowTooLong { green: u32, yellow: u32 },
    #[error("at least one intersection is required")]
    NoIntersections,
    #[error("intersection type has no directions")]
    NoDirections,
    #[error("maximum vehicle count must be non-zero")]
    ZeroPopulationCap,
    #[error("spawn rate must be a percentage between 0 and 100, got {0}")]
    SpawnRate(f64),
    #[error("nominal speed range {min}..{max} is invalid")]
    SpeedRange { min: f64, max: f64 },
    #[error("colour palette is empty")]
    EmptyPalette,
    #[error("at least one lane offset is required")]
    NoLanes,
    #[error("lane offset {offset} lies outside a road of width {road_width}")]
    LaneOffRoad { offset: f64, road_width: f64 },
}

fn non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

impl SignalConfig {
    /// Converts the phase times into whole signal steps.
    pub fn timing(&self) -> Result<Timing, ConfigError> {
        let period = positive("signal period", self.signal_period)?;
        let green = non_negative("green time", self.green_time)?;
        let yellow = non_negative("yellow time", self.yellow_time)?;
        let timing = Timing {
            green: (green / period).round() as u32,
            yellow: (yellow / period).round() as u32,
        };
        if timing.green < 2 {
            return Err(ConfigError::GreenTooShort(timing.green));
        }
        if timing.yellow == 0 {
            return Err(ConfigError::NoYellow);
        }
        if timing.yellow >= timing.green {
            return Err(ConfigError::YellowTooLong {
                green: timing.green,
                yellow: timing.yellow,
            });
        }
        Ok(timing)
    }
}

impl KineticsConfig {
    /// The reaction distances.
    pub fn zones(&self) -> SpeedZones {
        SpeedZones {
            stop_zone: self.stop_zone,
            slow_zone: self.slow_zone,
        }
    }
}

impl SimulationConfig {
    /// A single four-way crossroads with alternating fixed phases
    /// and a vehicle entering every two time units.
    pub fn single_intersection() -> Self {
        Self {
            width: 600.0,
            height: 600.0,
            signal: SignalConfig {
                mode: SignalMode::FixedTwoPhase,
                green_time: 5.0,
                yellow_time: 2.0,
                signal_period: 1.0,
            },
            layout: LayoutConfig {
                intersection_count: 1,
                intersection_type: Topology::FourWay,
                intersection_spacing: 200.0,
                road_width: 120.0,
                stop_line_offset: 60.0,
                detector_distance: 50.0,
            },
            kinetics: KineticsConfig {
                stop_zone: 80.0,
                slow_zone: 80.0,
                removal_buffer: 50.0,
            },
            spawn: SpawnConfig {
                mode: SpawnMode::Interval { period: 2.0 },
                max_vehicles: 20,
                speed: Interval::new(2.0, 4.0),
                palette: ["red", "blue", "green", "yellow", "purple", "orange"]
                    .map(String::from)
                    .to_vec(),
                lane_offsets: vec![-30.0],
                spawn_margin: 40.0,
            },
            seed: None,
        }
    }

    /// A row of independently timed intersections along the horizontal centre
    /// line, with vehicles entering at random on two lanes per approach.
    pub fn corridor() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
            signal: SignalConfig {
                mode: SignalMode::TimerFallback,
                green_time: 5.0,
                yellow_time: 2.0,
                signal_period: 1.0,
            },
            layout: LayoutConfig {
                intersection_count: 1,
                intersection_type: Topology::FourWay,
                intersection_spacing: 200.0,
                road_width: 120.0,
                stop_line_offset: 60.0,
                detector_distance: 50.0,
            },
            kinetics: KineticsConfig {
                stop_zone: 80.0,
                slow_zone: 60.0,
                removal_buffer: 50.0,
            },
            spawn: SpawnConfig {
                mode: SpawnMode::Probabilistic { rate: 30.0 },
                max_vehicles: 50,
                speed: Interval::new(1.0, 3.0),
                palette: [
                    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8",
                ]
                .map(String::from)
                .to_vec(),
                lane_offsets: vec![-15.0, 15.0],
                spawn_margin: 40.0,
            },
            seed: None,
        }
    }

    /// Uses the given random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the configuration can be simulated, returning the signal timing.
    pub fn validate(&self) -> Result<Timing, ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        let timing = self.signal.timing()?;

        let layout = &self.layout;
        if layout.intersection_count == 0 {
            return Err(ConfigError::NoIntersections);
        }
        if layout.intersection_type.directions().is_empty() {
            return Err(ConfigError::NoDirections);
        }
        if layout.intersection_count > 1 {
            positive("intersection spacing", layout.intersection_spacing)?;
        }
        let road_width = positive("road width", layout.road_width)?;
        non_negative("stop line offset", layout.stop_line_offset)?;
        non_negative("detector distance", layout.detector_distance)?;

        non_negative("stop zone", self.kinetics.stop_zone)?;
        non_negative("slow zone", self.kinetics.slow_zone)?;
        non_negative("removal buffer", self.kinetics.removal_buffer)?;

        let spawn = &self.spawn;
        match spawn.mode {
            SpawnMode::Interval { period } => {
                positive("spawn interval", period)?;
            }
            SpawnMode::Probabilistic { rate } => {
                if !(0.0..=100.0).contains(&rate) {
                    return Err(ConfigError::SpawnRate(rate));
                }
            }
        }
        if spawn.max_vehicles == 0 {
            return Err(ConfigError::ZeroPopulationCap);
        }
        let Interval { min, max } = spawn.speed;
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::SpeedRange { min, max });
        }
        if spawn.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        if spawn.lane_offsets.is_empty() {
            return Err(ConfigError::NoLanes);
        }
        if let Some(offset) = spawn
            .lane_offsets
            .iter()
            .copied()
            .find(|offset| !offset.is_finite() || offset.abs() > 0.5 * road_width)
        {
            return Err(ConfigError::LaneOffRoad { offset, road_width });
        }
        non_negative("spawn margin", spawn.spawn_margin)?;

        Ok(timing)
    }

    /// Whether switching to `other` requires the intersections to be rebuilt.
    pub(crate) fn topology_differs(&self, other: &SimulationConfig) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.layout != other.layout
            || self.signal.mode != other.signal.mode
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::single_intersection()
    }
}
