use crate::config::{ConfigError, SignalMode, SimulationConfig};
#[cfg(feature = "debug")]
use crate::debug::debug_frame;
use crate::detector::Detector;
use crate::intersection::{Approach, Intersection, IntersectionAttributes};
use crate::light::{LightState, Timing};
use crate::math::{Point2d, Vector2d};
use crate::signal::{FixedTwoPhase, SignalPolicy, TimerFallback};
use crate::spawn::Spawner;
use crate::util::Bounds;
use crate::vehicle::{Vehicle, VehicleAttributes, VehicleSnapshot};
use crate::{Axis, Direction, IntersectionId, IntersectionSet, VehicleId, VehicleSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Absorbs rounding error when converting accumulated time into signal steps.
const CLOCK_EPSILON: f64 = 1e-9;

/// The most signal steps a single tick may advance the lights by.
const MAX_SIGNAL_STEPS: f64 = 1000.0;

/// A traffic simulation.
pub struct Simulation {
    /// The configuration in effect.
    config: SimulationConfig,
    /// The signal timing derived from the configuration.
    timing: Timing,
    /// The visible area.
    bounds: Bounds,
    /// The intersections and their lights.
    intersections: IntersectionSet,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// Creates new vehicles.
    spawner: Spawner,
    /// The random source used for spawning.
    rng: ChaCha8Rng,
    /// Whether ticks advance the simulation.
    running: bool,
    /// The current frame of simulation.
    frame: usize,
    /// Time accumulated towards the next signal step.
    signal_clock: f64,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new, stopped simulation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let timing = config.validate()?;
        let bounds = Bounds::new(config.width, config.height);
        let intersections = build_intersections(&config, timing, &bounds);
        let spawner = Spawner::new(
            config.spawn.clone(),
            config.layout.intersection_type.directions(),
            road_centres(&intersections),
        );
        let rng = seed_rng(config.seed);
        log::info!(
            "created simulation with {} intersections under {:?}",
            intersections.len(),
            config.signal.mode
        );

        Ok(Self {
            config,
            timing,
            bounds,
            intersections,
            vehicles: VehicleSet::with_key(),
            spawner,
            rng,
            running: false,
            frame: 0,
            signal_clock: 0.0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        })
    }

    /// Applies a new configuration.
    ///
    /// Changes to the area, layout or signal mode rebuild every intersection and
    /// detector. Changes to signal timing take effect at each light's next phase
    /// boundary. A new seed takes effect at the next [reset](Self::reset).
    ///
    /// Lowering the vehicle limit below the live count removes no vehicles;
    /// spawning pauses until enough have left the area.
    pub fn configure(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        let timing = config.validate()?;

        if self.config.topology_differs(&config) {
            self.bounds = Bounds::new(config.width, config.height);
            self.intersections = build_intersections(&config, timing, &self.bounds);
            self.spawner.set_roads(
                config.layout.intersection_type.directions(),
                road_centres(&self.intersections),
            );
            self.signal_clock = 0.0;
            log::info!("rebuilt {} intersections", self.intersections.len());
        } else if timing != self.timing {
            for intersection in self.intersections.values_mut() {
                intersection.set_timing(timing);
            }
            log::info!("signal timing changed to {:?}", timing);
        }

        if config.spawn != self.config.spawn {
            self.spawner.reconfigure(config.spawn.clone());
        }

        self.timing = timing;
        self.config = config;
        Ok(())
    }

    /// Starts advancing the simulation on each tick. Does nothing if already running.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            log::info!("simulation started");
        }
    }

    /// Stops advancing the simulation. Does nothing if already stopped.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::info!("simulation stopped");
        }
    }

    /// Removes every vehicle, returns the lights to their initial phase,
    /// clears the detectors and stops the simulation.
    pub fn reset(&mut self) {
        self.stop();
        self.vehicles.clear();
        for intersection in self.intersections.values_mut() {
            intersection.reset_signals(self.timing);
            intersection.reset_detectors();
        }
        self.spawner.reset();
        self.signal_clock = 0.0;
        self.frame = 0;
        if let Some(seed) = self.config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        log::info!("simulation reset");
    }

    /// Advances the simulation by one frame, `dt` time units after the last.
    ///
    /// The lights advance by however many whole signal periods have elapsed,
    /// up to a fixed limit per call, while vehicles move exactly once per call.
    pub fn tick(&mut self, dt: f64) {
        if !self.running {
            return;
        }
        if !(dt.is_finite() && dt >= 0.0) {
            log::warn!("ignoring tick with elapsed time {}", dt);
            return;
        }

        self.update_lights(dt);
        self.update_vehicles(dt);
        self.spawn_vehicles(dt);
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = debug_frame(&self.intersections, &self.vehicles);
        }
    }

    /// Adds a vehicle to the simulation. Returns `None` if the vehicle limit has
    /// been reached or the nominal speed is not a finite, positive number.
    pub fn add_vehicle(&mut self, attributes: &VehicleAttributes) -> Option<VehicleId> {
        if self.vehicles.len() >= self.spawner.max_vehicles() {
            return None;
        }
        let speed = attributes.nominal_speed;
        if !(speed.is_finite() && speed > 0.0) {
            log::warn!("rejecting vehicle with nominal speed {}", speed);
            return None;
        }
        let vehicle_id = self
            .vehicles
            .insert_with_key(|id| Vehicle::new(id, attributes));
        log::trace!(
            "vehicle {:?} entered heading {} at {:?}",
            vehicle_id,
            attributes.direction,
            attributes.position
        );
        Some(vehicle_id)
    }

    /// Whether ticks currently advance the simulation.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The configuration in effect.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The visible area.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The state of the light for `direction` at the given intersection.
    pub fn light_state(
        &self,
        intersection_id: IntersectionId,
        direction: Direction,
    ) -> Option<LightState> {
        self.intersections
            .get(intersection_id)?
            .light(direction)
            .map(|light| light.state())
    }

    /// The phase of the first intersection, if its signal policy has phases.
    pub fn phase(&self) -> Option<Axis> {
        self.intersections.values().next()?.phase()
    }

    /// The signal steps left in the first intersection's phase, if its policy counts down.
    pub fn time_remaining(&self) -> Option<u32> {
        self.intersections.values().next()?.time_remaining()
    }

    /// Takes a snapshot of every live vehicle.
    pub fn list_vehicles(&self) -> Vec<VehicleSnapshot> {
        self.vehicles.values().map(Vehicle::snapshot).collect()
    }

    /// The number of live vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Returns an iterator over all the intersections, in order from west to east.
    pub fn iter_intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    /// Returns an iterator over every detector at every intersection.
    pub fn iter_detectors(&self) -> impl Iterator<Item = &Detector> {
        self.intersections
            .values()
            .flat_map(|intersection| intersection.detectors())
    }

    /// Gets a reference to the vehicle with the given ID, if it is still live.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(vehicle_id)
    }

    /// Gets a reference to the intersection with the given ID.
    pub fn get_intersection(&self, intersection_id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(intersection_id)
    }

    /// Gets the debugging information for the previously simulated frame as JSON.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Advances the lights by the whole signal steps elapsed, up to
    /// [MAX_SIGNAL_STEPS]. Time beyond that is dropped.
    fn update_lights(&mut self, dt: f64) {
        let period = self.config.signal.signal_period;
        self.signal_clock += dt;
        let mut steps = (self.signal_clock / period + CLOCK_EPSILON).floor();
        if steps > MAX_SIGNAL_STEPS {
            log::warn!(
                "elapsed time {} spans {} signal steps, advancing by {}",
                dt,
                steps,
                MAX_SIGNAL_STEPS
            );
            steps = MAX_SIGNAL_STEPS;
            self.signal_clock = 0.0;
        } else {
            self.signal_clock = f64::max(self.signal_clock - steps * period, 0.0);
        }

        for intersection in self.intersections.values_mut() {
            intersection.advance_signals(steps as u32);
        }
    }

    /// Sets every vehicle's speed from its governing light and moves it,
    /// then removes the vehicles that have left the area.
    fn update_vehicles(&mut self, dt: f64) {
        let zones = self.config.kinetics.zones();
        let buffer = self.config.kinetics.removal_buffer;
        let mut moved = vec![];
        let mut exited = vec![];

        for (vehicle_id, vehicle) in &mut self.vehicles {
            let dir = vehicle.direction();
            let from = vehicle.position();
            let governing = governing_approach(&self.intersections, from, dir);
            vehicle.update(governing, &zones, dt);

            if !vehicle.is_valid() {
                log::warn!("vehicle {:?} has an invalid position, removing it", vehicle_id);
                exited.push(vehicle_id);
                continue;
            }

            let to = vehicle.position();
            let ahead = governing_approach(&self.intersections, to, dir);
            vehicle.set_distance_to_stop_line(ahead.map(|approach| approach.distance));
            moved.push((from, to, dir));

            if self.bounds.overshoot(to, dir) > buffer {
                exited.push(vehicle_id);
            }
        }

        for (from, to, dir) in moved {
            for intersection in self.intersections.values_mut() {
                intersection.observe(from, to, dir);
            }
        }

        for vehicle_id in exited {
            self.vehicles.remove(vehicle_id);
            log::trace!("vehicle {:?} exited", vehicle_id);
        }
    }

    /// Spawns new vehicles, up to the vehicle limit.
    fn spawn_vehicles(&mut self, dt: f64) {
        let attempts = self.spawner.attempts(dt, &mut self.rng);
        for _ in 0..attempts {
            if self.vehicles.len() >= self.spawner.max_vehicles() {
                break;
            }
            if let Some(attributes) = self.spawner.sample(&self.bounds, &mut self.rng) {
                self.add_vehicle(&attributes);
            }
        }
    }
}

/// Finds the nearest intersection whose stop line lies ahead of a point travelling
/// in `direction` along one of its roads.
fn governing_approach(
    intersections: &IntersectionSet,
    pos: Point2d,
    direction: Direction,
) -> Option<Approach> {
    intersections
        .values()
        .filter_map(|intersection| intersection.approach(pos, direction))
        .filter(|approach| approach.distance > 0.0)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Lays out the intersections eastwards from the centre of the area.
fn build_intersections(
    config: &SimulationConfig,
    timing: Timing,
    bounds: &Bounds,
) -> IntersectionSet {
    let layout = &config.layout;
    let mut intersections = IntersectionSet::with_key();
    for idx in 0..layout.intersection_count {
        let attribs = IntersectionAttributes {
            centre: bounds.centre() + Vector2d::new(idx as f64 * layout.intersection_spacing, 0.0),
            topology: layout.intersection_type,
            road_width: layout.road_width,
            stop_line_offset: layout.stop_line_offset,
            detector_distance: layout.detector_distance,
        };
        let policy: Box<dyn SignalPolicy> = match config.signal.mode {
            SignalMode::FixedTwoPhase => Box::new(FixedTwoPhase::new(timing)),
            SignalMode::TimerFallback => Box::new(TimerFallback::new(timing)),
        };
        intersections.insert_with_key(|id| Intersection::new(id, &attribs, policy));
    }
    intersections
}

/// The centres of the intersections, whose roads vehicles enter on.
fn road_centres(intersections: &IntersectionSet) -> Vec<Point2d> {
    intersections.values().map(Intersection::centre).collect()
}

fn seed_rng(seed: Option<u64>) -> ChaCha8Rng {
    seed.map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64)
}
