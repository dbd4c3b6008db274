//! Tests that involve a single crossroads under the fixed two-phase policy.

use assert_approx_eq::assert_approx_eq;
use signal_sim::{
    math::Point2d, Axis, Direction, IntersectionId, LightState, Simulation, SimulationConfig,
    SpawnMode, VehicleAttributes,
};

/// A running simulation with spawning disabled.
fn quiet_sim() -> Simulation {
    let mut config = SimulationConfig::single_intersection().with_seed(1);
    config.spawn.mode = SpawnMode::Probabilistic { rate: 0.0 };
    let mut sim = Simulation::new(config).unwrap();
    sim.start();
    sim
}

fn first_intersection(sim: &Simulation) -> IntersectionId {
    sim.iter_intersections().next().unwrap().id()
}

fn vehicle(direction: Direction, x: f64, y: f64, nominal_speed: f64) -> VehicleAttributes {
    VehicleAttributes {
        direction,
        position: Point2d::new(x, y),
        nominal_speed,
        color: "red".into(),
        lane: 0,
    }
}

fn states(sim: &Simulation) -> [LightState; 4] {
    let id = first_intersection(sim);
    Direction::ALL.map(|dir| sim.light_state(id, dir).unwrap())
}

/// Test the documented five-step cycle with a green time of 5 and yellow time of 2.
#[test]
fn phase_cycle_timing() {
    use LightState::*;
    let mut sim = quiet_sim();
    assert_eq!(states(&sim), [Green, Green, Red, Red]);
    assert_eq!(sim.phase(), Some(Axis::NorthSouth));
    assert_eq!(sim.time_remaining(), Some(5));

    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(states(&sim), [Green, Green, Red, Red]);

    sim.tick(1.0);
    assert_eq!(states(&sim), [Yellow, Yellow, Red, Red]);
    sim.tick(1.0);
    assert_eq!(states(&sim), [Yellow, Yellow, Red, Red]);

    sim.tick(1.0);
    assert_eq!(states(&sim), [Red, Red, Green, Green]);
    assert_eq!(sim.phase(), Some(Axis::EastWest));
    assert_eq!(sim.time_remaining(), Some(5));
}

/// Test that lights advance on elapsed time rather than once per tick.
#[test]
fn lights_follow_elapsed_time() {
    let mut sim = quiet_sim();
    let id = first_intersection(&sim);
    for _ in 0..11 {
        sim.tick(0.25);
    }
    assert_eq!(sim.light_state(id, Direction::North), Some(LightState::Green));
    sim.tick(0.25);
    assert_eq!(sim.light_state(id, Direction::North), Some(LightState::Yellow));
    assert_eq!(sim.frame(), 12);
}

/// Test that one pair is always green or yellow while the other is red,
/// and that lights only change colour in the order green, yellow, red.
#[test]
fn phases_never_overlap() {
    use LightState::*;
    let mut sim = quiet_sim();
    let mut prev = states(&sim);
    for _ in 0..100 {
        sim.tick(1.0);
        let [n, s, e, w] = states(&sim);
        assert_eq!(n, s);
        assert_eq!(e, w);
        assert!((n == Red) != (e == Red));

        for (before, after) in prev.iter().zip(states(&sim)) {
            let legal = matches!(
                (*before, after),
                (Green, Green)
                    | (Yellow, Yellow)
                    | (Red, Red)
                    | (Green, Yellow)
                    | (Yellow, Red)
                    | (Red, Green)
            );
            assert!(legal, "{:?} -> {:?}", before, after);
        }
        prev = states(&sim);
    }
}

/// Test that a vehicle waits at a red light and leaves as soon as it turns green.
#[test]
fn vehicle_waits_for_green() {
    let mut sim = quiet_sim();
    let id = first_intersection(&sim);

    // Travelling east, 40 units before the stop line at x = 240
    let veh = sim
        .add_vehicle(&vehicle(Direction::East, 200.0, 270.0, 3.0))
        .unwrap();

    for tick in 1..=4 {
        sim.tick(1.0);
        let vehicle = sim.get_vehicle(veh).unwrap();
        assert_eq!(sim.light_state(id, Direction::East), Some(LightState::Red));
        assert_eq!(vehicle.speed(), 0.0);
        assert!(vehicle.has_stopped());
        assert_approx_eq!(vehicle.position().x, 200.0);
        assert_approx_eq!(vehicle.waiting_time(), tick as f64);
        assert_approx_eq!(vehicle.distance_to_stop_line().unwrap(), 40.0);
    }

    sim.tick(1.0);
    let vehicle = sim.get_vehicle(veh).unwrap();
    assert_eq!(sim.light_state(id, Direction::East), Some(LightState::Green));
    assert_eq!(vehicle.speed(), 3.0);
    assert_approx_eq!(vehicle.position().x, 203.0);
    assert_eq!(vehicle.waiting_time(), 0.0);
}

/// Test that a vehicle approaching a yellow light slows to half speed.
#[test]
fn vehicle_slows_for_yellow() {
    let mut sim = quiet_sim();
    for _ in 0..3 {
        sim.tick(1.0);
    }

    // Travelling north, 50 units before the stop line at y = 360
    let veh = sim
        .add_vehicle(&vehicle(Direction::North, 270.0, 410.0, 3.0))
        .unwrap();
    sim.tick(1.0);

    let vehicle = sim.get_vehicle(veh).unwrap();
    assert_approx_eq!(vehicle.speed(), 1.5);
    assert_approx_eq!(vehicle.position().y, 408.5);
    assert_eq!(vehicle.waiting_time(), 0.0);
}

/// Test that a vehicle past the stop line ignores the red light.
#[test]
fn vehicle_past_stop_line_proceeds() {
    let mut sim = quiet_sim();
    let veh = sim
        .add_vehicle(&vehicle(Direction::West, 350.0, 330.0, 2.0))
        .unwrap();
    sim.tick(1.0);
    let vehicle = sim.get_vehicle(veh).unwrap();
    assert_eq!(vehicle.speed(), 2.0);
    assert_approx_eq!(vehicle.position().x, 348.0);
    assert_eq!(vehicle.distance_to_stop_line(), None);
}

/// Test that vehicles leaving the area are removed and never come back.
#[test]
fn vehicle_removed_past_buffer() {
    let mut sim = quiet_sim();
    let veh = sim
        .add_vehicle(&vehicle(Direction::East, 645.0, 270.0, 3.0))
        .unwrap();

    sim.tick(1.0);
    assert!(sim.get_vehicle(veh).is_some());
    assert_eq!(sim.list_vehicles().len(), 1);

    sim.tick(1.0);
    assert!(sim.get_vehicle(veh).is_none());
    assert!(sim.list_vehicles().is_empty());

    for _ in 0..20 {
        sim.tick(1.0);
        assert!(sim.list_vehicles().iter().all(|v| v.id != veh));
    }
}

/// Test that continuous spawning respects the vehicle limit and speed bounds.
#[test]
fn spawning_respects_limits() {
    let mut sim = Simulation::new(SimulationConfig::single_intersection().with_seed(9)).unwrap();
    sim.start();

    let mut most = 0;
    for _ in 0..2000 {
        sim.tick(1.0);
        assert!(sim.vehicle_count() <= 20);
        most = most.max(sim.vehicle_count());
        for vehicle in sim.iter_vehicles() {
            assert!(vehicle.speed() >= 0.0);
            assert!(vehicle.speed() <= vehicle.nominal_speed());
            assert!((2.0..=4.0).contains(&vehicle.nominal_speed()));
        }
    }
    assert_eq!(most, 20);
}

/// Test that a reset clears all vehicles and restores the initial phase.
#[test]
fn reset_restores_initial_state() {
    use LightState::*;
    let mut sim = Simulation::new(SimulationConfig::single_intersection().with_seed(3)).unwrap();
    sim.start();
    for _ in 0..37 {
        sim.tick(1.0);
    }
    assert!(sim.vehicle_count() > 0);

    sim.reset();
    assert!(!sim.is_running());
    assert!(sim.list_vehicles().is_empty());
    assert_eq!(states(&sim), [Green, Green, Red, Red]);
    assert_eq!(sim.phase(), Some(Axis::NorthSouth));
    assert_eq!(sim.time_remaining(), Some(5));
    assert_eq!(sim.frame(), 0);

    // Stopped after a reset, so ticks do nothing
    sim.tick(1.0);
    assert_eq!(sim.frame(), 0);
    assert_eq!(states(&sim), [Green, Green, Red, Red]);
}

/// Test that starting and stopping twice has the same effect as doing so once.
#[test]
fn start_and_stop_are_idempotent() {
    let mut sim = quiet_sim();
    sim.start();
    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.frame(), 2);

    sim.stop();
    sim.stop();
    assert!(!sim.is_running());
    sim.tick(1.0);
    assert_eq!(sim.frame(), 2);
    assert_eq!(sim.time_remaining(), Some(3));

    // Resumes where it left off
    sim.start();
    sim.tick(1.0);
    assert_eq!(sim.time_remaining(), Some(2));
}

/// Test that new timing only applies from the next phase.
#[test]
fn timing_change_waits_for_phase_boundary() {
    let mut sim = quiet_sim();
    let id = first_intersection(&sim);
    sim.tick(1.0);

    let mut config = sim.config().clone();
    config.signal.green_time = 8.0;
    config.signal.yellow_time = 3.0;
    sim.configure(config).unwrap();

    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.light_state(id, Direction::North), Some(LightState::Yellow));
    sim.tick(1.0);
    sim.tick(1.0);
    assert_eq!(sim.phase(), Some(Axis::EastWest));
    assert_eq!(sim.time_remaining(), Some(8));

    for _ in 0..4 {
        sim.tick(1.0);
    }
    assert_eq!(sim.light_state(id, Direction::East), Some(LightState::Green));
    sim.tick(1.0);
    assert_eq!(sim.light_state(id, Direction::East), Some(LightState::Yellow));
}

/// Test that ticks with a nonsensical elapsed time are ignored.
#[test]
fn invalid_elapsed_time_is_ignored() {
    let mut sim = quiet_sim();
    sim.tick(f64::NAN);
    sim.tick(-1.0);
    assert_eq!(sim.frame(), 0);
    assert_eq!(sim.time_remaining(), Some(5));
}

/// Test that vehicles without a finite, positive nominal speed are rejected.
#[test]
fn invalid_nominal_speed_is_rejected() {
    let mut sim = quiet_sim();
    for speed in [-2.0, 0.0, f64::NAN, f64::INFINITY] {
        assert_eq!(sim.add_vehicle(&vehicle(Direction::East, 100.0, 270.0, speed)), None);
    }
    assert_eq!(sim.vehicle_count(), 0);

    let veh = sim
        .add_vehicle(&vehicle(Direction::East, 100.0, 270.0, 2.0))
        .unwrap();
    sim.tick(1.0);
    assert_eq!(sim.get_vehicle(veh).unwrap().speed(), 2.0);
}

/// Test that a vehicle in an invalid state is dropped without disturbing the others.
#[test]
fn invalid_vehicle_is_dropped() {
    let mut sim = quiet_sim();
    let bad = sim
        .add_vehicle(&vehicle(Direction::East, f64::NAN, 270.0, 3.0))
        .unwrap();
    let good = sim
        .add_vehicle(&vehicle(Direction::West, 350.0, 330.0, 2.0))
        .unwrap();
    assert_eq!(sim.vehicle_count(), 2);

    sim.tick(1.0);
    assert!(sim.get_vehicle(bad).is_none());
    let vehicle = sim.get_vehicle(good).unwrap();
    assert_eq!(vehicle.speed(), 2.0);
    assert_approx_eq!(vehicle.position().x, 348.0);
    assert_eq!(sim.list_vehicles().len(), 1);
    assert_eq!(sim.frame(), 1);
}

/// Test that a very long elapsed time advances the lights by a bounded number of steps.
#[test]
fn long_elapsed_time_is_clamped() {
    use LightState::*;
    let mut sim = quiet_sim();

    // A thousand steps is exactly two hundred phase flips
    sim.tick(1.0e8);
    assert_eq!(sim.frame(), 1);
    assert_eq!(sim.phase(), Some(Axis::NorthSouth));
    assert_eq!(sim.time_remaining(), Some(5));
    assert_eq!(states(&sim), [Green, Green, Red, Red]);

    // The excess time is dropped rather than carried over
    sim.tick(1.0);
    assert_eq!(sim.time_remaining(), Some(4));
}
