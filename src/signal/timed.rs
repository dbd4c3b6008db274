use super::SignalPolicy;
use crate::light::{Light, LightState, Timing};
use crate::Axis;
use itertools::Itertools;
use smallvec::SmallVec;

/// Runs an independent timer on every light.
///
/// When a light's timer expires it moves from green to yellow, from yellow to
/// red, or from red to green provided every light on the orthogonal axis is red.
/// A red light that may not turn green waits for its timer to expire again.
///
/// All decisions within a step are made from the states at the start of the step.
/// If lights on both axes would turn green in the same step, only the axis which
/// was not the most recent to show green does so.
///
/// A red light can stay red indefinitely if the orthogonal lights never rest
/// in red at the moment its timer expires.
#[derive(Clone, Debug)]
pub struct TimerFallback {
    /// The phase durations.
    timing: Timing,
    /// The axis that most recently turned green.
    last_green: Option<Axis>,
}

impl TimerFallback {
    /// Creates a policy which starts with east-west green.
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            last_green: None,
        }
    }

    /// Checks that every light on the axis orthogonal to `axis` is red.
    fn orthogonal_all_red(lights: &[Light], axis: Axis) -> bool {
        lights
            .iter()
            .filter(|light| light.direction().axis() == axis.orthogonal())
            .all(|light| light.state() == LightState::Red)
    }
}

impl SignalPolicy for TimerFallback {
    fn initialize(&mut self, lights: &mut [Light]) {
        for light in lights.iter_mut() {
            let state = match light.direction().axis() {
                Axis::EastWest => LightState::Green,
                Axis::NorthSouth => LightState::Red,
            };
            light.set(state, self.timing.duration(state));
        }
        self.last_green = Some(Axis::EastWest);
    }

    fn step(&mut self, lights: &mut [Light]) {
        use LightState::*;

        for light in lights.iter() {
            let axis = light.direction().axis();
            let next = match (light.expires_next(), light.state()) {
                (true, Green) => Yellow,
                (true, Yellow) => Red,
                (true, Red) if Self::orthogonal_all_red(lights, axis) => Green,
                (_, state) => state,
            };
            light.stage(next);
        }

        let promoted = lights
            .iter()
            .filter(|light| light.state() == Red && light.next_state() == Green)
            .map(|light| light.direction().axis())
            .unique()
            .collect::<SmallVec<[Axis; 2]>>();

        if promoted.len() > 1 {
            let held = self.last_green.unwrap_or(Axis::EastWest);
            log::debug!("both axes may turn green, holding {}", held);
            for light in lights.iter() {
                if light.direction().axis() == held && light.state() == Red {
                    light.stage(Red);
                }
            }
            self.last_green = Some(held.orthogonal());
        } else if let Some(axis) = promoted.first() {
            self.last_green = Some(*axis);
        }

        let timing = self.timing;
        for light in lights.iter_mut() {
            light.apply(|state| timing.duration(state));
        }
    }

    fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
    }
}
