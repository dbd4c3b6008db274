//! Signal control policies.

pub use fixed::FixedTwoPhase;
pub use timed::TimerFallback;

use crate::light::{Light, Timing};
use crate::Axis;

mod fixed;
mod timed;

/// A strategy that decides how the lights at an intersection change over time.
///
/// A policy instance belongs to exactly one intersection and is only ever
/// handed that intersection's lights.
pub trait SignalPolicy {
    /// Puts the lights into the policy's initial phase.
    fn initialize(&mut self, lights: &mut [Light]);

    /// Advances the lights by one whole signal step.
    fn step(&mut self, lights: &mut [Light]);

    /// Advances the lights by `steps` whole signal steps.
    fn advance(&mut self, lights: &mut [Light], steps: u32) {
        for _ in 0..steps {
            self.step(lights);
        }
    }

    /// Changes the phase durations. Phases already under way keep the
    /// durations they started with.
    fn set_timing(&mut self, timing: Timing);

    /// The privileged pair of directions, for policies that have one.
    fn phase(&self) -> Option<Axis> {
        None
    }

    /// The number of steps left in the current phase, for policies that count down.
    fn time_remaining(&self) -> Option<u32> {
        None
    }
}
