use super::SignalPolicy;
use crate::light::{Light, LightState, Timing};
use crate::Axis;

/// Alternates right of way between the north-south and east-west pairs.
///
/// On entering a phase its pair turns green, the other pair red, and a
/// countdown starts at the green time. Each step decrements the countdown;
/// the pair turns yellow when it reaches the yellow time and the phase
/// flips when it reaches zero.
#[derive(Clone, Debug)]
pub struct FixedTwoPhase {
    /// The durations of the current phase.
    timing: Timing,
    /// Durations that take over at the next phase boundary.
    pending: Option<Timing>,
    /// The pair currently showing green or yellow.
    phase: Axis,
    /// Steps left until the phase flips.
    countdown: u32,
}

impl FixedTwoPhase {
    /// Creates a policy which starts with north-south green.
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            pending: None,
            phase: Axis::NorthSouth,
            countdown: timing.green,
        }
    }

    /// Enters the given phase.
    fn enter(&mut self, phase: Axis, lights: &mut [Light]) {
        if let Some(timing) = self.pending.take() {
            self.timing = timing;
        }
        self.phase = phase;
        self.countdown = self.timing.green;
        for light in lights.iter_mut() {
            let state = if light.direction().axis() == phase {
                LightState::Green
            } else {
                LightState::Red
            };
            light.set(state, self.duration(state));
        }
    }

    fn duration(&self, state: LightState) -> u32 {
        match state {
            LightState::Green => self.timing.green - self.timing.yellow,
            LightState::Yellow => self.timing.yellow,
            LightState::Red => self.timing.green,
        }
    }
}

impl SignalPolicy for FixedTwoPhase {
    fn initialize(&mut self, lights: &mut [Light]) {
        self.enter(Axis::NorthSouth, lights);
    }

    fn step(&mut self, lights: &mut [Light]) {
        self.countdown = self.countdown.saturating_sub(1);

        if self.countdown == 0 {
            let phase = self.phase.orthogonal();
            log::debug!("phase {} -> {}", self.phase, phase);
            self.enter(phase, lights);
            return;
        }

        for light in lights.iter() {
            let state = light.state();
            let next = if self.countdown == self.timing.yellow
                && light.direction().axis() == self.phase
                && state == LightState::Green
            {
                LightState::Yellow
            } else {
                state
            };
            light.stage(next);
        }
        for light in lights.iter_mut() {
            light.apply(|state| self.duration(state));
        }
    }

    fn set_timing(&mut self, timing: Timing) {
        self.pending = Some(timing);
    }

    fn phase(&self) -> Option<Axis> {
        Some(self.phase)
    }

    fn time_remaining(&self) -> Option<u32> {
        Some(self.countdown)
    }
}
