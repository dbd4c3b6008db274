use crate::math::Point2d;
use crate::Direction;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// A single traffic light facing the vehicles travelling in one direction.
#[derive(Clone, Debug)]
pub struct Light {
    /// The direction of travel of the vehicles this light controls.
    direction: Direction,
    /// The world space position of the light, at its stop line.
    position: Point2d,
    /// The current state.
    state: LightState,
    /// The next state, staged by a signal policy before being applied.
    next_state: Cell<LightState>,
    /// The number of signal steps since the timer was last reset.
    timer: u32,
    /// The number of signal steps after which the timer expires.
    max_timer: u32,
}

/// The colour shown by a traffic light.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LightState {
    Red,
    Yellow,
    Green,
}

/// Phase durations, in whole signal steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// The length of a full green-then-yellow phase.
    pub green: u32,
    /// The portion of the phase spent showing yellow.
    pub yellow: u32,
}

impl Light {
    /// Creates a red light.
    pub(crate) fn new(direction: Direction, position: Point2d) -> Self {
        Self {
            direction,
            position,
            state: LightState::Red,
            next_state: Cell::new(LightState::Red),
            timer: 0,
            max_timer: 0,
        }
    }

    /// The direction of travel controlled by this light.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The world space position of the light.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The current state of the light.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// The number of signal steps since the light's timer was last reset.
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// The number of signal steps after which the light's timer expires.
    pub fn max_timer(&self) -> u32 {
        self.max_timer
    }

    /// Whether the timer expires on the next step.
    pub(crate) fn expires_next(&self) -> bool {
        self.timer + 1 >= self.max_timer
    }

    /// The staged next state.
    pub(crate) fn next_state(&self) -> LightState {
        self.next_state.get()
    }

    /// Stages the state the light will enter when [Self::apply] is next called.
    pub(crate) fn stage(&self, state: LightState) {
        self.next_state.set(state);
    }

    /// Immediately enters a state and restarts the timer.
    pub(crate) fn set(&mut self, state: LightState, max_timer: u32) {
        self.state = state;
        self.next_state.set(state);
        self.timer = 0;
        self.max_timer = max_timer;
    }

    /// Applies the staged state. The timer restarts if it has expired or the
    /// state changed, otherwise it counts up by one step.
    pub(crate) fn apply(&mut self, max_timer: impl Fn(LightState) -> u32) {
        let next = self.next_state.get();
        if next != self.state || self.expires_next() {
            if next != self.state {
                log::debug!("{} light {:?} -> {:?}", self.direction, self.state, next);
            }
            self.state = next;
            self.timer = 0;
            self.max_timer = max_timer(next);
        } else {
            self.timer += 1;
        }
    }
}

impl Timing {
    /// The number of steps a light stays in the given state before its
    /// timer expires. Red lights re-check whether they may turn green
    /// once per yellow interval.
    pub fn duration(&self, state: LightState) -> u32 {
        match state {
            LightState::Green => self.green,
            LightState::Yellow | LightState::Red => self.yellow,
        }
    }
}
