use crate::detector::Detector;
use crate::light::{Light, LightState, Timing};
use crate::math::{project_local, rot90, Point2d};
use crate::signal::SignalPolicy;
use crate::{Axis, Direction, IntersectionId};
use arrayvec::ArrayVec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The approaches present at an intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Topology {
    /// A crossroads with a light for every direction.
    FourWay,
    /// A junction with no light for the omitted direction of travel.
    ThreeWay { omitted: Direction },
}

/// A signalised intersection of a north-south road and an east-west road.
pub struct Intersection {
    /// The intersection ID.
    id: IntersectionId,
    /// The geometric centre.
    centre: Point2d,
    /// The approaches present.
    topology: Topology,
    /// Half the width of each road.
    half_width: f64,
    /// The distance from the centre back to each stop line.
    stop_line_offset: f64,
    /// One light per direction present, in [Direction::ALL] order.
    lights: SmallVec<[Light; 4]>,
    /// One detector per direction present.
    detectors: SmallVec<[Detector; 4]>,
    /// Controls the lights.
    policy: Box<dyn SignalPolicy>,
}

/// The geometry needed to build an [Intersection].
#[derive(Clone, Copy, Debug)]
pub(crate) struct IntersectionAttributes {
    /// The geometric centre.
    pub centre: Point2d,
    /// The approaches present.
    pub topology: Topology,
    /// The width of each road.
    pub road_width: f64,
    /// The distance from the centre back to each stop line.
    pub stop_line_offset: f64,
    /// How far upstream of the road edge each detector sits.
    pub detector_distance: f64,
}

/// A vehicle's position relative to an intersection it is approaching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Approach {
    /// The signed distance to the stop line along the direction of travel,
    /// positive before the line is reached.
    pub distance: f64,
    /// The state of the light for the vehicle's direction, if there is one.
    pub light: Option<LightState>,
}

impl Topology {
    /// The directions of travel that have a light.
    pub fn directions(&self) -> ArrayVec<Direction, 4> {
        Direction::ALL
            .into_iter()
            .filter(|dir| match self {
                Topology::FourWay => true,
                Topology::ThreeWay { omitted } => dir != omitted,
            })
            .collect()
    }
}

impl Intersection {
    /// Creates an intersection with lights and detectors for every direction
    /// present, and puts the lights into the policy's initial phase.
    pub(crate) fn new(
        id: IntersectionId,
        attribs: &IntersectionAttributes,
        mut policy: Box<dyn SignalPolicy>,
    ) -> Self {
        let directions = attribs.topology.directions();
        let half_width = 0.5 * attribs.road_width;
        let upstream = |dir: Direction, dist: f64| attribs.centre - dist * dir.vector();

        let mut lights = directions
            .iter()
            .map(|dir| Light::new(*dir, upstream(*dir, attribs.stop_line_offset)))
            .collect::<SmallVec<[Light; 4]>>();

        let detectors = directions
            .iter()
            .map(|dir| {
                let position = upstream(*dir, half_width + attribs.detector_distance);
                Detector::new(*dir, position, attribs.detector_distance)
            })
            .collect();

        policy.initialize(&mut lights);

        Self {
            id,
            centre: attribs.centre,
            topology: attribs.topology,
            half_width,
            stop_line_offset: attribs.stop_line_offset,
            lights,
            detectors,
            policy,
        }
    }

    /// Gets the intersection's ID.
    pub fn id(&self) -> IntersectionId {
        self.id
    }

    /// The geometric centre.
    pub fn centre(&self) -> Point2d {
        self.centre
    }

    /// The approaches present.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The lights, one per direction present.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The light for vehicles travelling in the given direction.
    pub fn light(&self, direction: Direction) -> Option<&Light> {
        self.lights.iter().find(|light| light.direction() == direction)
    }

    /// The detectors, one per direction present.
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// The privileged pair of directions, if the signal policy has one.
    pub fn phase(&self) -> Option<Axis> {
        self.policy.phase()
    }

    /// The signal steps left in the current phase, if the policy counts down.
    pub fn time_remaining(&self) -> Option<u32> {
        self.policy.time_remaining()
    }

    /// Locates a point travelling in `direction` relative to this intersection.
    /// Returns `None` if the point is not on the road through the intersection
    /// in that direction.
    pub fn approach(&self, pos: Point2d, direction: Direction) -> Option<Approach> {
        let tan = direction.vector();
        let local = project_local(pos, self.centre, rot90(tan), tan);
        if local.x.abs() > self.half_width {
            return None;
        }
        Some(Approach {
            distance: -local.y - self.stop_line_offset,
            light: self.light(direction).map(|light| light.state()),
        })
    }

    /// Advances the lights by `steps` whole signal steps.
    pub(crate) fn advance_signals(&mut self, steps: u32) {
        if steps > 0 {
            self.policy.advance(&mut self.lights, steps);
        }
    }

    /// Restores the lights to the policy's initial phase.
    pub(crate) fn reset_signals(&mut self, timing: Timing) {
        self.policy.set_timing(timing);
        self.policy.initialize(&mut self.lights);
    }

    /// Changes the phase durations from the next phase boundary onwards.
    pub(crate) fn set_timing(&mut self, timing: Timing) {
        self.policy.set_timing(timing);
    }

    /// Clears the detector counts.
    pub(crate) fn reset_detectors(&mut self) {
        for detector in &mut self.detectors {
            detector.reset();
        }
    }

    /// Registers a vehicle's movement with the detectors on its road.
    pub(crate) fn observe(&mut self, from: Point2d, to: Point2d, direction: Direction) {
        let tan = direction.vector();
        let lateral = project_local(to, self.centre, rot90(tan), tan).x;
        if lateral.abs() > self.half_width {
            return;
        }
        for detector in &mut self.detectors {
            if detector.observe(from, to, direction) {
                log::debug!(
                    "detector {} at {:?} counted {}",
                    direction,
                    self.id,
                    detector.count()
                );
            }
        }
    }
}
