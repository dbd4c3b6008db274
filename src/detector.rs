use crate::math::Point2d;
use crate::Direction;
use cgmath::InnerSpace;

/// A passive counter of the vehicles crossing a line across one approach.
#[derive(Clone, Debug)]
pub struct Detector {
    /// The direction of travel of the vehicles counted.
    direction: Direction,
    /// A point on the detection line.
    position: Point2d,
    /// How far upstream of the road edge the detector sits.
    distance: f64,
    /// The number of vehicles counted.
    count: usize,
}

impl Detector {
    pub(crate) fn new(direction: Direction, position: Point2d, distance: f64) -> Self {
        Self {
            direction,
            position,
            distance,
            count: 0,
        }
    }

    /// The direction of travel of the vehicles counted.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// A point on the detection line.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// How far upstream of the road edge the detector sits.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// The number of vehicles counted.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Counts a vehicle if it moved from before the line to on or past it.
    /// Returns `true` iff the vehicle was counted.
    pub(crate) fn observe(&mut self, from: Point2d, to: Point2d, direction: Direction) -> bool {
        if direction != self.direction {
            return false;
        }
        let tan = direction.vector();
        let crossed = (self.position - from).dot(tan) > 0.0 && (self.position - to).dot(tan) <= 0.0;
        if crossed {
            self.count += 1;
        }
        crossed
    }

    pub(crate) fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_crossings_in_its_direction_only() {
        let mut detector = Detector::new(Direction::South, Point2d::new(500.0, 290.0), 50.0);
        assert!(!detector.observe(
            Point2d::new(515.0, 280.0),
            Point2d::new(515.0, 288.0),
            Direction::South
        ));
        assert!(detector.observe(
            Point2d::new(515.0, 288.0),
            Point2d::new(515.0, 291.0),
            Direction::South
        ));
        assert!(!detector.observe(
            Point2d::new(515.0, 291.0),
            Point2d::new(515.0, 288.0),
            Direction::North
        ));
        assert!(!detector.observe(
            Point2d::new(515.0, 291.0),
            Point2d::new(515.0, 294.0),
            Direction::South
        ));
        assert_eq!(detector.count(), 1);
    }
}
