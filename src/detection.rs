//! Detection struct for input to the tracker.

use crate::internal::scipy::euclidean;
use crate::{Error, Result};
use nalgebra::Point2;

/// A 2D position in the detector's coordinate space (typically pixels).
pub type Point = Point2<f64>;

/// One object centroid observed in a single frame.
///
/// Detections carry no identity; the tracker decides which slot (if any) a
/// detection continues. Coordinates are always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    point: Point,
}

impl Detection {
    /// Create a detection at `(x, y)`.
    ///
    /// # Errors
    /// Returns `Error::InvalidDetection` if either coordinate is NaN or infinite.
    pub fn new(x: f64, y: f64) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidDetection(format!(
                "coordinates must be finite, got ({}, {})",
                x, y
            )));
        }
        Ok(Self { point: Point::new(x, y) })
    }

    /// Create a detection from a `[x, y]` slice.
    pub fn from_slice(coords: &[f64]) -> Result<Self> {
        match coords {
            [x, y] => Self::new(*x, *y),
            _ => Err(Error::InvalidDetection(format!(
                "expected 2 coordinates, got {}",
                coords.len()
            ))),
        }
    }

    /// Build a frame's detections from `(x, y)` pairs, rejecting the whole
    /// frame if any pair is invalid.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Vec<Self>> {
        pairs.iter().map(|&(x, y)| Self::new(x, y)).collect()
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.point.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.point.y
    }

    #[inline]
    pub fn point(&self) -> Point {
        self.point
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        euclidean(&self.point, other)
    }
}

impl TryFrom<(f64, f64)> for Detection {
    type Error = Error;

    fn try_from((x, y): (f64, f64)) -> Result<Self> {
        Self::new(x, y)
    }
}

impl TryFrom<[f64; 2]> for Detection {
    type Error = Error;

    fn try_from([x, y]: [f64; 2]) -> Result<Self> {
        Self::new(x, y)
    }
}

impl From<Detection> for Point {
    fn from(detection: Detection) -> Self {
        detection.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_detection_new() {
        let det = Detection::new(10.0, 20.0).unwrap();

        assert_relative_eq!(det.x(), 10.0, epsilon = 1e-10);
        assert_relative_eq!(det.y(), 20.0, epsilon = 1e-10);
        assert_eq!(det.point(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_detection_rejects_non_finite() {
        assert!(Detection::new(f64::NAN, 0.0).is_err());
        assert!(Detection::new(0.0, f64::INFINITY).is_err());
        assert!(Detection::new(f64::NEG_INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_detection_from_slice() {
        let det = Detection::from_slice(&[1.0, 2.0]).unwrap();
        assert_eq!(det.point(), Point::new(1.0, 2.0));

        assert!(Detection::from_slice(&[1.0]).is_err());
        assert!(Detection::from_slice(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_detection_from_pairs() {
        let dets = Detection::from_pairs(&[(1.0, 2.0), (3.0, 4.0)]).unwrap();
        assert_eq!(dets.len(), 2);

        assert!(Detection::from_pairs(&[(1.0, 2.0), (f64::NAN, 4.0)]).is_err());
    }

    #[test]
    fn test_detection_distance_to() {
        let det = Detection::new(3.0, 4.0).unwrap();
        assert_relative_eq!(det.distance_to(&Point::origin()), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_detection_try_from() {
        let det: Detection = (5.0, 6.0).try_into().unwrap();
        assert_eq!(det.point(), Point::new(5.0, 6.0));

        let det = Detection::try_from([7.0, 8.0]).unwrap();
        assert_eq!(Point::from(det), Point::new(7.0, 8.0));
    }
}
