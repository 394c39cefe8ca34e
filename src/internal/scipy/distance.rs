//! Distance computation functions ported from scipy.spatial.distance

use nalgebra::Point2;

/// Euclidean (L2) distance between two 2D points.
///
/// Equivalent to `scipy.spatial.distance.euclidean(a, b)`.
#[inline]
pub fn euclidean(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_3_4_5() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_relative_eq!(euclidean(&a, &b), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_euclidean_symmetric_and_zero() {
        let a = Point2::new(12.5, -3.0);
        let b = Point2::new(-7.0, 9.25);
        assert_relative_eq!(euclidean(&a, &b), euclidean(&b, &a), epsilon = 1e-12);
        assert_eq!(euclidean(&a, &a), 0.0);
    }
}
