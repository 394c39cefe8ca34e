//! Slot-to-detection matching.
//!
//! Builds the slot x detection cost matrix, solves the optimal assignment
//! over all of it and then gates each pair by distance.

use nalgebra::DMatrix;

use crate::internal::scipy::{euclidean, linear_sum_assignment};
use crate::{Detection, Point};

/// Cost of pairing a slot that holds no position with any detection.
///
/// Large but finite so the solver stays numerically well-behaved.
pub const UNREACHABLE_COST: f64 = 1.0e9;

/// Build the cost matrix (n_slots x n_detections).
///
/// Entry (i, j) is the Euclidean distance between slot i's position and
/// detection j, or [`UNREACHABLE_COST`] if slot i is empty.
pub fn build_cost_matrix(positions: &[Option<Point>], detections: &[Detection]) -> DMatrix<f64> {
    DMatrix::from_fn(positions.len(), detections.len(), |i, j| match positions[i] {
        Some(ref position) => euclidean(position, &detections[j].point()),
        None => UNREACHABLE_COST,
    })
}

/// Match slots to detections with a globally minimal total cost.
///
/// # Arguments
/// * `cost_matrix` - Cost matrix (n_slots x n_detections)
/// * `max_distance` - A pair is accepted only if its cost is strictly below this
///
/// # Returns
/// Tuple of (matched_slot_indices, matched_det_indices) where entry i indicates
/// the matched pair, ordered by slot index. Pairs the solver produced but the
/// gate rejected are not included.
pub fn match_slots_and_detections(
    cost_matrix: &DMatrix<f64>,
    max_distance: f64,
) -> (Vec<usize>, Vec<usize>) {
    let result = linear_sum_assignment(cost_matrix);

    result
        .assignments
        .iter()
        .filter(|a| {
            let cost = cost_matrix[(a.row_idx, a.col_idx)];
            cost < max_distance && cost < UNREACHABLE_COST
        })
        .map(|a| (a.row_idx, a.col_idx))
        .unzip()
}

/// Get unmatched indices from a match result.
pub fn get_unmatched(total: usize, matched: &[usize]) -> Vec<usize> {
    let mut is_matched = vec![false; total];
    for &idx in matched {
        is_matched[idx] = true;
    }
    (0..total).filter(|&i| !is_matched[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dets(pairs: &[(f64, f64)]) -> Vec<Detection> {
        Detection::from_pairs(pairs).unwrap()
    }

    // ===== Cost matrix =====

    #[test]
    fn test_cost_matrix_shape_and_values() {
        let positions = vec![Some(Point::new(0.0, 0.0)), None];
        let detections = dets(&[(3.0, 4.0), (0.0, 1.0), (6.0, 8.0)]);

        let cost = build_cost_matrix(&positions, &detections);

        assert_eq!(cost.shape(), (2, 3));
        assert_relative_eq!(cost[(0, 0)], 5.0, epsilon = 1e-10);
        assert_relative_eq!(cost[(0, 1)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(cost[(0, 2)], 10.0, epsilon = 1e-10);
        for j in 0..3 {
            assert_eq!(cost[(1, j)], UNREACHABLE_COST);
        }
    }

    #[test]
    fn test_cost_matrix_no_detections() {
        let positions = vec![Some(Point::new(0.0, 0.0)); 4];
        let cost = build_cost_matrix(&positions, &[]);
        assert_eq!(cost.shape(), (4, 0));
    }

    // ===== Matching =====

    #[test]
    fn test_perfect_matches() {
        let cost = DMatrix::from_row_slice(3, 3, &[
            0.5, 0.9, 0.8,
            0.9, 0.3, 0.7,
            0.8, 0.7, 0.4,
        ]);
        let (slots, dets) = match_slots_and_detections(&cost, 1.0);

        assert_eq!(slots, vec![0, 1, 2]);
        assert_eq!(dets, vec![0, 1, 2]);
    }

    #[test]
    fn test_gate_is_strict() {
        let cost = DMatrix::from_row_slice(2, 2, &[
            1.0, 9.0,
            9.0, 2.0,
        ]);
        let (slots, dets) = match_slots_and_detections(&cost, 2.0);

        // Cost 2.0 is not strictly below the gate.
        assert_eq!(slots, vec![0]);
        assert_eq!(dets, vec![0]);
    }

    #[test]
    fn test_optimal_avoids_identity_swap() {
        // Greedy nearest-neighbour would hand detection 0 to slot 0 (cost 1)
        // and leave slot 1 with cost 10; the optimum crosses them.
        let cost = DMatrix::from_row_slice(2, 2, &[
            1.0, 2.0,
            2.0, 10.0,
        ]);
        let (slots, dets) = match_slots_and_detections(&cost, 5.0);

        assert_eq!(slots, vec![0, 1]);
        assert_eq!(dets, vec![1, 0]);
    }

    #[test]
    fn test_unreachable_rows_never_match() {
        let cost = DMatrix::from_row_slice(2, 2, &[
            UNREACHABLE_COST, UNREACHABLE_COST,
            3.0, 4.0,
        ]);
        // Even an absurd gate cannot accept a placeholder cell.
        let (slots, dets) = match_slots_and_detections(&cost, f64::MAX);

        assert_eq!(slots, vec![1]);
        assert_eq!(dets, vec![0]);
    }

    #[test]
    fn test_more_detections_than_slots() {
        let cost = DMatrix::from_row_slice(2, 4, &[
            5.0, 0.5, 9.0, 9.0,
            9.0, 9.0, 9.0, 0.2,
        ]);
        let (slots, dets) = match_slots_and_detections(&cost, 1.0);

        assert_eq!(slots, vec![0, 1]);
        assert_eq!(dets, vec![1, 3]);
    }

    #[test]
    fn test_match_empty() {
        let cost = DMatrix::zeros(0, 0);
        let (slots, dets) = match_slots_and_detections(&cost, 1.0);
        assert!(slots.is_empty());
        assert!(dets.is_empty());

        let cost = DMatrix::zeros(3, 0);
        let (slots, dets) = match_slots_and_detections(&cost, 1.0);
        assert!(slots.is_empty());
        assert!(dets.is_empty());
    }

    // ===== get_unmatched =====

    #[test]
    fn test_get_unmatched() {
        let unmatched = get_unmatched(5, &[1, 3]);
        assert_eq!(unmatched, vec![0, 2, 4]);
    }

    #[test]
    fn test_get_unmatched_none() {
        let unmatched = get_unmatched(3, &[0, 1, 2]);
        assert!(unmatched.is_empty());
    }

    #[test]
    fn test_get_unmatched_all() {
        let unmatched = get_unmatched(3, &[]);
        assert_eq!(unmatched, vec![0, 1, 2]);
    }
}
