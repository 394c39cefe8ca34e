//! SciPy optimization functions port.
//!
//! Ported from scipy.optimize.linear_sum_assignment
//! License: BSD 3-Clause (SciPy Developers)
#![allow(clippy::needless_range_loop)]

use nalgebra::DMatrix;

/// Represents a match between a row index and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub row_idx: usize,
    pub col_idx: usize,
}

/// Result of linear sum assignment.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    /// Assignments (row, col pairs), ordered by row index
    pub assignments: Vec<Assignment>,
}

/// Solve the rectangular linear sum assignment problem.
///
/// Finds the assignment of `min(rows, cols)` pairs with minimal total cost.
/// Every row is matched when `rows <= cols`, every column otherwise. No cost
/// threshold is applied here; callers gate the result themselves.
///
/// Non-finite entries are treated as the largest finite entry of the matrix
/// plus one, so they only win when nothing else is available.
///
/// # Algorithm
/// Shortest augmenting path with row/column potentials (Hungarian method in
/// the Jonker-Volgenant formulation), O(n^2 m).
pub fn linear_sum_assignment(cost_matrix: &DMatrix<f64>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.shape();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            assignments: Vec::new(),
        };
    }

    let cost = sanitize(cost_matrix);

    // The solver needs rows <= cols; solve the transpose otherwise.
    let pairs: Vec<(usize, usize)> = if num_rows <= num_cols {
        shortest_augmenting_path(&cost)
    } else {
        shortest_augmenting_path(&cost.transpose())
            .into_iter()
            .map(|(col, row)| (row, col))
            .collect()
    };

    let mut assignments: Vec<Assignment> = pairs
        .into_iter()
        .map(|(row_idx, col_idx)| Assignment { row_idx, col_idx })
        .collect();
    assignments.sort_by_key(|a| a.row_idx);

    AssignmentResult { assignments }
}

fn sanitize(cost_matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let max_finite = cost_matrix
        .iter()
        .cloned()
        .filter(|c| c.is_finite())
        .fold(0.0_f64, f64::max);
    cost_matrix.map(|c| if c.is_finite() { c } else { max_finite + 1.0 })
}

/// Core solver for `rows <= cols`. Returns (row, col) pairs, one per row.
fn shortest_augmenting_path(cost: &DMatrix<f64>) -> Vec<(usize, usize)> {
    let (n, m) = cost.shape();

    // 1-based indexing; index 0 is the virtual source column/row.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; m + 1];
    let mut col_owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for row in 1..=n {
        col_owner[0] = row;
        let mut j0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = col_owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let reduced = cost[(i0 - 1, j - 1)] - u[i0] - v[j];
                if reduced < min_slack[j] {
                    min_slack[j] = reduced;
                    way[j] = j0;
                }
                // Strict comparison keeps the first minimal column on ties.
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[col_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if col_owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the source.
        loop {
            let j1 = way[j0];
            col_owner[j0] = col_owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    (1..=m)
        .filter(|&j| col_owner[j] != 0)
        .map(|j| (col_owner[j] - 1, j - 1))
        .collect()
}
