//! Small dense least-squares kernel used by the regression-based models

/// Pivot magnitude below which a system is treated as singular
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Arithmetic mean; `0.0` for an empty slice
pub(crate) fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Ordinary least squares via the normal equations
///
/// `design` holds one row of regressors per target. Returns `None` when the
/// system is singular, the shapes disagree, or there are no regressors.
pub(crate) fn least_squares(design: &[Vec<f64>], targets: &[f64]) -> Option<Vec<f64>> {
    solve(normal_equations(design, targets)?)
}

/// Least squares with `penalty * max(diag(X'X), 1)` added to the diagonal
///
/// Solvable for any positive penalty, including designs with fewer rows
/// than regressors or collinear columns.
pub(crate) fn ridge_least_squares(
    design: &[Vec<f64>],
    targets: &[f64],
    penalty: f64,
) -> Option<Vec<f64>> {
    let mut system = normal_equations(design, targets)?;
    let k = system.len();
    let scale = (0..k).fold(1.0_f64, |acc, i| acc.max(system[i][i]));
    for (i, row) in system.iter_mut().enumerate() {
        row[i] += penalty * scale;
    }
    solve(system)
}

/// Augmented normal-equation matrix `[X'X | X'y]`
fn normal_equations(design: &[Vec<f64>], targets: &[f64]) -> Option<Vec<Vec<f64>>> {
    let k = design.first()?.len();
    if k == 0 || design.len() != targets.len() || design.iter().any(|row| row.len() != k) {
        return None;
    }

    let mut system = vec![vec![0.0; k + 1]; k];
    for (row, &y) in design.iter().zip(targets) {
        for i in 0..k {
            for j in 0..k {
                system[i][j] += row[i] * row[j];
            }
            system[i][k] += row[i] * y;
        }
    }
    Some(system)
}

/// Gaussian elimination with partial pivoting on an augmented matrix
fn solve(mut system: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let k = system.len();
    let scale = system
        .iter()
        .flat_map(|row| row[..k].iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for col in 0..k {
        let pivot = (col..k).max_by(|&a, &b| {
            system[a][col]
                .abs()
                .partial_cmp(&system[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if system[pivot][col].abs() < SINGULAR_TOLERANCE * scale {
            return None;
        }
        system.swap(col, pivot);

        for row in (col + 1)..k {
            let ratio = system[row][col] / system[col][col];
            if ratio == 0.0 {
                continue;
            }
            for c in col..=k {
                system[row][c] -= ratio * system[col][c];
            }
        }
    }

    let mut solution = vec![0.0; k];
    for row in (0..k).rev() {
        let tail: f64 = ((row + 1)..k).map(|c| system[row][c] * solution[c]).sum();
        solution[row] = (system[row][k] - tail) / system[row][row];
    }

    solution.iter().all(|v| v.is_finite()).then_some(solution)
}
