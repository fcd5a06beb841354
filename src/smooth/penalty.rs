//! Penalty selection for the Whittaker smoother.
//!
//! The penalty is chosen by a deterministic grid search over log-spaced
//! candidates, scoring each by its cross-validation error. Candidates are
//! evaluated in parallel; ties resolve to the earliest grid entry.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::ChemError;
use crate::smooth::whittaker::whittaker_cve;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, ChemError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(ChemError::InvalidParameter(format!(
            "Invalid penalty range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(ChemError::InvalidParameter(
            "Penalty steps must be >= 2.".to_string(),
        ));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    Ok((0..steps).map(|i| (ln_min + step * i as f64).exp()).collect())
}

/// Cross-validation score of one candidate penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyScore {
    pub penalty: f64,
    pub cve: f64,
}

/// Outcome of a penalty grid search.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltySearch {
    pub best: PenaltyScore,
    /// Scores of all candidates that could be evaluated, in grid order.
    pub scores: Vec<PenaltyScore>,
}

/// Pick the penalty with the lowest cross-validation error.
///
/// Candidates for which the error is undefined (e.g. `λ = 0`) are skipped.
pub fn optimize_penalty(
    x: &DMatrix<f64>,
    penalties: &[f64],
    constraint_order: usize,
) -> Result<PenaltySearch, ChemError> {
    if penalties.is_empty() {
        return Err(ChemError::InvalidParameter("Penalty grid is empty.".to_string()));
    }

    let scores: Vec<PenaltyScore> = penalties
        .par_iter()
        .filter_map(|&penalty| match whittaker_cve(x, penalty, constraint_order) {
            Ok(cve) if cve.is_finite() => Some(PenaltyScore { penalty, cve }),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Skipping penalty {penalty}: {e}");
                None
            }
        })
        .collect();

    let Some(first) = scores.first().copied() else {
        return Err(ChemError::InvalidParameter(
            "No penalty in the grid produced a finite cross-validation error.".to_string(),
        ));
    };

    let best = scores[1..]
        .iter()
        .fold(first, |best, s| if s.cve < best.cve { *s } else { best });

    Ok(PenaltySearch { best, scores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Normal;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_space_rejects_bad_ranges() {
        assert!(log_space(0.0, 10.0, 5).is_err());
        assert!(log_space(10.0, 1.0, 5).is_err());
        assert!(log_space(1.0, 10.0, 1).is_err());
    }

    #[test]
    fn search_picks_the_lowest_score_and_skips_undefined() {
        let mut rng = StdRng::seed_from_u64(9);
        let noise = Normal::new(0.0, 0.05).unwrap();
        let x = DMatrix::from_fn(120, 1, |i, _| (i as f64 / 15.0).sin() + noise.sample(&mut rng));

        let mut grid = vec![0.0];
        grid.extend(log_space(1e-2, 1e6, 9).unwrap());
        let search = optimize_penalty(&x, &grid, 2).unwrap();

        assert_eq!(search.scores.len(), 9);
        assert!(search.scores.iter().all(|s| s.penalty > 0.0));
        for s in &search.scores {
            assert!(search.best.cve <= s.cve);
        }
        // Neither the near-interpolating nor the near-linear end should win.
        assert!(search.best.penalty > 1e-2 && search.best.penalty < 1e6);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let x = DMatrix::from_element(10, 1, 1.0);
        assert!(optimize_penalty(&x, &[], 2).is_err());
        assert!(optimize_penalty(&x, &[0.0], 2).is_err());
    }
}
