//! Terminal reports for `chem` runs.

use std::fmt::Write;

use crate::fit::{EmscFit, EmscOptions};
use crate::smooth::PenaltySearch;

/// Number of samples listed in the EMSC coefficient table.
const MAX_LISTED_SAMPLES: usize = 10;

/// Describe an EMSC run: settings, convergence and leading coefficients.
pub fn format_emsc_summary(opts: &EmscOptions, fit: &EmscFit) -> String {
    let mut out = String::new();
    let (n, m) = fit.pretreated.shape();

    let _ = writeln!(out, "EMSC: {n} samples × {m} variables");
    let _ = writeln!(
        out,
        "  baseline order {}, {} background term(s), normalize={}, asym_factor={}",
        opts.p_order,
        opts.background.n_terms(),
        opts.normalize,
        opts.asym_factor
    );
    if fit.converged {
        let _ = writeln!(out, "  ALS converged (max {} iterations)", fit.max_iterations);
    } else {
        let _ = writeln!(
            out,
            "  ALS hit the iteration cap of {}; coefficients are the last estimate",
            opts.max_iter
        );
    }

    let terms = opts.term_names();
    let _ = write!(out, "\n{:>8}", "sample");
    for t in &terms {
        let _ = write!(out, " {t:>14}");
    }
    let _ = writeln!(out);

    for i in 0..n.min(MAX_LISTED_SAMPLES) {
        let _ = write!(out, "{i:>8}");
        for k in 0..terms.len() {
            let _ = write!(out, " {:>14.6e}", fit.coefficients[(k, i)]);
        }
        let _ = writeln!(out);
    }
    if n > MAX_LISTED_SAMPLES {
        let _ = writeln!(out, "{:>8}", format!("(+{})", n - MAX_LISTED_SAMPLES));
    }
    out
}

/// Table of cross-validation errors, best penalty marked with `*`.
pub fn format_penalty_search(search: &PenaltySearch, constraint_order: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Whittaker penalty search (difference order {constraint_order})");
    let _ = writeln!(out, "{:>14} {:>14}", "penalty", "cve");
    for s in &search.scores {
        let mark = if s.penalty == search.best.penalty { "*" } else { "" };
        let _ = writeln!(out, "{:>14.4e} {:>14.6e} {mark}", s.penalty, s.cve);
    }
    let _ = writeln!(
        out,
        "\nbest penalty: {:.4e} (cve {:.6e})",
        search.best.penalty, search.best.cve
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::emsc;
    use crate::smooth::PenaltyScore;
    use nalgebra::DMatrix;

    #[test]
    fn emsc_summary_lists_terms_and_truncates_samples() {
        let d = DMatrix::from_fn(12, 8, |i, j| (1.0 + 0.1 * i as f64) * (j as f64).powi(2) + i as f64);
        let opts = EmscOptions {
            p_order: 0,
            ..EmscOptions::default()
        };
        let fit = emsc(&d, &opts).unwrap();
        let text = format_emsc_summary(&opts, &fit);

        assert!(text.contains("12 samples × 8 variables"));
        assert!(text.contains("baseline_0"));
        assert!(text.contains("chemical"));
        assert!(text.contains("(+2)"));
    }

    #[test]
    fn penalty_table_marks_best() {
        let best = PenaltyScore {
            penalty: 10.0,
            cve: 0.5,
        };
        let search = PenaltySearch {
            best,
            scores: vec![
                PenaltyScore {
                    penalty: 1.0,
                    cve: 0.9,
                },
                best,
            ],
        };
        let text = format_penalty_search(&search, 2);
        let marked: Vec<&str> = text.lines().filter(|l| l.ends_with('*')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("1.0000e1"));
    }
}
