//! End-to-end checks of the public pretreatment API.

use chemometrics::data::{DatasetSpec, generate_dataset};
use chemometrics::domain::Background;
use chemometrics::math::solve_least_squares_matrix;
use chemometrics::smooth::{log_space, optimize_penalty};
use chemometrics::{AlsOptions, Emsc, EmscOptions, asym_ls, emsc, whittaker, whittaker_cve};
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn synthetic(seed: u64) -> chemometrics::data::SyntheticDataset {
    let spec = DatasetSpec {
        n_samples: 12,
        n_wl: 80,
        ..DatasetSpec::default()
    };
    generate_dataset(&mut StdRng::seed_from_u64(seed), &spec).unwrap()
}

#[test]
fn als_at_half_asymmetry_matches_ordinary_least_squares() {
    let x = DMatrix::from_fn(30, 3, |i, j| ((i + 1) as f64).powi(j as i32) / 10.0);
    let y = DMatrix::from_fn(30, 2, |i, j| ((i * 7 + j * 3) % 11) as f64 - 0.2 * i as f64);

    let als = asym_ls(&x, &y, &AlsOptions::with_asym_factor(0.5)).unwrap();
    let ols = solve_least_squares_matrix(&x, &y).unwrap();

    assert_eq!(als.beta.shape(), (3, 2));
    assert!(als.converged());
    assert!((als.beta - ols).amax() < 1e-8);
}

#[test]
fn emsc_removes_a_scaled_copy_of_the_background() {
    let d = DMatrix::from_fn(10, 50, |_, j| j as f64);
    let background = DMatrix::from_fn(50, 1, |j, _| 0.5 * d[(0, j)]);
    let opts = EmscOptions {
        p_order: 0,
        background: Background::Spectra(background),
        ..EmscOptions::default()
    };

    let fit = emsc(&d, &opts).unwrap();
    assert_eq!(fit.pretreated.shape(), (10, 50));
    assert!(fit.pretreated.amax() < 1e-8);
}

#[test]
fn coefficient_rows_follow_samples_with_and_without_background() {
    let ds = synthetic(5);
    let n = ds.data.nrows();

    let mut plain = Emsc::new(EmscOptions::default());
    let pretreated = plain.fit_transform(&ds.data).unwrap();
    assert_eq!(pretreated.shape(), ds.data.shape());
    assert_eq!(plain.coefficients().unwrap().shape(), (n, 3 + 1));

    let mut with_bg = Emsc::new(EmscOptions {
        background: Background::Spectra(ds.backgrounds.columns(0, 2).into_owned()),
        ..EmscOptions::default()
    });
    let pretreated = with_bg.fit_transform(&ds.data).unwrap();
    assert_eq!(pretreated.shape(), ds.data.shape());
    assert_eq!(with_bg.coefficients().unwrap().shape(), (n, 3 + 2 + 1));
}

fn assert_second_pass_is_stable(data: &DMatrix<f64>, opts: &EmscOptions) {
    let first = emsc(data, opts).unwrap().pretreated;
    let second = emsc(&first, opts).unwrap().pretreated;

    let scale = first.amax().max(1.0);
    let change = (&second - &first).amax();
    assert!(change < 1e-8 * scale, "second pass changed data by {change}");
}

#[test]
fn second_emsc_pass_leaves_pretreated_data_unchanged() {
    let ds = synthetic(11);
    let opts = EmscOptions {
        p_order: 2,
        background: Background::Spectra(ds.backgrounds.columns(0, 2).into_owned()),
        asym_factor: 0.5,
        ..EmscOptions::default()
    };
    assert_second_pass_is_stable(&ds.data, &opts);
}

#[test]
fn second_emsc_pass_is_stable_with_default_options() {
    for seed in [5, 11, 23] {
        assert_second_pass_is_stable(&synthetic(seed).data, &EmscOptions::default());
    }
}

#[test]
fn whittaker_cross_validation_on_synthetic_spectra() {
    let ds = synthetic(23);
    // Variables along rows for the smoother.
    let x = ds.data.transpose();

    let smoothed = whittaker(&x, 10.0, 2).unwrap();
    assert_eq!(smoothed.shape(), x.shape());

    let cve = whittaker_cve(&x, 10.0, 2).unwrap();
    assert!(cve.is_finite() && cve > 0.0);

    let grid = log_space(1e-2, 1e6, 9).unwrap();
    let search = optimize_penalty(&x, &grid, 2).unwrap();
    assert_eq!(search.scores.len(), grid.len());
    assert!(grid.contains(&search.best.penalty));
    assert!(search.scores.iter().all(|s| s.cve >= search.best.cve));
}
