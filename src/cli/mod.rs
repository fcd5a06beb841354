//! Command-line parsing for the `chem` pretreatment tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numeric code. Option flags are `Option`s so that unset flags fall back to
//! the config file (and from there to the built-in defaults).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::BackgroundFit;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "chem", version, about = "Spectroscopic pretreatment: EMSC, ALS, Whittaker smoothing")]
pub struct Cli {
    /// TOML config file with `[emsc]` / `[whittaker]` sections.
    #[arg(long, global = true, value_name = "TOML")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extended multiplicative scatter correction of a spectra CSV.
    Emsc(EmscArgs),
    /// Whittaker-smooth every spectrum of a CSV.
    Whittaker(WhittakerArgs),
    /// Cross-validate Whittaker penalties on a log-spaced grid.
    Cve(CveArgs),
    /// Write a synthetic dataset (scaled spectra on smooth backgrounds).
    Synth(SynthArgs),
}

/// Input file options shared by the data-processing commands.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Spectra CSV: one sample per row, one variable per column.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// The CSV has no header row.
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Debug, Args, Clone)]
pub struct EmscArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Where to write the pretreated spectra.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// Background spectra CSV (one background per row, same variables as input).
    #[arg(long, value_name = "CSV")]
    pub background: Option<PathBuf>,

    /// Highest baseline polynomial order.
    #[arg(short = 'p', long)]
    pub p_order: Option<usize>,

    /// Divide each sample by its chemical-information coefficient.
    #[arg(long)]
    pub normalize: bool,

    /// ALS asymmetry factor in (0, 1).
    #[arg(short = 'a', long)]
    pub asym_factor: Option<f64>,

    /// ALS iteration cap per column.
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// How background spectra are orthogonalized against the baseline.
    #[arg(long, value_enum)]
    pub background_fit: Option<BackgroundFit>,

    /// Write per-sample coefficients to CSV.
    #[arg(long, value_name = "CSV")]
    pub coefficients: Option<PathBuf>,

    /// Write a JSON run summary.
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct WhittakerArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Where to write the smoothed spectra.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// Smoothing penalty (λ ≥ 0).
    #[arg(short = 'l', long)]
    pub penalty: Option<f64>,

    /// Order of the difference penalty.
    #[arg(short = 'd', long)]
    pub order: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct CveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Order of the difference penalty.
    #[arg(short = 'd', long)]
    pub order: Option<usize>,

    /// Smallest penalty on the grid.
    #[arg(long, default_value_t = 1e-2)]
    pub penalty_min: f64,

    /// Largest penalty on the grid.
    #[arg(long, default_value_t = 1e8)]
    pub penalty_max: f64,

    /// Number of grid points.
    #[arg(long, default_value_t = 21)]
    pub steps: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Where to write the dataset.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// Number of samples (rows).
    #[arg(short = 'n', long, default_value_t = 20)]
    pub samples: usize,

    /// Number of wavelengths (columns).
    #[arg(long, default_value_t = 200)]
    pub n_wl: usize,

    /// Number of Gaussian bands in the pure spectrum.
    #[arg(long, default_value_t = 10)]
    pub bands: usize,

    /// Gamma shape/scale of the band widths.
    #[arg(long, default_value_t = 3.0)]
    pub bandwidth: f64,

    /// Background length scale relative to the wavelength count.
    #[arg(long, default_value_t = 0.5)]
    pub lengthscale: f64,

    /// Standard deviation of the per-sample scaling.
    #[arg(long, default_value_t = 0.2)]
    pub scale_spread: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn emsc_flags_parse() {
        let cli = Cli::parse_from([
            "chem", "emsc", "-i", "d.csv", "-o", "out.csv", "-p", "0", "--normalize",
            "--background-fit", "symmetric", "--config", "c.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        let Command::Emsc(args) = cli.command else {
            panic!("expected emsc");
        };
        assert_eq!(args.p_order, Some(0));
        assert!(args.normalize);
        assert_eq!(args.background_fit, Some(BackgroundFit::Symmetric));
        assert_eq!(args.asym_factor, None);
    }
}
