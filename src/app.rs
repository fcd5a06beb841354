//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and the optional config file
//! - loads CSV inputs
//! - runs the requested pretreatment
//! - prints reports and writes outputs

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::{Command, CveArgs, EmscArgs, SynthArgs, WhittakerArgs};
use crate::data::{DatasetSpec, generate_dataset};
use crate::domain::{EmscSettings, PretreatConfig, WhittakerSettings};
use crate::error::AppError;
use crate::io::{
    EmscSummary, LabeledMatrix, load_config, read_matrix_csv, write_matrix_csv, write_summary_json,
};

pub mod pipeline;

/// Entry point for the `chem` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Emsc(args) => handle_emsc(args, &config),
        Command::Whittaker(args) => handle_whittaker(args, &config),
        Command::Cve(args) => handle_cve(args, &config),
        Command::Synth(args) => handle_synth(args),
    }
}

fn handle_emsc(args: EmscArgs, config: &PretreatConfig) -> Result<(), AppError> {
    let settings = emsc_settings(&args, &config.emsc);
    let data = load_input(&args.input)?;
    let background = args
        .background
        .as_deref()
        .map(|path| read_matrix_csv(path, !args.input.no_header))
        .transpose()?;

    log::info!(
        "EMSC on {} samples × {} variables",
        data.values.nrows(),
        data.values.ncols()
    );
    let run = pipeline::run_emsc(&data.values, background.as_ref().map(|b| &b.values), &settings)?;

    println!("{}", crate::report::format_emsc_summary(&run.options, &run.fit));

    write_matrix_csv(&args.output, data.header.as_deref(), &run.fit.pretreated)?;
    if let Some(path) = &args.coefficients {
        let terms = run.options.term_names();
        write_matrix_csv(path, Some(terms.as_slice()), &run.fit.coefficients.transpose())?;
    }
    if let Some(path) = &args.summary {
        write_summary_json(path, &EmscSummary::new(&run.options, &run.fit))?;
    }
    Ok(())
}

fn handle_whittaker(args: WhittakerArgs, config: &PretreatConfig) -> Result<(), AppError> {
    let settings = WhittakerSettings {
        penalty: args.penalty.unwrap_or(config.whittaker.penalty),
        constraint_order: args.order.unwrap_or(config.whittaker.constraint_order),
    };
    let data = load_input(&args.input)?;

    log::info!(
        "Whittaker smoothing of {} samples (penalty={}, order={})",
        data.values.nrows(),
        settings.penalty,
        settings.constraint_order
    );
    let smoothed = pipeline::run_whittaker(&data.values, &settings)?;
    write_matrix_csv(&args.output, data.header.as_deref(), &smoothed)
}

fn handle_cve(args: CveArgs, config: &PretreatConfig) -> Result<(), AppError> {
    let order = args.order.unwrap_or(config.whittaker.constraint_order);
    let data = load_input(&args.input)?;

    let search = pipeline::run_penalty_search(
        &data.values,
        order,
        args.penalty_min,
        args.penalty_max,
        args.steps,
    )?;
    println!("{}", crate::report::format_penalty_search(&search, order));
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let spec = DatasetSpec {
        n_samples: args.samples,
        n_wl: args.n_wl,
        n_band: args.bands,
        bandwidth: args.bandwidth,
        rel_lengthscale: args.lengthscale,
        scale_spread: args.scale_spread,
    };
    let mut rng = StdRng::seed_from_u64(args.seed);
    let dataset = generate_dataset(&mut rng, &spec)?;

    let header: Vec<String> = (0..spec.n_wl).map(|j| j.to_string()).collect();
    write_matrix_csv(&args.output, Some(header.as_slice()), &dataset.data)?;
    log::info!(
        "Wrote {} synthetic spectra to {}",
        spec.n_samples,
        args.output.display()
    );
    Ok(())
}

fn load_input(args: &crate::cli::InputArgs) -> Result<LabeledMatrix, AppError> {
    read_matrix_csv(&args.input, !args.no_header)
}

/// Resolve EMSC settings: CLI flags over config file over defaults.
pub fn emsc_settings(args: &EmscArgs, base: &EmscSettings) -> EmscSettings {
    EmscSettings {
        p_order: args.p_order.unwrap_or(base.p_order),
        normalize: args.normalize || base.normalize,
        asym_factor: args.asym_factor.unwrap_or(base.asym_factor),
        max_iter: args.max_iter.unwrap_or(base.max_iter),
        background_fit: args.background_fit.unwrap_or(base.background_fit),
    }
}
