// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// likertscan — scan Likert answer-sheet photos and print the scores as JSON.
//
// Entry point. Initialises logging (to stderr, so stdout stays valid JSON),
// parses the command line, and dispatches to the scan or simulate command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use likertscan_cli::{load_configuration, load_settings, scan_files};
use likertscan_core::human_errors::humanize_error;
use likertscan_core::{DetectionPolicy, ScanError};
use likertscan_omr::{OmrPipeline, simulate_scan};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "likertscan")]
#[command(version, about = "Likert answer-sheet scanner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one or more answer-sheet photos
    Scan {
        /// Image files (JPEG, PNG, ...)
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        /// Survey configuration JSON file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Scan settings JSON file (grid layout, thresholds, detection policy)
        #[arg(short, long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Reverse-keyed items, e.g. "2, 5 7;9". Overrides the config file
        #[arg(short, long, value_name = "ITEMS")]
        reverse: Option<String>,

        /// Fail when the sheet boundary cannot be found instead of reading
        /// the photo as taken
        #[arg(long)]
        strict: bool,

        /// Number of parallel threads
        #[arg(short = 'j', long, value_name = "N")]
        threads: Option<usize>,
    },

    /// Print a random result for a configuration, without an image
    Simulate {
        /// Survey configuration JSON file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Reverse-keyed items. Overrides the config file
        #[arg(short, long, value_name = "ITEMS")]
        reverse: Option<String>,

        /// Seed for a reproducible result
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Scan {
            images,
            config,
            settings,
            reverse,
            strict,
            threads,
        } => run_scan(images, config, settings, reverse, strict, threads),
        Commands::Simulate {
            config,
            reverse,
            seed,
        } => run_simulate(config, reverse, seed),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            let human = humanize_error(&err);
            eprintln!("Error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            tracing::debug!(error = %err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

fn run_scan(
    images: Vec<PathBuf>,
    config: Option<PathBuf>,
    settings: Option<PathBuf>,
    reverse: Option<String>,
    strict: bool,
    threads: Option<usize>,
) -> Result<ExitCode, ScanError> {
    let config = load_configuration(config.as_deref(), reverse.as_deref())?;
    let mut settings = load_settings(settings.as_deref())?;
    if strict {
        settings.detection_policy = DetectionPolicy::Strict;
    }

    if let Some(num_threads) = threads {
        if let Err(err) = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            tracing::warn!(error = %err, "Could not configure thread pool; using default");
        }
    }

    let pipeline = OmrPipeline::new(settings);
    let reports = scan_files(&pipeline, &images, &config);
    let failures = reports.iter().filter(|r| !r.is_ok()).count();

    println!("{}", serde_json::to_string_pretty(&reports)?);
    tracing::info!(
        files = reports.len(),
        failures,
        "Scan finished"
    );

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_simulate(
    config: Option<PathBuf>,
    reverse: Option<String>,
    seed: Option<u64>,
) -> Result<ExitCode, ScanError> {
    let config = load_configuration(config.as_deref(), reverse.as_deref())?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let result = simulate_scan(&config, &mut rng)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}
