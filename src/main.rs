// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use dnssync::{
    config::{Backend, Cli, Commands, SyncArgs, ValidateArgs},
    constants::{
        DIG_BINARY, EXIT_CODE_RECORD_FAILURES, EXIT_CODE_VALIDATION_FAILED, NSUPDATE_BINARY,
        TOKIO_WORKER_THREADS,
    },
    desired::validate_desired,
    dns::{
        command::{locate_binary, DigZoneReader, NsupdateApplier},
        transfer::HickoryZoneReader,
        tsig::{generate_tsig_key, render_key_file},
        update::HickoryUpdateApplier,
        UpdateApplier, ZoneReader,
    },
    logging::init_logging,
    metrics::write_textfile,
    reconciler::{Reconciler, SyncSummary},
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_format, cli.log_file.as_deref()) {
        eprintln!("dnssync: {e:#}");
        return ExitCode::FAILURE;
    }
    debug!("Logging initialized with file and line number tracking");

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Sync(args) => {
            // Build Tokio runtime with custom thread names
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(TOKIO_WORKER_THREADS)
                .thread_name("dnssync")
                .enable_all()
                .build()?;

            runtime.block_on(sync(args))
        }
        Commands::Validate(args) => validate(&args),
        Commands::Keygen(args) => {
            print!("{}", render_key_file(&generate_tsig_key(&args.name)));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions(args) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(args.shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn validate(args: &ValidateArgs) -> Result<ExitCode> {
    let report = validate_desired(&args.csv_file)?;

    for issue in &report.issues {
        println!("{issue}");
    }

    if report.is_valid() {
        println!("CSV validation passed.");
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            "{} failed validation: {} issue(s), {} valid row(s)",
            args.csv_file.display(),
            report.issues.len(),
            report.valid_rows
        );
        Ok(ExitCode::from(EXIT_CODE_VALIDATION_FAILED))
    }
}

/// Build the zone reader and update applier for the configured backend.
fn build_backend(args: &SyncArgs) -> Result<(Arc<dyn ZoneReader>, Arc<dyn UpdateApplier>)> {
    let timeout = args.timeout();

    let (reader, applier): (Arc<dyn ZoneReader>, Arc<dyn UpdateApplier>) = match args.backend {
        Backend::Native => (
            Arc::new(HickoryZoneReader::new(timeout)),
            Arc::new(HickoryUpdateApplier::new(timeout)),
        ),
        Backend::Command => {
            let dig = locate_binary(args.dig_path.as_deref(), DIG_BINARY)?;
            let nsupdate = locate_binary(args.nsupdate_path.as_deref(), NSUPDATE_BINARY)?;
            (
                Arc::new(DigZoneReader::new(dig, timeout)),
                Arc::new(NsupdateApplier::new(nsupdate, timeout)),
            )
        }
    };

    Ok((reader, applier))
}

async fn write_summary(path: &Path, summary: &SyncSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}

async fn sync(args: SyncArgs) -> Result<ExitCode> {
    info!("Starting DNS sync");

    let (reader, applier) = build_backend(&args)?;
    if !args.tsig_key.is_file() {
        warn!(
            "TSIG key file not found: {}; every update will fail",
            args.tsig_key.display()
        );
    }

    let reconciler = Reconciler::new(reader, applier, args.settings());
    let result = reconciler.run().await;

    // Metrics are written for failed runs too
    if let Some(path) = &args.metrics_file {
        if let Err(e) = write_textfile(path).await {
            warn!("{:#}", e);
        }
    }

    let summary = result?;

    if let Some(path) = &args.summary_json {
        write_summary(path, &summary).await?;
        info!("Summary written to {}", path.display());
    }

    for failure in summary.failures() {
        warn!(
            "Failed record: {} ({})",
            failure.fqdn,
            failure.message.as_deref().unwrap_or("unknown error")
        );
    }

    if args.fail_on_record_error && !summary.is_success() {
        return Ok(ExitCode::from(EXIT_CODE_RECORD_FAILURES));
    }
    Ok(ExitCode::SUCCESS)
}
