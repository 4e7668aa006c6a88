// src/main.rs
mod api;
mod claim;
mod config;
mod cost;
mod geometry;
mod model;
mod optimizer;
mod records;
mod types;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::{AppConfig, OptimizerConfig, RunConfig};
use cost::RunResult;
use optimizer::PackingConfig;
use records::{LoadError, WriteError};

/// Fatal errors of a batch run.
#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("packing task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_file = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = env_file {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();

    match std::env::args().nth(1).as_deref() {
        Some("serve") => {
            info!("Packing service starting...");
            if let Err(err) = api::start_api_server(app_config.api, app_config.optimizer).await {
                error!("API server failed: {}", err);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        None => match run_batch(app_config.run, app_config.optimizer).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("{}", err);
                ExitCode::FAILURE
            }
        },
        Some(other) => {
            error!("Unknown command '{}'. Usage: uld-packer [serve]", other);
            ExitCode::FAILURE
        }
    }
}

/// Runs the batch pipeline on a blocking worker and prints the report.
async fn run_batch(run: RunConfig, optimizer_config: OptimizerConfig) -> Result<(), RunError> {
    let config = optimizer_config.packing_config();
    let (result, elapsed) =
        tokio::task::spawn_blocking(move || pack_files(&run, config)).await??;

    print_report(&result, elapsed.as_millis());
    Ok(())
}

/// Loads the input files, packs them and writes the placement file.
///
/// The returned duration covers the whole run, loading and writing included.
fn pack_files(run: &RunConfig, config: PackingConfig) -> Result<(RunResult, Duration), RunError> {
    let started = Instant::now();
    let ulds = records::load_ulds(run.uld_file())?;
    let packages = records::load_packages(run.package_file())?;
    info!(
        ulds = ulds.len(),
        packages = packages.len(),
        "input loaded"
    );

    let result = optimizer::pack_packages_with_config(ulds, packages, config);

    records::write_placements(run.output_file(), &result.placements)?;
    info!(
        path = %run.output_file().display(),
        placements = result.placements.len(),
        "placements written"
    );
    Ok((result, started.elapsed()))
}

fn print_report(result: &RunResult, elapsed_ms: u128) {
    println!("Total Cost: {}", result.total_cost);
    println!("Total Packed Packages: {}", result.total_claimed);
    println!("Priority ULD Count: {}", result.priority_uld_count);
    for load in &result.uld_loads {
        println!(
            "  {}: {} packages, weight {}/{}, volume {:.1}%{}",
            load.uld_id,
            load.placed,
            load.total_weight,
            load.weight_limit,
            load.utilization_percent(),
            if load.carries_priority { ", priority" } else { "" }
        );
    }
    if !result.is_complete() {
        println!(
            "Unclaimed Packages: {} (deferral cost {})",
            result.unclaimed_count(),
            result.deferral_cost()
        );
    }
    println!("Execution Time: {} ms", elapsed_ms);
}
