//! Rain - Weather forecasts for the command line
//!
//! Resolves the current location, fetches a forecast for it and prints the
//! requested sections together with any active weather alert.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use rain::cli::{Cli, Mode};
use rain::forecast::{requested_sections, ForecastClient};
use rain::location::LocationResolver;
use rain::present::Report;
use rain::settings::{SettingsStore, COORDINATES};

/// Sets up logging to stderr. `RUST_LOG` overrides the default filter.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "rain=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Resolves the location, fetches the forecast and renders it for `mode`
async fn run(cli: &Cli, mode: &Mode) -> Result<String, Box<dyn std::error::Error>> {
    let store = match &cli.config {
        Some(path) => SettingsStore::with_path(path),
        None => SettingsStore::new().ok_or("could not determine the configuration directory")?,
    };

    if cli.relocate && store.exists() {
        store.clear(COORDINATES)?;
        tracing::info!("cleared cached coordinates");
    }

    let mut resolver = LocationResolver::new(&store);
    if let Some(address) = &cli.address {
        resolver = resolver.with_address(address.as_str());
    }
    let coordinates = resolver.resolve().await?;

    let units = store.units()?;
    let sections = requested_sections(mode.sections(), units);
    let forecast = ForecastClient::new(&store)
        .fetch(coordinates, &sections)
        .await?;
    if let Some(error) = forecast.provider_error() {
        eprintln!("Error: {error}");
    }

    let report = Report::new(forecast.display_units(units));
    Ok(report.render(mode, &forecast)?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Without a mode there is nothing to fetch
    let Some(mode) = Mode::from_cli(&cli) else {
        if let Err(err) = Cli::command().print_help() {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    match run(&cli, &mode).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
