use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use weather_lookup::{WeatherLookupConfig, WeatherLookupError, WeatherLookupService, logging};

/// City weather from the Open-Meteo APIs (no API key required)
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a city to coordinates
    Locate(Query),
    /// Current conditions for a city
    Current(Query),
    /// Daily forecast for a city
    Forecast {
        #[command(flatten)]
        query: Query,
        /// Number of days (1-7); defaults to the configured value
        #[arg(short, long)]
        days: Option<u32>,
    },
}

#[derive(Debug, clap::Args)]
struct Query {
    /// City name, e.g. "Tokyo"
    city: String,
    /// Country name or ISO code to disambiguate
    #[arg(short, long, default_value = "")]
    country: String,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn print<T: Serialize + std::fmt::Display>(value: &T, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = WeatherLookupConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    tracing::debug!(?config, "Using configuration");

    let service = WeatherLookupService::new(&config)?;

    match cli.command {
        Command::Locate(q) => print(&service.resolve_location(&q.city, &q.country).await?, q.json),
        Command::Current(q) => print(&service.get_current_weather(&q.city, &q.country).await?, q.json),
        Command::Forecast { query: q, days } => {
            let days = days.unwrap_or(service.default_days());
            print(
                &service.get_weather_forecast(&q.city, &q.country, days).await?,
                q.json,
            )
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<WeatherLookupError>() {
                Some(lookup) if !matches!(lookup, WeatherLookupError::Config { .. }) => {
                    tracing::debug!("{lookup}");
                    eprintln!("{}", lookup.user_message());
                }
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
