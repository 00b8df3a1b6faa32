mod commands;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{disambiguate, lookup, resolve, DisambiguateParams, ResolveParams};
use geotriage::config::Config;

#[derive(Parser)]
#[command(
    name = "geotriage",
    version,
    about = "Country-consistent geocoding for locations extracted from news events",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (defaults to PHOTON_SERVER / GEONAMES_SERVER environment)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode the events of NLP output documents
    Resolve {
        /// File or folder where to read the documents
        #[arg(short, long)]
        data: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "output.json")]
        output: PathBuf,

        /// Delete events whose location could not be geocoded
        #[arg(short, long, default_value_t = false, action = ArgAction::Set)]
        strict: bool,

        /// Reconcile countries across each document's locations
        #[arg(short = 'k', long, default_value_t = true, action = ArgAction::Set)]
        double_check: bool,

        /// Keep every geocoder candidate, not only the best match
        #[arg(long)]
        all_candidates: bool,

        /// Maximum number of reference countries to consider
        #[arg(long)]
        top_countries: Option<usize>,
    },

    /// Geocode a single place name
    Lookup {
        /// Place name
        name: String,

        /// Restrict results to this country
        #[arg(long)]
        country: Option<String>,

        /// Return every validated hit instead of the best one
        #[arg(long)]
        all: bool,

        /// List the countries within this many meters of each hit
        #[arg(long, value_name = "METERS")]
        around: Option<f64>,
    },

    /// Disambiguate an already geocoded batch
    Disambiguate {
        /// JSON file with `locations` and `ner_tags`
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of reference countries to consider
        #[arg(long)]
        top_countries: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("geotriage starting");

    match cli.command {
        Commands::Resolve {
            data,
            output,
            strict,
            double_check,
            all_candidates,
            top_countries,
        } => {
            tracing::info!(
                data = %data.display(),
                output = %output.display(),
                strict = %strict,
                double_check = %double_check,
                "Starting resolve command"
            );
            resolve(
                &config,
                ResolveParams {
                    data,
                    output,
                    strict,
                    double_check,
                    all_candidates,
                    top_countries,
                },
            )
            .await?;
        }

        Commands::Lookup {
            name,
            country,
            all,
            around,
        } => {
            tracing::info!(name = %name, country = ?country, all = %all, "Starting lookup command");
            lookup(&config, name, country, all, around).await?;
        }

        Commands::Disambiguate {
            input,
            output,
            top_countries,
        } => {
            tracing::info!(input = %input.display(), "Starting disambiguate command");
            disambiguate(
                &config,
                DisambiguateParams {
                    input,
                    output,
                    top_countries,
                },
            )
            .await?;
        }
    }

    tracing::info!("geotriage completed successfully");
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("geotriage=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("geotriage={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
