#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{self, OptionExt, WrapErr};
use config::Config;
use itertools::Itertools;
use roidnav::{
    routing::{self, BodySummary, RouteRequest},
    time::AdaliaDay,
};
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod ingest;

#[derive(Parser)]
#[command(name = "roidnav")]
#[command(about = "Asteroid positions and stepping-stone routes")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines body catalog (overrides the config file)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Adalia day to compute positions for
    #[arg(long, conflicts_with = "at")]
    day: Option<f64>,

    /// Wall-clock time (RFC 3339) to compute positions for
    #[arg(long)]
    at: Option<String>,

    /// Longest single hop (overrides the config file)
    #[arg(long)]
    radius: Option<f64>,

    #[arg(long, value_enum, default_value_t = Format::Ron)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find a route from one body to another
    Route {
        start: i64,
        #[arg(required = true)]
        targets: Vec<i64>,
        #[arg(long, default_value = "distance")]
        heuristic: String,
    },
    /// Show where bodies are
    Position {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Ron,
    Json,
}

impl Format {
    fn render<T: Serialize>(self, value: &T) -> eyre::Result<String> {
        Ok(match self {
            Format::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())?,
            Format::Json => serde_json::to_string_pretty(value)?,
        })
    }
}

impl Cli {
    fn day(&self, config: &Config) -> eyre::Result<AdaliaDay> {
        if let Some(day) = self.day {
            return Ok(AdaliaDay::new(day));
        }
        if let Some(at) = &self.at {
            let at = OffsetDateTime::parse(at, &Rfc3339)
                .wrap_err_with(|| format!("invalid timestamp {at:?}"))?;
            debug!(calendar = %AdaliaDay::display_at(at), "resolved timestamp");
            return Ok(AdaliaDay::at(at));
        }
        Ok(config.day.map_or_else(AdaliaDay::now, AdaliaDay::new))
    }
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(catalog) = &cli.catalog {
        config.catalog = Some(catalog.clone());
    }
    if let Some(radius) = cli.radius {
        config.route.radius = radius;
    }
    config.route.validate()?;

    let catalog_path = config
        .catalog
        .as_deref()
        .ok_or_eyre("no catalog given (use --catalog or set `catalog` in the config file)")?;
    let catalog = ingest::load_catalog(catalog_path)?;
    let day = cli.day(&config)?;

    match &cli.command {
        Command::Route {
            start,
            targets,
            heuristic,
        } => {
            let request = RouteRequest {
                start: vec![*start],
                targets: targets.clone(),
                heuristic: heuristic.clone(),
            };
            let route = routing::plan_route(&catalog, &request, day, &config.route)?;
            if route.is_found() {
                info!(
                    path = %route.path.iter().join(" --> "),
                    expanded = route.expanded,
                    "found route"
                );
            } else {
                warn!(
                    start = %route.start_name,
                    target = %route.target_name,
                    "no route within radius {}",
                    config.route.radius
                );
            }
            println!("{}", cli.format.render(&route)?);
        }
        Command::Position { ids } => {
            let summaries = ids
                .iter()
                .map(|&id| -> eyre::Result<_> {
                    let body = catalog.lookup(id)?;
                    Ok(BodySummary::new(body, day, config.route.scale)?)
                })
                .collect::<eyre::Result<Vec<_>>>()?;
            println!("{}", cli.format.render(&summaries)?);
        }
    }
    Ok(())
}
