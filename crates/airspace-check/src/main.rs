//! airspace-check - report the airspaces a recorded flight penetrated.
//!
//! Usage:
//!   airspace-check flight.json --radius 50000 --types 1,2,3 --floor 3000

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use airspace_check::terrain::{DiskTileStore, ElevationResolver, HttpTileSource, TileCache};
use airspace_check::{AirspaceCheck, CheckOptions, CheckReport, Config};
use airspace_core::{AirspaceFilter, Track};
use airspace_openaip::OpenAipClient;
use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Check a flight track against OpenAIP airspaces")]
struct Args {
    /// Track JSON file: {"fixes": [{"timestamp_ms", "lat", "lon", "gps_altitude_m"}, ...]}
    track: PathBuf,

    /// Search radius in metres around the track centre; 0 uses the track bounding box
    #[arg(long, default_value_t = 0.0)]
    radius: f64,

    /// ICAO class codes to request (0=A .. 6=G, 8=special use)
    #[arg(long, value_delimiter = ',', default_value = "0,1,2,3,4,8")]
    classes: Vec<i64>,

    /// Selectable special-use type codes to keep
    #[arg(long, value_delimiter = ',', default_value = "1,2,3")]
    types: Vec<String>,

    /// Ignore airspaces whose floor is at or above this height (metres)
    #[arg(long)]
    floor: Option<f64>,

    /// Keep every class and type, applying only the floor limit
    #[arg(long)]
    no_type_filter: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("airspace_check=info".parse()?))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let raw = tokio::fs::read_to_string(&args.track)
        .await
        .with_context(|| format!("reading {}", args.track.display()))?;
    let track: Track = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.track.display()))?;
    tracing::info!("Loaded track with {} fixes", track.fixes.len());

    let client = OpenAipClient::new(
        &config.openaip_url,
        config.openaip_api_key.clone(),
        Duration::from_secs(config.openaip_request_timeout_s),
    )?;
    let source = HttpTileSource::new(
        &config.terrain_tile_url,
        Duration::from_secs(config.terrain_request_timeout_s),
    )?;
    let cache = Arc::new(TileCache::new(source, DiskTileStore::new(&config.terrain_cache_dir)));
    let resolver = ElevationResolver::new(cache.clone(), config.terrain_zoom, config.terrain_batch_size);
    let check = AirspaceCheck::new(client, resolver);

    let mut filter = AirspaceFilter::new(args.types.clone(), args.floor.unwrap_or(f64::INFINITY));
    if args.no_type_filter {
        filter = filter.without_type_filter();
    }
    let options = CheckOptions {
        radius_m: args.radius,
        classes: args.classes.clone(),
        filter,
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping check");
            on_signal.cancel();
        }
    });

    let result = check.run_cancellable(&track, &options, &cancel).await;

    let drained = cache.drain_writes().await;
    tracing::debug!("Flushed {} tile writes", drained);

    let report = result?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &CheckReport) {
    let violations = &report.violations;
    if !report.fetch_complete {
        println!(
            "warning: airspace download stopped after {} pages, results may be incomplete",
            report.pages_fetched
        );
    }
    if report.ground.unresolved > 0 {
        println!(
            "warning: no ground elevation for {} of {} fixes",
            report.ground.unresolved, report.ground.points
        );
    }

    if !violations.has_violations() {
        println!(
            "No airspace penetrated ({} airspaces checked)",
            report.airspaces_checked
        );
        return;
    }

    println!(
        "{} airspaces penetrated, {} fixes inside:",
        violations.airspaces.len(),
        violations.inside_fixes.len()
    );
    for (airspace, hit) in violations.airspaces.iter().zip(&violations.hits) {
        println!(
            "  {} [{} {}] {} - {}: {} fixes (first #{})",
            airspace.name,
            airspace.icao_class.as_str(),
            airspace.type_name(),
            airspace.floor_label,
            airspace.ceiling_label,
            hit.fix_indices.len(),
            hit.fix_indices.first().copied().unwrap_or_default()
        );
    }
}
