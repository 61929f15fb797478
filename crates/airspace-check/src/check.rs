//! End-to-end check of one track: fetch, normalize, filter, ground, detect.

use airspace_core::{detect, normalize_all, AirspaceFilter, Track, ViolationResult};
use airspace_openaip::{fetch_all_pages, AirspaceQuery, FetchError, FetchPolicy, PageSource};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CheckError;
use crate::terrain::{ElevationResolver, ResolverStats, TileSource, TileStore};

/// Per-run selection of airspaces.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Search radius around the track centre; 0 searches the track bounding box
    pub radius_m: f64,
    /// ICAO class codes sent to the API
    pub classes: Vec<i64>,
    pub filter: AirspaceFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub violations: ViolationResult,
    /// False when the fetch gave up before the last page
    pub fetch_complete: bool,
    pub pages_fetched: u32,
    pub records_fetched: usize,
    /// Airspaces left after filtering
    pub airspaces_checked: usize,
    pub ground: ResolverStats,
}

pub struct AirspaceCheck<P, S, St> {
    pages: P,
    policy: FetchPolicy,
    resolver: ElevationResolver<S, St>,
}

impl<P, S, St> AirspaceCheck<P, S, St>
where
    P: PageSource,
    S: TileSource,
    St: TileStore,
{
    pub fn new(pages: P, resolver: ElevationResolver<S, St>) -> Self {
        Self {
            pages,
            policy: FetchPolicy::default(),
            resolver,
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolver(&self) -> &ElevationResolver<S, St> {
        &self.resolver
    }

    pub async fn run(&self, track: &Track, options: &CheckOptions) -> Result<CheckReport, CheckError> {
        self.run_cancellable(track, options, &CancellationToken::new())
            .await
    }

    pub async fn run_cancellable(
        &self,
        track: &Track,
        options: &CheckOptions,
        cancel: &CancellationToken,
    ) -> Result<CheckReport, CheckError> {
        let query = AirspaceQuery::for_track(track, options.radius_m, options.classes.clone())
            .ok_or(CheckError::NoPosition)?;

        let outcome = fetch_all_pages(&self.pages, &query, &self.policy, cancel).await?;
        if outcome.pages_fetched == 0 && !outcome.complete {
            // an empty download must not read as "no penetration"
            return Err(CheckError::Download(FetchError::Exhausted { page: 1 }));
        }
        if !outcome.complete {
            warn!(
                "Airspace download incomplete: {} of {} pages",
                outcome.pages_fetched, outcome.total_pages
            );
        }

        let normalized = normalize_all(&outcome.records).map_err(CheckError::Normalize)?;
        let airspaces = options.filter.apply(normalized);
        info!(
            "{} of {} airspaces selected for checking",
            airspaces.len(),
            outcome.records.len()
        );

        let needs_ground = airspaces
            .iter()
            .any(|a| a.floor_is_ground_referenced || a.ceiling_is_ground_referenced);
        let (ground, ground_stats) = if needs_ground {
            let points: Vec<(f64, f64)> = track.fixes.iter().map(|f| (f.lat, f.lon)).collect();
            let resolution = self.resolver.resolve_batch_cancellable(&points, cancel).await;
            if resolution.stats.cancelled {
                return Err(CheckError::Cancelled);
            }
            (resolution.elevations, resolution.stats)
        } else {
            (vec![None; track.fixes.len()], ResolverStats::default())
        };

        let violations = detect(track, &airspaces, Some(ground.as_slice())).map_err(CheckError::Check)?;
        if violations.fallback_applied {
            info!("No airspace penetrated; reporting all {} candidates", violations.airspaces.len());
        } else {
            info!(
                "{} airspaces penetrated by {} fixes",
                violations.airspaces.len(),
                violations.inside_fixes.len()
            );
        }

        Ok(CheckReport {
            violations,
            fetch_complete: outcome.complete,
            pages_fetched: outcome.pages_fetched,
            records_fetched: outcome.records.len(),
            airspaces_checked: airspaces.len(),
            ground: ground_stats,
        })
    }
}
