//! Track penetration check against a set of airspaces.
//!
//! For each airspace the track line is first tested against the outline as a
//! whole; only airspaces it touches get the per-fix point-in-polygon and
//! altitude band test. Ground-referenced limits are lifted by the terrain
//! elevation under the fix being tested.

use geo::{Intersects, Point, Polygon};

use crate::error::DetectError;
use crate::models::{AirspaceHit, NormalizedAirspace, Track, ViolationResult};

fn touches_track(outline: &Polygon<f64>, track: &Track) -> bool {
    match track.line.0.as_slice() {
        [] => false,
        [only] => outline.intersects(&Point::from(*only)),
        _ => outline.intersects(&track.line),
    }
}

/// Effective (floor, ceiling) for one fix, given the ground elevation under it.
///
/// Missing ground counts as sea level.
pub fn effective_band(airspace: &NormalizedAirspace, ground_m: Option<f64>) -> (f64, f64) {
    let ground = ground_m.unwrap_or(0.0);
    let mut floor = airspace.floor_m;
    let mut ceiling = airspace.ceiling_m;
    if airspace.floor_is_ground_referenced {
        floor += ground;
    }
    if airspace.ceiling_is_ground_referenced {
        ceiling += ground;
    }
    (floor, ceiling)
}

/// Finds the airspaces the track penetrates and the fixes inside them.
///
/// `ground` must hold one entry per fix, in fix order; `None` entries mark
/// fixes whose terrain could not be resolved. When no fix violates anything
/// the result lists every candidate airspace and sets `fallback_applied`.
pub fn detect(
    track: &Track,
    airspaces: &[NormalizedAirspace],
    ground: Option<&[Option<f64>]>,
) -> Result<ViolationResult, DetectError> {
    if track.fixes.is_empty() {
        return Err(DetectError::InputValidation("track has no fixes".to_string()));
    }
    let ground = ground.ok_or_else(|| {
        DetectError::InputValidation("ground elevations are missing".to_string())
    })?;
    if ground.len() != track.fixes.len() {
        return Err(DetectError::InputValidation(format!(
            "{} ground elevations for {} fixes",
            ground.len(),
            track.fixes.len()
        )));
    }

    let mut result = ViolationResult {
        airspaces: Vec::new(),
        inside_fixes: Vec::new(),
        hits: Vec::new(),
        fallback_applied: false,
    };

    for airspace in airspaces {
        let outline = airspace.geometry.outline();
        if !touches_track(&outline, track) {
            continue;
        }

        let mut fix_indices = Vec::new();
        for (idx, fix) in track.fixes.iter().enumerate() {
            if !outline.intersects(&Point::new(fix.lon, fix.lat)) {
                continue;
            }
            let (floor, ceiling) = effective_band(airspace, ground[idx]);
            if fix.gps_altitude_m > floor && fix.gps_altitude_m < ceiling {
                fix_indices.push(idx);
            }
        }

        if !fix_indices.is_empty() {
            result.airspaces.push(airspace.clone());
            result.inside_fixes.extend_from_slice(&fix_indices);
            result.hits.push(AirspaceHit {
                airspace_id: airspace.id.clone(),
                fix_indices,
            });
        }
    }

    if result.inside_fixes.is_empty() {
        result.airspaces = airspaces.to_vec();
        result.fallback_applied = true;
    }

    Ok(result)
}
