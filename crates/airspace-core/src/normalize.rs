//! Conversion of raw API airspace records into [`NormalizedAirspace`].

use crate::altitude::{self, round_half_up, ReferenceDatum};
use crate::classify::{display_color, AirspaceType, IcaoClass};
use crate::error::AirspaceError;
use crate::models::{AirspaceGeometry, NormalizedAirspace, RawAirspaceRecord, RawGeometry};

const COORD_DIGITS: i32 = 6;

/// Rounds a coordinate to 6 decimal digits (about 11 cm).
pub fn round_coord(value: f64) -> f64 {
    let multiplier = 10f64.powi(COORD_DIGITS);
    round_half_up(value * multiplier) / multiplier
}

fn round_ring(ring: &[[f64; 2]]) -> Vec<[f64; 2]> {
    ring.iter()
        .map(|[lon, lat]| [round_coord(*lon), round_coord(*lat)])
        .collect()
}

fn normalize_geometry(geometry: &RawGeometry) -> Result<AirspaceGeometry, AirspaceError> {
    if geometry.kind != "Polygon" {
        return Err(AirspaceError::InvalidGeometry(format!(
            "unsupported geometry type {}",
            geometry.kind
        )));
    }
    let (first, rest) = geometry
        .coordinates
        .split_first()
        .ok_or_else(|| AirspaceError::InvalidGeometry("polygon has no ring".to_string()))?;

    let exterior = round_ring(first);
    if rest.is_empty() {
        Ok(AirspaceGeometry::SimplePolygon { exterior })
    } else {
        Ok(AirspaceGeometry::PolygonWithHoles {
            exterior,
            holes: rest.iter().map(|ring| round_ring(ring)).collect(),
        })
    }
}

/// Normalizes a single record.
pub fn normalize(record: &RawAirspaceRecord) -> Result<NormalizedAirspace, AirspaceError> {
    let floor_m = round_half_up(altitude::to_metres(&record.lower_limit)?);
    let ceiling_m = round_half_up(altitude::to_metres(&record.upper_limit)?);
    let floor_label = altitude::label(&record.lower_limit)?;
    let ceiling_label = altitude::label(&record.upper_limit)?;

    let floor_reference = ReferenceDatum::from_code(record.lower_limit.reference_datum);
    let ceiling_reference = ReferenceDatum::from_code(record.upper_limit.reference_datum);

    // AGL correction only applies when both limits are ground referenced.
    let ground_referenced = floor_reference == Some(ReferenceDatum::Gnd)
        && ceiling_reference == Some(ReferenceDatum::Gnd);

    let icao_class = IcaoClass::from_code(record.icao_class);
    let airspace_type = AirspaceType::from_code(record.type_code);

    Ok(NormalizedAirspace {
        id: record.id.clone(),
        name: record.name.clone(),
        country: record.country.clone(),
        type_code: record.type_code,
        airspace_type,
        icao_class,
        activity: record.activity,
        floor_m,
        ceiling_m,
        floor_label,
        ceiling_label,
        floor_reference,
        ceiling_reference,
        floor_is_ground_referenced: ground_referenced,
        ceiling_is_ground_referenced: ground_referenced,
        color: display_color(icao_class, airspace_type).to_string(),
        geometry: normalize_geometry(&record.geometry)?,
    })
}

/// Normalizes a batch; the first malformed record aborts the whole batch.
pub fn normalize_all(records: &[RawAirspaceRecord]) -> Result<Vec<NormalizedAirspace>, AirspaceError> {
    records.iter().map(normalize).collect()
}
