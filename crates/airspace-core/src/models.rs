//! Core data models: track fixes, raw and normalized airspace records,
//! violation results.

use chrono::{DateTime, Duration, Utc};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::altitude::ReferenceDatum;
use crate::classify::{AirspaceType, IcaoClass};

// ========== TRACK ==========

/// One GPS sample of a recorded flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Epoch milliseconds
    pub timestamp_ms: i64,
    pub lat: f64,
    pub lon: f64,
    /// GPS altitude in metres, treated as MSL
    #[serde(alias = "gpsAltitude")]
    pub gps_altitude_m: f64,
}

impl Fix {
    pub fn new(timestamp_ms: i64, lat: f64, lon: f64, gps_altitude_m: f64) -> Self {
        Self {
            timestamp_ms,
            lat,
            lon,
            gps_altitude_m,
        }
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// A recorded flight: ordered fixes plus the same points as a line geometry.
///
/// Fixes are expected in non-decreasing timestamp order. The order is taken
/// as given; nothing here re-sorts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TrackData")]
pub struct Track {
    pub fixes: Vec<Fix>,
    #[serde(skip)]
    pub line: LineString<f64>,
    pub site: Option<String>,
}

#[derive(Deserialize)]
struct TrackData {
    fixes: Vec<Fix>,
    #[serde(default)]
    site: Option<String>,
}

impl From<TrackData> for Track {
    fn from(data: TrackData) -> Self {
        let mut track = Track::new(data.fixes);
        track.site = data.site;
        track
    }
}

impl Track {
    pub fn new(fixes: Vec<Fix>) -> Self {
        let line = fixes
            .iter()
            .map(|fix| Coord {
                x: fix.lon,
                y: fix.lat,
            })
            .collect::<LineString<f64>>();
        Self {
            fixes,
            line,
            site: None,
        }
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Time between the first and the last fix.
    pub fn duration(&self) -> Option<Duration> {
        let first = self.fixes.first()?.time()?;
        let last = self.fixes.last()?.time()?;
        Some(last - first)
    }

    /// Bounding box over all finite fix positions.
    pub fn bbox(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        for fix in &self.fixes {
            if !fix.lat.is_finite() || !fix.lon.is_finite() {
                continue;
            }
            bbox = Some(match bbox {
                None => BoundingBox {
                    min_lon: fix.lon,
                    min_lat: fix.lat,
                    max_lon: fix.lon,
                    max_lat: fix.lat,
                },
                Some(b) => BoundingBox {
                    min_lon: b.min_lon.min(fix.lon),
                    min_lat: b.min_lat.min(fix.lat),
                    max_lon: b.max_lon.max(fix.lon),
                    max_lat: b.max_lat.max(fix.lat),
                },
            });
        }
        bbox
    }

    /// Centre of the bounding box as (lat, lon).
    pub fn center(&self) -> Option<(f64, f64)> {
        self.bbox().map(|bbox| bbox.center())
    }
}

/// Axis-aligned box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// (lat, lon) of the box centre.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

// ========== RAW AIRSPACE (API WIRE FORMAT) ==========

/// Altitude limit as received: numeric value plus integer unit and datum codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAltitudeLimit {
    pub value: f64,
    pub unit: i64,
    pub reference_datum: i64,
}

/// GeoJSON-style polygon geometry, `[lon, lat]` coordinate order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

/// Airspace record as returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAirspaceRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "type")]
    pub type_code: i64,
    pub icao_class: i64,
    #[serde(default)]
    pub activity: Option<i64>,
    pub lower_limit: RawAltitudeLimit,
    pub upper_limit: RawAltitudeLimit,
    pub geometry: RawGeometry,
}

// ========== NORMALIZED AIRSPACE ==========

/// Airspace outline, `[lon, lat]` vertices rounded to 6 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AirspaceGeometry {
    SimplePolygon {
        exterior: Vec<[f64; 2]>,
    },
    PolygonWithHoles {
        exterior: Vec<[f64; 2]>,
        holes: Vec<Vec<[f64; 2]>>,
    },
}

impl AirspaceGeometry {
    pub fn exterior(&self) -> &[[f64; 2]] {
        match self {
            Self::SimplePolygon { exterior } => exterior,
            Self::PolygonWithHoles { exterior, .. } => exterior,
        }
    }

    /// Exterior ring as a `geo` polygon. Holes are not part of the check.
    pub fn outline(&self) -> Polygon<f64> {
        let ring = self
            .exterior()
            .iter()
            .map(|[lon, lat]| Coord { x: *lon, y: *lat })
            .collect::<LineString<f64>>();
        Polygon::new(ring, vec![])
    }
}

/// Airspace in canonical form: limits in metres, decoded class and type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAirspace {
    pub id: String,
    pub name: String,
    pub country: String,
    /// Numeric type code as received, used by the filter
    pub type_code: i64,
    /// Decoded type; `None` for codes outside the table
    pub airspace_type: Option<AirspaceType>,
    pub icao_class: IcaoClass,
    pub activity: Option<i64>,
    pub floor_m: f64,
    pub ceiling_m: f64,
    pub floor_label: String,
    pub ceiling_label: String,
    pub floor_reference: Option<ReferenceDatum>,
    pub ceiling_reference: Option<ReferenceDatum>,
    pub floor_is_ground_referenced: bool,
    pub ceiling_is_ground_referenced: bool,
    pub color: String,
    pub geometry: AirspaceGeometry,
}

impl NormalizedAirspace {
    /// Type name, empty for unknown codes.
    pub fn type_name(&self) -> &'static str {
        self.airspace_type.map(AirspaceType::name).unwrap_or("")
    }
}

// ========== VIOLATIONS ==========

/// Fixes found inside one airspace's effective altitude band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirspaceHit {
    pub airspace_id: String,
    pub fix_indices: Vec<usize>,
}

/// Outcome of one violation check.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationResult {
    /// Penetrated airspaces, or every candidate when nothing was penetrated
    pub airspaces: Vec<NormalizedAirspace>,
    /// Violating fix indices across all airspaces, not deduplicated
    pub inside_fixes: Vec<usize>,
    pub hits: Vec<AirspaceHit>,
    /// True when `airspaces` holds the full candidate set because no fix violated
    pub fallback_applied: bool,
}

impl ViolationResult {
    pub fn has_violations(&self) -> bool {
        !self.inside_fixes.is_empty()
    }
}
