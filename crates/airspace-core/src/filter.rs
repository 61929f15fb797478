//! Selection of the airspaces that take part in a violation check.

use std::collections::HashSet;

use crate::classify::IcaoClass;
use crate::models::NormalizedAirspace;

/// Class/type decision for one airspace.
///
/// `allowed_types` holds numeric type codes as strings (`"1"`, `"21"`), the
/// form a caller's type selection arrives in.
pub fn should_keep(airspace: &NormalizedAirspace, allowed_types: &HashSet<String>) -> bool {
    match airspace.icao_class {
        IcaoClass::A | IcaoClass::B | IcaoClass::C | IcaoClass::D | IcaoClass::E => true,
        IcaoClass::Sua => match airspace.type_code {
            // Other, Restricted, Danger, Prohibited, CTR, TMZ, RMZ, TMA, GlidingSector
            0..=7 | 21 => allowed_types.contains(&airspace.type_code.to_string()),
            // FIR, UIR, RecreationalActivity, FISSector
            10 | 11 | 28 | 33 => false,
            // ProtectedArea, CTA, LowAltitudeOverflightRestriction
            19 | 26 | 29 => true,
            _ => true,
        },
        IcaoClass::F | IcaoClass::G | IcaoClass::Unknown => false,
    }
}

/// Floor threshold combined with the class/type selection.
#[derive(Debug, Clone)]
pub struct AirspaceFilter {
    pub allowed_types: HashSet<String>,
    /// Airspaces whose floor is at or above this height (metres) are dropped
    pub floor_limit_m: f64,
    /// When false only the floor threshold applies
    pub type_filter_enabled: bool,
}

impl Default for AirspaceFilter {
    fn default() -> Self {
        Self {
            allowed_types: HashSet::new(),
            floor_limit_m: f64::INFINITY,
            type_filter_enabled: true,
        }
    }
}

impl AirspaceFilter {
    pub fn new(allowed_types: impl IntoIterator<Item = impl Into<String>>, floor_limit_m: f64) -> Self {
        Self {
            allowed_types: allowed_types.into_iter().map(Into::into).collect(),
            floor_limit_m,
            type_filter_enabled: true,
        }
    }

    pub fn without_type_filter(mut self) -> Self {
        self.type_filter_enabled = false;
        self
    }

    pub fn keep(&self, airspace: &NormalizedAirspace) -> bool {
        let below_limit = airspace.floor_m < self.floor_limit_m;
        let selected = !self.type_filter_enabled || should_keep(airspace, &self.allowed_types);
        below_limit && selected
    }

    pub fn apply(&self, airspaces: Vec<NormalizedAirspace>) -> Vec<NormalizedAirspace> {
        airspaces.into_iter().filter(|a| self.keep(a)).collect()
    }
}
