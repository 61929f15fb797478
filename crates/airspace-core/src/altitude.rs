//! Altitude unit and reference datum handling for airspace limits.

use serde::Serialize;

use crate::error::AirspaceError;
use crate::models::RawAltitudeLimit;

pub const METRES_PER_FOOT: f64 = 0.3048;

/// Unit code carried by an altitude limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AltitudeUnit {
    Meter,
    Feet,
    FlightLevel,
}

impl AltitudeUnit {
    pub fn from_code(code: i64) -> Result<Self, AirspaceError> {
        match code {
            0 => Ok(Self::Meter),
            1 => Ok(Self::Feet),
            6 => Ok(Self::FlightLevel),
            other => Err(AirspaceError::InvalidUnit(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Meter => 0,
            Self::Feet => 1,
            Self::FlightLevel => 6,
        }
    }
}

/// Vertical reference of an altitude limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceDatum {
    /// Above ground
    Gnd,
    /// Above mean sea level
    Msl,
    /// Standard pressure
    Std,
}

impl ReferenceDatum {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Gnd),
            1 => Some(Self::Msl),
            2 => Some(Self::Std),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Gnd => 0,
            Self::Msl => 1,
            Self::Std => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gnd => "GND",
            Self::Msl => "MSL",
            Self::Std => "STD",
        }
    }
}

/// Rounds half toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Converts a limit to metres without rounding.
pub fn to_metres(limit: &RawAltitudeLimit) -> Result<f64, AirspaceError> {
    Ok(match AltitudeUnit::from_code(limit.unit)? {
        AltitudeUnit::Meter => limit.value,
        AltitudeUnit::Feet => limit.value * METRES_PER_FOOT,
        AltitudeUnit::FlightLevel => limit.value * 100.0 * METRES_PER_FOOT,
    })
}

/// Expresses a height in metres in the given unit.
pub fn from_metres(metres: f64, unit: AltitudeUnit) -> f64 {
    match unit {
        AltitudeUnit::Meter => metres,
        AltitudeUnit::Feet => metres / METRES_PER_FOOT,
        AltitudeUnit::FlightLevel => metres / (100.0 * METRES_PER_FOOT),
    }
}

/// Human-readable label such as `GND`, `1500ft MSL` or `FL 65`.
///
/// A zero ground-referenced limit is `GND` whatever its unit code.
pub fn label(limit: &RawAltitudeLimit) -> Result<String, AirspaceError> {
    if limit.reference_datum == ReferenceDatum::Gnd.code() && limit.value == 0.0 {
        return Ok("GND".to_string());
    }

    let rounded = round_half_up(limit.value) as i64;
    let suffix = match AltitudeUnit::from_code(limit.unit)? {
        AltitudeUnit::Meter => "m",
        AltitudeUnit::Feet => "ft",
        AltitudeUnit::FlightLevel => return Ok(format!("FL {}", rounded)),
    };
    let datum = ReferenceDatum::from_code(limit.reference_datum)
        .ok_or(AirspaceError::InvalidDatum(limit.reference_datum))?;

    Ok(format!("{}{} {}", rounded, suffix, datum.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(value: f64, unit: i64, reference_datum: i64) -> RawAltitudeLimit {
        RawAltitudeLimit {
            value,
            unit,
            reference_datum,
        }
    }

    #[test]
    fn converts_each_unit_to_metres() {
        assert_eq!(to_metres(&limit(500.0, 0, 1)).unwrap(), 500.0);
        assert!((to_metres(&limit(1000.0, 1, 1)).unwrap() - 304.8).abs() < 1e-9);
        assert!((to_metres(&limit(65.0, 6, 2)).unwrap() - 1981.2).abs() < 1e-9);
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let err = to_metres(&limit(100.0, 3, 1)).unwrap_err();
        assert!(matches!(err, AirspaceError::InvalidUnit(3)));
    }

    #[test]
    fn unit_round_trip_within_tolerance() {
        let units = [
            AltitudeUnit::Meter,
            AltitudeUnit::Feet,
            AltitudeUnit::FlightLevel,
        ];
        for value in [0.0, 1.0, 152.4, 999.9, 4500.0, -12.5] {
            for unit in units {
                let expressed = from_metres(value, unit);
                let back = to_metres(&limit(expressed, unit.code(), 1)).unwrap();
                assert!((back - value).abs() < 1e-9, "{unit:?} {value} -> {back}");
            }
        }
    }

    #[test]
    fn zero_ground_limit_is_gnd_for_every_unit() {
        for unit in [0, 1, 6] {
            assert_eq!(label(&limit(0.0, unit, 0)).unwrap(), "GND");
        }
    }

    #[test]
    fn labels_carry_unit_and_datum() {
        assert_eq!(label(&limit(1500.0, 1, 1)).unwrap(), "1500ft MSL");
        assert_eq!(label(&limit(300.0, 0, 0)).unwrap(), "300m GND");
        assert_eq!(label(&limit(2999.6, 1, 2)).unwrap(), "3000ft STD");
        assert_eq!(label(&limit(0.0, 1, 1)).unwrap(), "0ft MSL");
    }

    #[test]
    fn flight_level_label_has_no_datum_suffix() {
        assert_eq!(label(&limit(65.0, 6, 2)).unwrap(), "FL 65");
        // datum is not inspected for flight levels
        assert_eq!(label(&limit(95.0, 6, 9)).unwrap(), "FL 95");
    }

    #[test]
    fn unknown_datum_fails_label() {
        let err = label(&limit(1500.0, 1, 7)).unwrap_err();
        assert!(matches!(err, AirspaceError::InvalidDatum(7)));
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(1981.2), 1981.0);
    }
}
