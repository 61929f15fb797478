//! ICAO class and airspace type decoding, display colours.

use serde::Serialize;

/// ICAO airspace class, or special-use airspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IcaoClass {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    #[serde(rename = "SUA")]
    Sua,
    #[serde(rename = "")]
    Unknown,
}

impl IcaoClass {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::A,
            1 => Self::B,
            2 => Self::C,
            3 => Self::D,
            4 => Self::E,
            5 => Self::F,
            6 => Self::G,
            8 => Self::Sua,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::F => "F",
            Self::G => "G",
            Self::Sua => "SUA",
            Self::Unknown => "",
        }
    }
}

macro_rules! airspace_types {
    ($($code:literal => $variant:ident),+ $(,)?) => {
        /// Airspace type from the fixed upstream code table.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum AirspaceType {
            $($variant),+
        }

        impl AirspaceType {
            pub const ALL: &'static [AirspaceType] = &[$(AirspaceType::$variant),+];

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn code(self) -> i64 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

airspace_types! {
    0 => Other,
    1 => Restricted,
    2 => Danger,
    3 => Prohibited,
    4 => CTR,
    5 => TMZ,
    6 => RMZ,
    7 => TMA,
    8 => TRA,
    9 => TSA,
    10 => FIR,
    11 => UIR,
    12 => ADIZ,
    13 => ATZ,
    14 => MATZ,
    15 => Airway,
    16 => MTR,
    17 => AlertArea,
    18 => WarningArea,
    19 => ProtectedArea,
    20 => HTZ,
    21 => GlidingSector,
    22 => TRP,
    23 => TIZ,
    24 => TIA,
    25 => MTA,
    26 => CTA,
    27 => ACC,
    28 => RecreationalActivity,
    29 => LowAltitudeOverflightRestriction,
    30 => MRT,
    31 => TFR,
    32 => VFRSector,
    33 => FISSector,
}

pub const COLOR_PROHIBITED: &str = "#bf4040";
pub const COLOR_RESTRICTED: &str = "#bfbf40";
pub const COLOR_DANGER: &str = "#bf8040";
pub const COLOR_OTHER: &str = "#808080";

/// Display colour: class decides first, then type, then grey.
pub fn display_color(class: IcaoClass, airspace_type: Option<AirspaceType>) -> &'static str {
    use AirspaceType::*;

    match class {
        IcaoClass::A | IcaoClass::B | IcaoClass::C | IcaoClass::D => return COLOR_PROHIBITED,
        IcaoClass::E | IcaoClass::F | IcaoClass::G => return COLOR_RESTRICTED,
        IcaoClass::Sua | IcaoClass::Unknown => {}
    }

    match airspace_type {
        Some(CTR | TMA | ATZ | CTA | Prohibited) => COLOR_PROHIBITED,
        Some(RMZ | TMZ | GlidingSector | Restricted | LowAltitudeOverflightRestriction) => {
            COLOR_RESTRICTED
        }
        Some(Danger) => COLOR_DANGER,
        _ => COLOR_OTHER,
    }
}
