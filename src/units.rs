//! User preferences, as supplied by the settings store,
//! and distance presentation.
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Distance units
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

/// Which north the heading refers to
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompassReference {
    #[default]
    True,
    Magnetic,
}

/// User [Preferences]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub units: Units,
    pub compass: CompassReference,
}

const METERS_PER_FOOT: f64 = 0.3048;
const METERS_PER_MILE: f64 = 1609.344;

impl Units {
    /// Formats a distance (in meters) for display
    pub fn format_distance(&self, meters: f64) -> String {
        match self {
            Self::Metric => {
                if meters < 1000.0 {
                    format!("{:.0} m", meters)
                } else if meters < 10_000.0 {
                    format!("{:.1} km", meters / 1000.0)
                } else {
                    format!("{:.0} km", meters / 1000.0)
                }
            },
            Self::Imperial => {
                let miles = meters / METERS_PER_MILE;
                if miles < 0.1 {
                    format!("{:.0} ft", meters / METERS_PER_FOOT)
                } else if miles < 10.0 {
                    format!("{:.1} mi", miles)
                } else {
                    format!("{:.0} mi", miles)
                }
            },
        }
    }
}
