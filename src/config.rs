//! Engine configuration.
//!
//! Every field has a default, so a configuration file only needs
//! to describe what differs:
//!
//! ```json
//! {
//!     "logger": { "directory": "/var/lib/tournav" },
//!     "route": { "min_distance": 5.0, "cooldown_ms": 8000 }
//! }
//! ```
use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{convert::GpxOptions, units::Preferences, Error};

/// Sample acceptance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Displacement (meters) above which a sample is always accepted
    pub min_distance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_distance: crate::filter::DEFAULT_MIN_DISTANCE,
        }
    }
}

/// Track logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Directory where session logs are created
    pub directory: PathBuf,
    /// Bookmark file name, inside [Self::directory]
    pub bookmark_file: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            bookmark_file: "bookmarks.csv".to_string(),
        }
    }
}

impl LoggerConfig {
    /// Complete path to the bookmark file
    pub fn bookmark_path(&self) -> PathBuf {
        self.directory.join(&self.bookmark_file)
    }
}

/// External query throttling: how far inputs must move,
/// and how long to wait, between two queries.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Source displacement (meters) that justifies a new query
    pub min_distance: f64,
    /// Minimal interval between two queries, in milliseconds
    pub cooldown_ms: u64,
}

impl ThrottleConfig {
    /// Route queries: 5 m, 5 s
    pub const ROUTE: Self = Self {
        min_distance: 5.0,
        cooldown_ms: 5_000,
    };
    /// Reverse geocoding: 10 m, 10 s
    pub const ADDRESS: Self = Self {
        min_distance: 10.0,
        cooldown_ms: 10_000,
    };
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Following viewport configuration
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Movement (meters) of user or target that triggers a reframe
    pub min_move: f64,
    /// Margin added around the framed region, as a fraction of its span
    pub padding: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_move: 5.0,
            padding: 0.2,
        }
    }
}

/// Complete engine [Config]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filter: FilterConfig,
    pub logger: LoggerConfig,
    pub route: ThrottleConfig,
    pub address: ThrottleConfig,
    pub viewport: ViewportConfig,
    pub gpx: GpxOptions,
    pub preferences: Preferences,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            logger: LoggerConfig::default(),
            route: ThrottleConfig::ROUTE,
            address: ThrottleConfig::ADDRESS,
            viewport: ViewportConfig::default(),
            gpx: GpxOptions::default(),
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Parses a [Config] from JSON content
    pub fn from_json(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }
    /// Loads a [Config] from a JSON file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::units::{CompassReference, Units};
    #[test]
    fn defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.route.cooldown(), Duration::from_secs(5));
        assert_eq!(cfg.address.cooldown(), Duration::from_secs(10));
        assert_eq!(cfg.route.min_distance, 5.0);
        assert_eq!(cfg.address.min_distance, 10.0);
        assert_eq!(cfg.filter.min_distance, 5.0);
        assert_eq!(cfg.gpx.indent, 2);
        assert_eq!(cfg.gpx.line_separator, "\n");
    }
    #[test]
    fn partial_description() {
        let cfg = Config::from_json(
            r#"{
                "logger": { "directory": "/tmp/logs" },
                "route": { "min_distance": 20.0, "cooldown_ms": 8000 },
                "preferences": { "units": "imperial", "compass": "magnetic" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.logger.directory, PathBuf::from("/tmp/logs"));
        assert_eq!(cfg.logger.bookmark_path(), PathBuf::from("/tmp/logs/bookmarks.csv"));
        assert_eq!(cfg.route.cooldown(), Duration::from_secs(8));
        assert_eq!(cfg.address, ThrottleConfig::ADDRESS);
        assert_eq!(cfg.preferences.units, Units::Imperial);
        assert_eq!(cfg.preferences.compass, CompassReference::Magnetic);
    }
    #[test]
    fn invalid_description() {
        assert!(matches!(
            Config::from_json("{ \"route\": 12 }"),
            Err(Error::JsonCoding(_))
        ));
    }
}
