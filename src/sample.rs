//! Position fixes, as delivered by a positioning source,
//! and their validated [PositionSample] representation.
use chrono::{DateTime, FixedOffset};
use geo::{Bearing, Distance, Haversine, Point};

use serde::{Deserialize, Serialize};

/// Geodetic coordinates in decimal degrees
#[derive(Default, Copy, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<(f64, f64)> for Coordinates {
    fn from(latlon: (f64, f64)) -> Self {
        Self::new(latlon.0, latlon.1)
    }
}

impl From<Coordinates> for Point<f64> {
    fn from(c: Coordinates) -> Self {
        Point::new(c.longitude, c.latitude)
    }
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
    /// Great circle distance to other point, in meters
    pub fn distance(&self, rhs: &Self) -> f64 {
        Haversine::distance(Point::from(*self), Point::from(*rhs))
    }
    /// Initial bearing towards other point, in degrees
    /// clockwise from true north, within [0, 360)
    pub fn bearing(&self, rhs: &Self) -> f64 {
        Haversine::bearing(Point::from(*self), Point::from(*rhs)).rem_euclid(360.0)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({:.6}°, {:.6}°)", self.latitude, self.longitude)
    }
}

/// [RawFix] is one unprocessed position fix. Negative accuracies
/// (or values) are the source's way of saying "no data".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawFix {
    pub latitude: f64,
    pub longitude: f64,
    pub horizontal_accuracy: f64,
    pub altitude: f64,
    pub vertical_accuracy: f64,
    /// Speed in m/s
    pub speed: f64,
    pub speed_accuracy: f64,
    /// Course in degrees, clockwise from true north
    pub course: f64,
    pub course_accuracy: f64,
    pub time: DateTime<FixedOffset>,
}

/// [PositionSample] is a [RawFix] where every measurement
/// was validated: invalid measurements are None, which is not zero.
/// Accuracies are kept verbatim, for diagnostic purposes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionSample {
    /// Valid when horizontal accuracy >= 0
    pub coordinates: Option<Coordinates>,
    pub horizontal_accuracy: f64,
    /// Valid when vertical accuracy > 0
    pub altitude: Option<f64>,
    pub vertical_accuracy: f64,
    /// Valid when speed >= 0 and speed accuracy >= 0
    pub speed: Option<f64>,
    pub speed_accuracy: f64,
    /// Valid when course >= 0 and course accuracy >= 0
    pub course: Option<f64>,
    pub course_accuracy: f64,
    pub time: DateTime<FixedOffset>,
}

impl From<RawFix> for PositionSample {
    fn from(fix: RawFix) -> Self {
        let coordinates = if fix.horizontal_accuracy >= 0.0 {
            Some(Coordinates::new(fix.latitude, fix.longitude))
        } else {
            None
        };
        let altitude = if fix.vertical_accuracy > 0.0 {
            Some(fix.altitude)
        } else {
            None
        };
        let speed = if fix.speed >= 0.0 && fix.speed_accuracy >= 0.0 {
            Some(fix.speed)
        } else {
            None
        };
        let course = if fix.course >= 0.0 && fix.course_accuracy >= 0.0 {
            Some(fix.course)
        } else {
            None
        };
        Self {
            coordinates,
            altitude,
            speed,
            course,
            time: fix.time,
            horizontal_accuracy: fix.horizontal_accuracy,
            vertical_accuracy: fix.vertical_accuracy,
            speed_accuracy: fix.speed_accuracy,
            course_accuracy: fix.course_accuracy,
        }
    }
}

impl PositionSample {
    /// Builds a [PositionSample] with valid coordinates only,
    /// every other measurement is marked invalid
    pub fn at(coordinates: Coordinates, time: DateTime<FixedOffset>) -> Self {
        Self {
            coordinates: Some(coordinates),
            horizontal_accuracy: 0.0,
            altitude: None,
            vertical_accuracy: -1.0,
            speed: None,
            speed_accuracy: -1.0,
            course: None,
            course_accuracy: -1.0,
            time,
        }
    }
    /// Copies and returns Self with given (valid) speed in m/s
    pub fn with_speed(&self, speed: f64) -> Self {
        let mut s = *self;
        s.speed = Some(speed);
        s.speed_accuracy = s.speed_accuracy.max(0.0);
        s
    }
    /// Copies and returns Self with given (valid) altitude in meters
    pub fn with_altitude(&self, altitude: f64) -> Self {
        let mut s = *self;
        s.altitude = Some(altitude);
        if s.vertical_accuracy <= 0.0 {
            s.vertical_accuracy = 1.0;
        }
        s
    }
    /// Distance between two samples, in meters, when both are located
    pub fn distance(&self, rhs: &Self) -> Option<f64> {
        match (self.coordinates, rhs.coordinates) {
            (Some(a), Some(b)) => Some(a.distance(&b)),
            _ => None,
        }
    }
}
