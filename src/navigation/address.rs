use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(feature = "log")]
use log::debug;

use crate::{
    config::ThrottleConfig,
    error::{Error, ServiceError},
    navigation::{flight::SingleFlight, lock, throttle::Throttle},
    sample::Coordinates,
};

/// Reverse geocoding capability, provided by the application shell
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the [Placemark]s describing `position`, best match first
    async fn reverse_geocode(&self, position: Coordinates) -> Result<Vec<Placemark>, ServiceError>;
}

/// Administrative description of a place. Any field may be missing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Placemark {
    pub country: Option<String>,
    pub administrative_area: Option<String>,
    pub sub_administrative_area: Option<String>,
    pub locality: Option<String>,
    pub sub_locality: Option<String>,
    pub thoroughfare: Option<String>,
    pub sub_thoroughfare: Option<String>,
}

impl Placemark {
    /// Area names, coarse to fine
    pub fn areas(&self) -> impl Iterator<Item = &str> + '_ {
        [
            &self.country,
            &self.administrative_area,
            &self.sub_administrative_area,
            &self.locality,
            &self.sub_locality,
            &self.thoroughfare,
            &self.sub_thoroughfare,
        ]
        .into_iter()
        .filter_map(|area| area.as_deref())
    }
}

/// Resolved address of one position
#[derive(Debug, Clone, PartialEq)]
pub struct AddressResult {
    /// Area names, coarse to fine: unique and never empty
    pub areas: Vec<String>,
    pub position: Coordinates,
    pub resolved_at: DateTime<Utc>,
}

impl AddressResult {
    /// Reduces [Placemark]s to their area names. Returns None when
    /// nothing usable remains.
    pub fn from_placemarks(
        position: Coordinates,
        placemarks: &[Placemark],
        resolved_at: DateTime<Utc>,
    ) -> Option<Self> {
        let mut areas: Vec<String> = Vec::new();
        for area in placemarks.iter().flat_map(|p| p.areas()) {
            let area = area.trim();
            if !area.is_empty() && !areas.iter().any(|a| a == area) {
                areas.push(area.to_string());
            }
        }
        if areas.is_empty() {
            None
        } else {
            Some(Self {
                areas,
                position,
                resolved_at,
            })
        }
    }
    /// Finest area name
    pub fn name(&self) -> Option<&str> {
        self.areas.last().map(|s| s.as_str())
    }
}

impl std::fmt::Display for AddressResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.areas.join(", "))
    }
}

/// [AddressResolver] queries a [Geocoder], single flight and throttled.
/// It has no forced mode: inside the cooldown window it declines.
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
    config: ThrottleConfig,
    throttle: Mutex<Throttle>,
    flights: SingleFlight,
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("config", &self.config)
            .field("throttle", &self.throttle)
            .finish()
    }
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, config: ThrottleConfig) -> Self {
        Self {
            geocoder,
            throttle: Mutex::new(Throttle::from_config(&config)),
            config,
            flights: SingleFlight::default(),
        }
    }
    /// True when no resolution is running, the cooldown expired, and the
    /// position moved by the configured distance since `previous`
    pub fn can_fetch(&self, position: Coordinates, previous: Option<&AddressResult>) -> bool {
        if self.flights.is_busy() || !lock(&self.throttle).is_ready() {
            return false;
        }
        match previous {
            None => true,
            Some(previous) => previous.position.distance(&position) >= self.config.min_distance,
        }
    }
    /// Cancels the pending resolution, if any
    pub fn cancel(&self) {
        self.flights.cancel();
    }
    /// Resolves `position`, superseding any pending resolution.
    /// Returns None inside the cooldown window.
    pub async fn fetch(&self, position: Coordinates) -> Result<Option<AddressResult>, Error> {
        let flight = self.flights.begin();
        let token = flight.token();
        if !lock(&self.throttle).is_ready() {
            return Ok(None);
        }

        let placemarks = tokio::select! {
            _ = token.cancelled() => return Err(Error::Cancelled),
            placemarks = self.geocoder.reverse_geocode(position) => placemarks?,
        };
        let result = AddressResult::from_placemarks(position, &placemarks, Utc::now())
            .ok_or(Error::Service(ServiceError::NoResult))?;

        lock(&self.throttle).record();
        #[cfg(feature = "log")]
        debug!("{} resolved to \"{}\"", position, result);
        Ok(Some(result))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn areas_reduction() {
        let placemarks = vec![
            Placemark {
                country: Some("Japan".to_string()),
                administrative_area: Some("Kyoto".to_string()),
                locality: Some("Kyoto".to_string()),
                sub_locality: Some("Higashiyama".to_string()),
                thoroughfare: Some("".to_string()),
                ..Default::default()
            },
            Placemark {
                country: Some("Japan".to_string()),
                sub_thoroughfare: Some(" 294 ".to_string()),
                ..Default::default()
            },
        ];
        let result =
            AddressResult::from_placemarks(Coordinates::new(35.0, 135.8), &placemarks, Utc::now())
                .unwrap();
        assert_eq!(result.areas, vec!["Japan", "Kyoto", "Higashiyama", "294"]);
        assert_eq!(result.name(), Some("294"));
        assert_eq!(result.to_string(), "Japan, Kyoto, Higashiyama, 294");
    }
    #[test]
    fn nothing_usable() {
        let placemarks = vec![Placemark {
            locality: Some("  ".to_string()),
            ..Default::default()
        }];
        assert!(AddressResult::from_placemarks(Coordinates::default(), &placemarks, Utc::now())
            .is_none());
        assert!(AddressResult::from_placemarks(Coordinates::default(), &[], Utc::now()).is_none());
    }
}
