#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * tournav: touring companion engine.
 * This crate is shipped under the Mozilla Public License 2.0.
 *
 * Position fixes are filtered and logged to CSV, logs convert to GPX,
 * destinations are organized in persisted sets, and navigation towards
 * the targeted destination relies on throttled route/address queries.
 */

pub mod config;
pub mod convert;
pub mod destination;
pub mod epoch;
pub mod filter;
pub mod logger;
pub mod navigation;
pub mod reader;
pub mod sample;
pub mod units;
pub mod writer;

mod error;

#[cfg(test)]
mod tests;

pub use error::{Error, ServiceError};

/// Package to include all basic structures
pub mod prelude {
    pub use crate::config::{Config, FilterConfig, LoggerConfig, ThrottleConfig, ViewportConfig};
    pub use crate::convert::{convert_file, csv_to_gpx, ConversionSummary, GpxOptions, GpxWriter};
    pub use crate::destination::{
        Catalog, Destination, DestinationId, DestinationSet, DestinationStore, Mutation,
        SetEvent, SetId,
    };
    pub use crate::filter::{should_accept, SampleFilter};
    pub use crate::logger::{LoggerEvent, LoggingState, TrackLogger};
    pub use crate::navigation::{
        AddressResolver, AddressResult, Directions, Geocoder, Heading, NavigationContext,
        NavigationEvent, Placemark, Route, RouteFetcher, RouteResult, ViewportCommand,
    };
    pub use crate::sample::{Coordinates, PositionSample, RawFix};
    pub use crate::units::{CompassReference, Preferences, Units};
    pub use crate::{Error, ServiceError};

    // pub re-export
    pub use chrono::{DateTime, FixedOffset, Local, Utc};
}
