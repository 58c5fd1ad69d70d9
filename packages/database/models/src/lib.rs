#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Seismic event rows, search criteria, and result summary types.
//!
//! These types represent the shapes of data as read from the `PostGIS`
//! event catalog and the validated inputs used to search it. They are
//! distinct from the API response types in `seismo_map_server_models`.

pub mod criteria;
pub mod summary;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub use criteria::{FilterCriteria, FilterField, FilterValue, ValidationError};
pub use summary::ResultSummary;

/// A position in WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A seismic event row as retrieved from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Local time of the event.
    pub time: NaiveTime,
    /// Epicenter latitude (WGS84).
    pub latitude: f64,
    /// Epicenter longitude (WGS84).
    pub longitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth_km: f64,
    /// Magnitude.
    pub magnitude: f64,
    /// Stored point geometry, when the row has one.
    pub geometry: Option<GeoPoint>,
}

impl SeismicEvent {
    /// Returns the epicenter as a [`GeoPoint`].
    #[must_use]
    pub const fn epicenter(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
