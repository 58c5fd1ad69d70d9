#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the seismo map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the catalog row types to allow independent evolution of the API
//! contract.

use chrono::{NaiveDate, NaiveTime};
use seismo_map_database_models::{GeoPoint, SeismicEvent, ValidationError};
use serde::{Deserialize, Serialize};

/// A seismic event as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// Event date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Event time (`HH:MM:SS`).
    pub time: NaiveTime,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Depth in kilometers.
    pub depth_km: f64,
    /// Magnitude.
    pub magnitude: f64,
}

impl From<SeismicEvent> for ApiEvent {
    fn from(event: SeismicEvent) -> Self {
        Self {
            date: event.date,
            time: event.time,
            latitude: event.latitude,
            longitude: event.longitude,
            depth_km: event.depth_km,
            magnitude: event.magnitude,
        }
    }
}

/// Initial map view for rendering results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapView {
    /// Map center.
    pub center: GeoPoint,
    /// Zoom level.
    pub zoom: u8,
}

impl ApiMapView {
    /// Province of Córdoba, Argentina.
    pub const DEFAULT: Self = Self {
        center: GeoPoint::new(-32.293_5, -64.181_05),
        zoom: 6,
    };
}

impl Default for ApiMapView {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Response from the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSearchResponse {
    /// Matching events.
    pub events: Vec<ApiEvent>,
    /// Total number of matching events, from the count query.
    pub total_count: u64,
    /// Mean position of the returned events; `null` when none matched.
    pub centroid: Option<GeoPoint>,
    /// Radius used for center-point searches, in meters.
    pub radius_meters: f64,
    /// Initial map view.
    pub map_view: ApiMapView,
}

/// Response from the latest-event endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLatestResponse {
    /// The most recent event; `null` when the catalog is empty.
    pub event: Option<ApiEvent>,
    /// Initial map view.
    pub map_view: ApiMapView,
}

/// Error body returned for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// The offending input field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    /// Creates an error without a field.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
        }
    }
}

impl From<&ValidationError> for ApiError {
    fn from(e: &ValidationError) -> Self {
        Self {
            error: e.to_string(),
            field: Some(e.field().to_string()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
