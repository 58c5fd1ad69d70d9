//! Aggregate facts derived from a search result.

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, SeismicEvent};

/// Summary of a search: the total match count and the centroid of the
/// returned events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Number of events matching the criteria, as reported by the
    /// independent count query.
    pub total_count: u64,
    /// Mean position of the returned events, or `None` if no rows were
    /// returned.
    pub centroid: Option<GeoPoint>,
}

impl ResultSummary {
    /// Builds a summary from the returned rows and the separately queried
    /// total count.
    ///
    /// The centroid is the arithmetic mean of latitudes and of longitudes.
    /// This is not a geodesic centroid and drifts for events spread over
    /// large extents or across the antimeridian.
    #[must_use]
    pub fn from_rows(rows: &[SeismicEvent], total_count: u64) -> Self {
        Self {
            total_count,
            centroid: centroid(rows),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn centroid(rows: &[SeismicEvent]) -> Option<GeoPoint> {
    if rows.is_empty() {
        return None;
    }

    let n = rows.len() as f64;
    let (lat_sum, lon_sum) = rows.iter().fold((0.0, 0.0), |(lat, lon), event| {
        (lat + event.latitude, lon + event.longitude)
    });

    Some(GeoPoint::new(lat_sum / n, lon_sum / n))
}
