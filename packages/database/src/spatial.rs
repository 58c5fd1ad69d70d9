//! Fixed-radius proximity predicate.
//!
//! The catalog stores epicenters as `PostGIS` point geometries. Distance is
//! measured on the spheroid by casting both sides to `geography`, so the
//! radius is in meters.

use seismo_map_database_models::{FilterValue, GeoPoint};

/// Search radius around the center point, in meters.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 10_000.0;

/// Generates the "within distance of a point" clause for a radius search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialPredicate {
    radius_meters: f64,
}

impl Default for SpatialPredicate {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_RADIUS_METERS)
    }
}

impl SpatialPredicate {
    /// Creates a predicate with the given radius in meters.
    #[must_use]
    pub const fn new(radius_meters: f64) -> Self {
        Self { radius_meters }
    }

    /// The search radius in meters.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Returns the bound parameters for a search centered on `center`.
    ///
    /// Longitude comes first, matching `ST_MakePoint(x, y)`.
    #[must_use]
    pub const fn params(center: GeoPoint) -> [FilterValue; 2] {
        [
            FilterValue::Number(center.longitude),
            FilterValue::Number(center.latitude),
        ]
    }

    /// Renders the clause with its two placeholders numbered from `first`.
    #[must_use]
    pub fn render(&self, first: usize) -> String {
        format!(
            "ST_DWithin(geom::geography, \
             ST_SetSRID(ST_MakePoint(${first}::float8, ${}::float8), 4326)::geography, \
             {:?})",
            first + 1,
            self.radius_meters,
        )
    }
}

/// Great-circle distance between two points in meters.
///
/// Uses the haversine formula on a sphere of mean Earth radius. `PostGIS`
/// measures on the WGS84 spheroid, so results differ by up to about 0.5%.
#[must_use]
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}
