//! Event store interface and its `PostGIS` implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use moosicbox_json_utils::database::ToValue as _;
use seismo_map_database_models::{FilterValue, GeoPoint, SeismicEvent};
use switchy_database::{Database, DatabaseValue, Row};

use crate::StoreError;
use crate::query::{EVENTS_TABLE, QuerySpec, ROW_COLUMNS};

/// Read-only access to the seismic event catalog.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Runs a count query and returns the number of matching events.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    async fn count(&self, query: &QuerySpec) -> Result<u64, StoreError>;

    /// Runs a row query and returns the matching events.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or a row cannot be decoded.
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<SeismicEvent>, StoreError>;

    /// Returns the most recently recorded event, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or the row cannot be decoded.
    async fn latest(&self) -> Result<Option<SeismicEvent>, StoreError>;

    /// Returns the vertices of the province boundary's exterior ring.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingData`] if no boundary is stored, or
    /// another [`StoreError`] if the query fails.
    async fn province_outline(&self) -> Result<Vec<GeoPoint>, StoreError>;
}

/// [`EventStore`] backed by a `PostGIS` database.
#[derive(Clone)]
pub struct PostgisEventStore {
    db: Arc<dyn Database>,
}

impl PostgisEventStore {
    /// Wraps an open database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PostgisEventStore {
    async fn count(&self, query: &QuerySpec) -> Result<u64, StoreError> {
        let rows = run(self.db.as_ref(), query).await?;
        decode_count(&rows)
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<SeismicEvent>, StoreError> {
        let rows = run(self.db.as_ref(), query).await?;
        rows.iter().map(decode_event).collect()
    }

    async fn latest(&self) -> Result<Option<SeismicEvent>, StoreError> {
        let sql = format!("SELECT {ROW_COLUMNS} FROM {EVENTS_TABLE} ORDER BY id DESC LIMIT 1");
        let rows = self.db.query_raw_params(&sql, &[]).await?;
        rows.first().map(decode_event).transpose()
    }

    async fn province_outline(&self) -> Result<Vec<GeoPoint>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT ST_X(point) AS longitude, ST_Y(point) AS latitude
                 FROM (
                     SELECT (ST_DumpPoints(ST_ExteriorRing(geom))).geom AS point
                     FROM provincia
                 ) AS points",
                &[],
            )
            .await?;

        if rows.is_empty() {
            return Err(StoreError::MissingData {
                message: "No province boundary found".to_string(),
            });
        }

        rows.iter()
            .map(|row| -> Result<GeoPoint, StoreError> {
                Ok(GeoPoint::new(
                    row.to_value("latitude")
                        .map_err(|e| conversion("latitude", &e))?,
                    row.to_value("longitude")
                        .map_err(|e| conversion("longitude", &e))?,
                ))
            })
            .collect()
    }
}

async fn run(db: &dyn Database, query: &QuerySpec) -> Result<Vec<Row>, StoreError> {
    let sql = query.sql();
    let params: Vec<DatabaseValue> = query.params().iter().map(to_database_value).collect();

    log::debug!("Executing {sql} with {} param(s)", params.len());

    Ok(db.query_raw_params(&sql, &params).await?)
}

/// Converts a criteria value into the parameter type its placeholder cast
/// expects.
///
/// Parameters travel in binary format: dates are bound as timestamps at
/// midnight (`::timestamp`), times as text (`::text::time`), numbers as
/// doubles (`::float8`).
#[must_use]
pub fn to_database_value(value: &FilterValue) -> DatabaseValue {
    match value {
        FilterValue::Date(date) => DatabaseValue::DateTime(date.and_time(NaiveTime::default())),
        FilterValue::Time(time) => DatabaseValue::String(time.format("%H:%M:%S%.f").to_string()),
        FilterValue::Number(n) => DatabaseValue::Real64(*n),
    }
}

/// Reads the `count` column of a count query's result. An empty result
/// counts as zero.
fn decode_count(rows: &[Row]) -> Result<u64, StoreError> {
    let count: i64 = match rows.first() {
        Some(row) => row.to_value("count").map_err(|e| conversion("count", &e))?,
        None => 0,
    };

    u64::try_from(count).map_err(|_| StoreError::Conversion {
        message: format!("Negative event count: {count}"),
    })
}

fn decode_event(row: &Row) -> Result<SeismicEvent, StoreError> {
    let date: String = row.to_value("date").map_err(|e| conversion("date", &e))?;
    let time: String = row.to_value("time").map_err(|e| conversion("time", &e))?;

    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| conversion("date", &e))?;
    let time = NaiveTime::parse_from_str(&time, "%H:%M:%S%.f")
        .map_err(|e| conversion("time", &e))?;

    // NULL geometry decodes as `None`.
    let geom_latitude: Option<f64> = row
        .to_value("geom_latitude")
        .map_err(|e| conversion("geom_latitude", &e))?;
    let geom_longitude: Option<f64> = row
        .to_value("geom_longitude")
        .map_err(|e| conversion("geom_longitude", &e))?;

    Ok(SeismicEvent {
        date,
        time,
        latitude: row
            .to_value("latitude")
            .map_err(|e| conversion("latitude", &e))?,
        longitude: row
            .to_value("longitude")
            .map_err(|e| conversion("longitude", &e))?,
        depth_km: row
            .to_value("depth_km")
            .map_err(|e| conversion("depth_km", &e))?,
        magnitude: row
            .to_value("magnitude")
            .map_err(|e| conversion("magnitude", &e))?,
        geometry: geom_latitude.zip(geom_longitude).map(|(lat, lon)| GeoPoint::new(lat, lon)),
    })
}

fn conversion(column: &str, e: &dyn std::fmt::Display) -> StoreError {
    StoreError::Conversion {
        message: format!("Failed to parse column '{column}': {e}"),
    }
}
