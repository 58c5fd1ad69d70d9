//! In-memory [`EventStore`] that evaluates [`QuerySpec`]s against a fixed
//! list of events.
//!
//! Compiled for this crate's tests and, with the `test-utils` feature, for
//! the tests of dependent crates. Radius clauses use
//! [`haversine_distance`](crate::spatial::haversine_distance), so results
//! near the radius boundary can differ slightly from `PostGIS`.

use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use seismo_map_database_models::{FilterField, FilterValue, GeoPoint, SeismicEvent};

use crate::StoreError;
use crate::query::{Clause, Operator, Projection, QuerySpec};
use crate::spatial::haversine_distance;
use crate::store::EventStore;

/// A query as received by [`MemoryEventStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedQuery {
    /// Whether rows or a count were requested.
    pub projection: Projection,
    /// The rendered SQL text.
    pub sql: String,
    /// The bound parameters.
    pub params: Vec<FilterValue>,
}

/// [`EventStore`] over an in-memory event list.
///
/// Events are kept in insertion order; the last one is the latest.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: Vec<SeismicEvent>,
    outline: Vec<GeoPoint>,
    issued: Mutex<Vec<IssuedQuery>>,
}

impl MemoryEventStore {
    /// Creates a store holding `events`.
    #[must_use]
    pub fn new(events: Vec<SeismicEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Sets the province boundary returned by
    /// [`EventStore::province_outline`].
    #[must_use]
    pub fn with_outline(mut self, outline: Vec<GeoPoint>) -> Self {
        self.outline = outline;
        self
    }

    /// Returns every query received so far, in order.
    #[must_use]
    pub fn issued(&self) -> Vec<IssuedQuery> {
        self.issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn record(&self, query: &QuerySpec) {
        self.issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(IssuedQuery {
                projection: query.projection(),
                sql: query.sql(),
                params: query.params().to_vec(),
            });
    }

    fn matching(&self, query: &QuerySpec) -> Result<Vec<&SeismicEvent>, StoreError> {
        if query.placeholder_count() != query.params().len() {
            return Err(StoreError::Conversion {
                message: format!(
                    "Query expects {} parameter(s), got {}",
                    query.placeholder_count(),
                    query.params().len()
                ),
            });
        }

        let mut matched = Vec::new();
        for event in &self.events {
            if matches(event, query)? {
                matched.push(event);
            }
        }
        Ok(matched)
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn count(&self, query: &QuerySpec) -> Result<u64, StoreError> {
        self.record(query);
        let matched = self.matching(query)?;
        Ok(matched.len() as u64)
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<SeismicEvent>, StoreError> {
        self.record(query);
        Ok(self.matching(query)?.into_iter().cloned().collect())
    }

    async fn latest(&self) -> Result<Option<SeismicEvent>, StoreError> {
        Ok(self.events.last().cloned())
    }

    async fn province_outline(&self) -> Result<Vec<GeoPoint>, StoreError> {
        if self.outline.is_empty() {
            return Err(StoreError::MissingData {
                message: "No province boundary found".to_string(),
            });
        }
        Ok(self.outline.clone())
    }
}

fn matches(event: &SeismicEvent, query: &QuerySpec) -> Result<bool, StoreError> {
    let mut params = query.params().iter().copied();

    for clause in query.clauses() {
        let satisfied = match clause {
            Clause::Compare {
                field, operator, ..
            } => {
                let bound = params.next().ok_or_else(missing_param)?;
                let actual = event_value(event, *field)?;
                let ordering = compare(actual, bound).ok_or_else(|| StoreError::Conversion {
                    message: format!("Cannot compare {field} against {bound}"),
                })?;
                match operator {
                    Operator::AtLeast => ordering != Ordering::Less,
                    Operator::AtMost => ordering != Ordering::Greater,
                }
            }
            Clause::WithinRadius(predicate) => {
                let longitude = number(params.next().ok_or_else(missing_param)?)?;
                let latitude = number(params.next().ok_or_else(missing_param)?)?;
                let center = GeoPoint::new(latitude, longitude);
                haversine_distance(event.epicenter(), center) <= predicate.radius_meters()
            }
        };

        if !satisfied {
            return Ok(false);
        }
    }

    Ok(true)
}

fn event_value(event: &SeismicEvent, field: FilterField) -> Result<FilterValue, StoreError> {
    Ok(match field {
        FilterField::DateFrom | FilterField::DateTo => FilterValue::Date(event.date),
        FilterField::TimeFrom | FilterField::TimeTo => FilterValue::Time(event.time),
        FilterField::MagnitudeMin | FilterField::MagnitudeMax => {
            FilterValue::Number(event.magnitude)
        }
        FilterField::DepthMin | FilterField::DepthMax => FilterValue::Number(event.depth_km),
        FilterField::Latitude | FilterField::Longitude => {
            return Err(StoreError::Conversion {
                message: format!("{field} is not a comparison field"),
            });
        }
    })
}

fn compare(actual: FilterValue, bound: FilterValue) -> Option<Ordering> {
    match (actual, bound) {
        (FilterValue::Date(a), FilterValue::Date(b)) => Some(a.cmp(&b)),
        (FilterValue::Time(a), FilterValue::Time(b)) => Some(a.cmp(&b)),
        (FilterValue::Number(a), FilterValue::Number(b)) => a.partial_cmp(&b),
        _ => None,
    }
}

fn number(value: FilterValue) -> Result<f64, StoreError> {
    match value {
        FilterValue::Number(n) => Ok(n),
        other => Err(StoreError::Conversion {
            message: format!("Expected a coordinate, got {other}"),
        }),
    }
}

fn missing_param() -> StoreError {
    StoreError::Conversion {
        message: "Query has fewer parameters than placeholders".to_string(),
    }
}
