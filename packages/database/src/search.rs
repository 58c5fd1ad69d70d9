//! Search execution: run the count and row queries, then summarize.

use std::collections::BTreeMap;

use seismo_map_database_models::{FilterCriteria, ResultSummary, SeismicEvent};

use crate::query::{QueryBuilder, SearchQuery};
use crate::store::EventStore;
use crate::{SearchError, StoreError};

/// Events returned by a search along with their summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    /// Matching events, in store order.
    pub events: Vec<SeismicEvent>,
    /// Total count and centroid.
    pub summary: ResultSummary,
}

/// Runs the count query, then the row query, against `store`.
///
/// The two queries are independent round trips with no shared transaction.
/// If the catalog changes between them the count and the rows may disagree;
/// that is accepted rather than treated as an error. Failures are not
/// retried.
///
/// # Errors
///
/// Returns [`StoreError`] if either query fails.
pub async fn execute(
    store: &dyn EventStore,
    query: &SearchQuery,
) -> Result<(Vec<SeismicEvent>, u64), StoreError> {
    let total_count = store.count(&query.count).await?;
    let rows = store.fetch(&query.rows).await?;
    Ok((rows, total_count))
}

/// Builds, executes, and summarizes a search for validated criteria.
///
/// # Errors
///
/// Returns [`StoreError`] if the store fails.
pub async fn search(
    store: &dyn EventStore,
    builder: &QueryBuilder,
    criteria: &FilterCriteria,
) -> Result<SearchResults, StoreError> {
    let query = builder.build(criteria);
    log::debug!("Searching events with {} clause(s)", query.rows.clauses().len());

    let (events, total_count) = execute(store, &query).await?;
    let summary = ResultSummary::from_rows(&events, total_count);

    log::info!("Search matched {total_count} event(s), returned {}", events.len());

    Ok(SearchResults { events, summary })
}

/// Validates raw field input, then runs [`search`].
///
/// Validation completes before the store is touched, so malformed input
/// never issues a query.
///
/// # Errors
///
/// Returns [`SearchError::Validation`] for malformed input and
/// [`SearchError::Store`] if the store fails.
pub async fn search_fields(
    store: &dyn EventStore,
    builder: &QueryBuilder,
    raw: &BTreeMap<String, String>,
) -> Result<SearchResults, SearchError> {
    let criteria = FilterCriteria::from_fields(raw)?;
    Ok(search(store, builder, &criteria).await?)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};
    use seismo_map_database_models::{FilterField, GeoPoint, ValidationError};

    use super::*;
    use crate::memory::MemoryEventStore;
    use crate::query::{Projection, QuerySpec};

    fn event(lat: f64, lon: f64, mag: f64) -> SeismicEvent {
        SeismicEvent {
            date: NaiveDate::from_ymd_opt(2023, 8, 20).unwrap(),
            time: NaiveTime::from_hms_opt(3, 15, 0).unwrap(),
            latitude: lat,
            longitude: lon,
            depth_km: 20.0,
            magnitude: mag,
            geometry: None,
        }
    }

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// Reports a fixed count regardless of the rows it returns.
    struct FixedCountStore {
        count: u64,
        rows: Vec<SeismicEvent>,
    }

    #[async_trait]
    impl EventStore for FixedCountStore {
        async fn count(&self, _query: &QuerySpec) -> Result<u64, StoreError> {
            Ok(self.count)
        }

        async fn fetch(&self, _query: &QuerySpec) -> Result<Vec<SeismicEvent>, StoreError> {
            Ok(self.rows.clone())
        }

        async fn latest(&self) -> Result<Option<SeismicEvent>, StoreError> {
            Ok(None)
        }

        async fn province_outline(&self) -> Result<Vec<GeoPoint>, StoreError> {
            Ok(Vec::new())
        }
    }

    /// Fails every query and counts how often it was called.
    #[derive(Default)]
    struct FailingStore {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl EventStore for FailingStore {
        async fn count(&self, _query: &QuerySpec) -> Result<u64, StoreError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(StoreError::Connection {
                message: "connection refused".to_string(),
            })
        }

        async fn fetch(&self, _query: &QuerySpec) -> Result<Vec<SeismicEvent>, StoreError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(StoreError::Connection {
                message: "connection refused".to_string(),
            })
        }

        async fn latest(&self) -> Result<Option<SeismicEvent>, StoreError> {
            Ok(None)
        }

        async fn province_outline(&self) -> Result<Vec<GeoPoint>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn count_runs_before_rows_with_same_params() {
        let store = MemoryEventStore::new(vec![event(-31.4, -64.2, 4.5)]);
        let builder = QueryBuilder::default();

        search_fields(
            &store,
            &builder,
            &raw(&[("magnitude_min", "4.0"), ("latitude", "-31.4"), ("longitude", "-64.2")]),
        )
        .await
        .unwrap();

        let issued = store.issued();
        assert_eq!(issued.len(), 2);
        assert_eq!(issued[0].projection, Projection::Count);
        assert_eq!(issued[1].projection, Projection::Rows);
        assert_eq!(issued[0].params, issued[1].params);
        assert_eq!(issued[0].params.len(), 3);
    }

    #[tokio::test]
    async fn summarizes_returned_rows() {
        let store = MemoryEventStore::new(vec![
            event(-31.0, -64.0, 3.0),
            event(-32.0, -64.5, 3.5),
            event(-33.0, -65.0, 4.0),
        ]);

        let results = search(&store, &QueryBuilder::default(), &FilterCriteria::default())
            .await
            .unwrap();

        assert_eq!(results.events.len(), 3);
        assert_eq!(results.summary.total_count, 3);
        let centroid = results.summary.centroid.unwrap();
        assert!((centroid.latitude - -32.0).abs() < 1e-9);
        assert!((centroid.longitude - -64.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let store = MemoryEventStore::new(vec![event(-31.0, -64.0, 2.0)]);
        let results = search_fields(
            &store,
            &QueryBuilder::default(),
            &raw(&[("magnitude_min", "6")]),
        )
        .await
        .unwrap();

        assert!(results.events.is_empty());
        assert_eq!(results.summary.total_count, 0);
        assert!(results.summary.centroid.is_none());
    }

    #[tokio::test]
    async fn count_is_independent_of_returned_rows() {
        let store = FixedCountStore {
            count: 250,
            rows: Vec::new(),
        };
        let results = search(&store, &QueryBuilder::default(), &FilterCriteria::default())
            .await
            .unwrap();

        assert_eq!(results.summary.total_count, 250);
        assert!(results.summary.centroid.is_none());
    }

    #[tokio::test]
    async fn validation_fails_before_any_query() {
        let store = MemoryEventStore::default();
        let err = search_fields(&store, &QueryBuilder::default(), &raw(&[("latitude", "-31.4")]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Validation(ValidationError::Unpaired {
                missing: FilterField::Longitude,
                ..
            })
        ));
        assert!(store.issued().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_surfaced_without_retry() {
        let store = FailingStore::default();
        let err = search(&store, &QueryBuilder::default(), &FilterCriteria::default())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Connection { .. }));
        assert_eq!(store.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_returns_rows_and_count() {
        let store =
            MemoryEventStore::new(vec![event(-31.0, -64.0, 5.0), event(-31.0, -64.0, 1.0)]);
        let query = QueryBuilder::default().build(&FilterCriteria {
            magnitude_max: Some(3.0),
            ..FilterCriteria::default()
        });

        let (rows, total) = execute(&store, &query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows.len(), 1);
        assert!((rows[0].magnitude - 1.0).abs() < f64::EPSILON);
    }
}
