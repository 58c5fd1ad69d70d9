//! Terminal rendering of search results.

use std::fmt::Write as _;

use seismo_map_database::SearchResults;
use seismo_map_database_models::SeismicEvent;
use seismo_map_server_models::{ApiEvent, ApiMapView, ApiSearchResponse};

/// Renders one event per line under a column header, followed by the total
/// count and centroid.
#[must_use]
pub fn table(results: &SearchResults) -> String {
    let mut out = header();
    for event in &results.events {
        out.push_str(&row(event));
        out.push('\n');
    }
    out.push('\n');

    let _ = writeln!(out, "Total: {}", results.summary.total_count);
    match results.summary.centroid {
        Some(centroid) => {
            let _ = writeln!(
                out,
                "Centroid: {:.4}, {:.4}",
                centroid.latitude, centroid.longitude
            );
        }
        None => out.push_str("Centroid: -\n"),
    }
    out
}

/// Renders results as the same JSON document the HTTP API returns.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if serialization fails.
pub fn json(results: SearchResults, radius_meters: f64) -> Result<String, serde_json::Error> {
    let response = ApiSearchResponse {
        total_count: results.summary.total_count,
        centroid: results.summary.centroid,
        events: results.events.into_iter().map(ApiEvent::from).collect(),
        radius_meters,
        map_view: ApiMapView::DEFAULT,
    };
    serde_json::to_string_pretty(&response)
}

/// Column header shared by the search and latest-event listings.
#[must_use]
pub fn header() -> String {
    let mut out = format!(
        "{:<12} {:<10} {:>10} {:>10} {:>8} {:>6}\n",
        "DATE", "TIME", "LATITUDE", "LONGITUDE", "DEPTH", "MAG"
    );
    out.push_str(&"-".repeat(61));
    out.push('\n');
    out
}

/// Formats a single event as a table row.
#[must_use]
pub fn row(event: &SeismicEvent) -> String {
    format!(
        "{:<12} {:<10} {:>10.4} {:>10.4} {:>8.1} {:>6.1}",
        event.date.format("%Y-%m-%d").to_string(),
        event.time.format("%H:%M:%S").to_string(),
        event.latitude,
        event.longitude,
        event.depth_km,
        event.magnitude,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use seismo_map_database_models::{GeoPoint, ResultSummary};

    use super::*;

    fn results() -> SearchResults {
        let events = vec![SeismicEvent {
            date: NaiveDate::from_ymd_opt(2021, 6, 14).unwrap(),
            time: NaiveTime::from_hms_opt(22, 3, 9).unwrap(),
            latitude: -31.25,
            longitude: -64.5,
            depth_km: 12.0,
            magnitude: 3.8,
            geometry: Some(GeoPoint::new(-31.25, -64.5)),
        }];
        let summary = ResultSummary::from_rows(&events, 1);
        SearchResults { events, summary }
    }

    #[test]
    fn row_formats_every_column() {
        let line = row(&results().events[0]);
        assert!(line.starts_with("2021-06-14   22:03:09"));
        assert!(line.contains("-31.2500"));
        assert!(line.contains("-64.5000"));
        assert!(line.ends_with("12.0    3.8"));
    }

    #[test]
    fn table_ends_with_summary() {
        let out = table(&results());
        assert!(out.contains("Total: 1\n"));
        assert!(out.ends_with("Centroid: -31.2500, -64.5000\n"));
    }

    #[test]
    fn empty_table_has_no_centroid() {
        let empty = SearchResults {
            events: vec![],
            summary: ResultSummary::from_rows(&[], 0),
        };
        let out = table(&empty);
        assert!(out.contains("Total: 0\n"));
        assert!(out.ends_with("Centroid: -\n"));
    }

    #[test]
    fn json_matches_api_shape() {
        let value: serde_json::Value =
            serde_json::from_str(&json(results(), 10_000.0).unwrap()).unwrap();
        assert_eq!(value["totalCount"], 1);
        assert_eq!(value["radiusMeters"], 10_000.0);
        assert_eq!(value["events"][0]["date"], "2021-06-14");
        assert_eq!(value["mapView"]["zoom"], 6);
    }
}
