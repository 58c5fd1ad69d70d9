//! HTTP handler functions for the seismo map API.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, web};
use seismo_map_database::{SearchError, StoreError, search_fields};
use seismo_map_server_models::{
    ApiError, ApiEvent, ApiHealth, ApiLatestResponse, ApiMapView, ApiSearchResponse,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/events/latest`
///
/// Returns the most recently recorded event.
pub async fn latest(state: web::Data<AppState>) -> HttpResponse {
    match state.store.latest().await {
        Ok(event) => HttpResponse::Ok().json(ApiLatestResponse {
            event: event.map(ApiEvent::from),
            map_view: ApiMapView::DEFAULT,
        }),
        Err(e) => {
            log::error!("Failed to query latest event: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to query latest event"))
        }
    }
}

/// `GET /api/search`
///
/// Searches with criteria taken from the query string.
pub async fn search_query(
    state: web::Data<AppState>,
    params: web::Query<BTreeMap<String, String>>,
) -> HttpResponse {
    run_search(&state, &params.into_inner()).await
}

/// `POST /api/search`
///
/// Searches with criteria taken from a URL-encoded form body.
pub async fn search_form(
    state: web::Data<AppState>,
    form: web::Form<BTreeMap<String, String>>,
) -> HttpResponse {
    run_search(&state, &form.into_inner()).await
}

/// `GET /api/province`
///
/// Returns the province boundary vertices.
pub async fn province(state: web::Data<AppState>) -> HttpResponse {
    match state.store.province_outline().await {
        Ok(points) => HttpResponse::Ok().json(points),
        Err(StoreError::MissingData { message }) => {
            log::warn!("Province outline unavailable: {message}");
            HttpResponse::NotFound().json(ApiError::new(message))
        }
        Err(e) => {
            log::error!("Failed to query province outline: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to query province outline"))
        }
    }
}

async fn run_search(state: &AppState, raw: &BTreeMap<String, String>) -> HttpResponse {
    match search_fields(state.store.as_ref(), &state.builder, raw).await {
        Ok(results) => HttpResponse::Ok().json(ApiSearchResponse {
            total_count: results.summary.total_count,
            centroid: results.summary.centroid,
            events: results.events.into_iter().map(ApiEvent::from).collect(),
            radius_meters: state.builder.spatial().radius_meters(),
            map_view: ApiMapView::DEFAULT,
        }),
        Err(SearchError::Validation(e)) => {
            log::debug!("Rejected search input: {e}");
            HttpResponse::BadRequest().json(ApiError::from(&e))
        }
        Err(SearchError::Store(e)) => {
            log::error!("Failed to search events: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::new("Failed to search events"))
        }
    }
}
