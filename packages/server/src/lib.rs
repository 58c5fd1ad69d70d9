#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the seismo map application.
//!
//! Serves the REST API for searching the seismic event catalog and the
//! prebuilt frontend from a static directory. Searches accept the criteria
//! either as a query string (`GET /api/search`) or as a URL-encoded form
//! body (`POST /api/search`).

pub mod config;
mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use seismo_map_database::db;
use seismo_map_database::query::QueryBuilder;
use seismo_map_database::store::{EventStore, PostgisEventStore};

use crate::config::ServerConfig;

/// Shared application state.
pub struct AppState {
    /// Read-only event catalog.
    pub store: Arc<dyn EventStore>,
    /// Query builder, carrying the search radius.
    pub builder: QueryBuilder,
}

impl AppState {
    /// Creates state over `store` with the default search radius.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            builder: QueryBuilder::default(),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/events/latest", web::get().to(handlers::latest))
            .route("/search", web::get().to(handlers::search_query))
            .route("/search", web::post().to(handlers::search_form))
            .route("/province", web::get().to(handlers::province)),
    );
}

/// Starts the seismo map API server.
///
/// Connects to the `PostGIS` event catalog and starts the Actix-Web HTTP
/// server. The caller is responsible for providing the async runtime (e.g.
/// via `#[actix_web::main]`) and for initializing the logger.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database connection fails, or
/// if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let config = ServerConfig::from_env();

    log::info!("Connecting to event catalog...");
    let db_conn = db::connect_from_env().await.map_err(|e| {
        log::error!("Failed to connect to database: {e}");
        std::io::Error::other(e.to_string())
    })?;

    let store: Arc<dyn EventStore> = Arc::new(PostgisEventStore::new(Arc::from(db_conn)));
    let state = web::Data::new(AppState::new(store));

    log::info!(
        "Starting server on {}:{} (static files from {})",
        config.bind_addr,
        config.port,
        config.static_dir
    );

    let static_dir = config.static_dir.clone();

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve frontend static files (production)
            .service(Files::new("/", static_dir.as_str()).index_file("index.html"))
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
