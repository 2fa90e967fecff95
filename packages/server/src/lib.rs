#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the donation coordination application.
//!
//! Serves geolocation lookups (hospitals, camps, analytics, map data),
//! the public alerts feed, community posts, registration endpoints, and
//! urgency scoring over a shared in-memory [`Registry`]. The registry is
//! seeded from a JSON file at startup (`SEED_PATH`, default
//! `data/seed.json`) and starts empty if the file is missing.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use bloodlink_registry::Registry;

mod handlers;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The proximity registry backing all lookups.
    pub registry: Arc<Registry>,
}

/// Registers every route on the given service config.
///
/// Shared between [`run_server`] and the handler tests so both exercise
/// the same routing table.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(handlers::health))
        .service(
            web::scope("/geolocation")
                .route(
                    "/nearby-hospitals",
                    web::get().to(handlers::nearby_hospitals),
                )
                .route("/nearby-camps", web::get().to(handlers::nearby_camps))
                .route("/analytics", web::get().to(handlers::regional_analytics))
                .route("/map-data", web::get().to(handlers::map_data)),
        )
        .route("/public/alerts", web::get().to(handlers::public_alerts))
        .service(
            web::scope("/community")
                .route("/nearby-posts", web::get().to(handlers::nearby_posts))
                .route("/posts", web::post().to(handlers::create_post)),
        )
        .route("/hospitals", web::post().to(handlers::create_hospital))
        .route("/camps", web::post().to(handlers::create_camp))
        .route(
            "/camps/{id}/register",
            web::post().to(handlers::register_volunteer),
        )
        .route("/alerts", web::post().to(handlers::create_alert))
        .route("/requests/urgency", web::post().to(handlers::request_urgency));
}

/// Loads the registry from `SEED_PATH`, falling back to an empty registry
/// when the file is absent or unreadable.
fn load_registry() -> Registry {
    let seed_path =
        std::env::var("SEED_PATH").unwrap_or_else(|_| "data/seed.json".to_string());
    let seed_path = std::path::Path::new(&seed_path);

    if !seed_path.is_file() {
        log::warn!(
            "Seed file '{}' not found, starting with an empty registry",
            seed_path.display()
        );
        return Registry::new();
    }

    match Registry::from_seed_path(seed_path) {
        Ok(registry) => registry,
        Err(e) => {
            log::error!("Failed to load seed file '{}': {e}", seed_path.display());
            Registry::new()
        }
    }
}

/// Runs the API server until shutdown.
///
/// Reads `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`)
/// from the environment.
///
/// # Errors
///
/// * If the server fails to bind or run.
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let registry = Arc::new(load_registry());
    let (hospitals, camps, alerts, posts, events) = registry.collection_sizes();
    log::info!(
        "Registry loaded: {hospitals} hospitals, {camps} camps, {alerts} alerts, \
         {posts} posts, {events} events"
    );
    let state = AppState { registry };

    log::info!("Starting server on {addr}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind((addr.as_str(), port))?
    .run()
    .await
}
