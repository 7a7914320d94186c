//! Garden Guide Backend
//!
//! Plant guide lookup across a SQLite database, a local key-value cache and a
//! third-party species API, plus care reminders.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod reminders;
mod resolver;
mod species;
mod storage;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;
use resolver::PlantResolver;
use species::{HttpSpeciesClient, SpeciesClient};
use storage::{FileStore, KeyValueStore, LocalPlantCache, MemoryStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub cache: LocalPlantCache,
    pub resolver: PlantResolver,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_tracing(&config);

    tracing::info!("Starting Garden Guide Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Local store directory: {:?}", config.store_dir);
    tracing::info!("Species API: {}", config.species_api_url);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (GARDEN_API_PSK). Authentication is disabled!");
    }
    if config.species_api_key.is_none() {
        tracing::warn!(
            "No species API key configured (GARDEN_SPECIES_API_KEY). External lookups will fail"
        );
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let store: Arc<dyn KeyValueStore> = if config.uses_memory_store() {
        tracing::warn!("Local plant store is in memory; external guides will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(&config.store_dir))
    };
    let cache = LocalPlantCache::with_catalog(store);

    let species: Arc<dyn SpeciesClient> = Arc::new(HttpSpeciesClient::new(
        config.species_api_url.clone(),
        config.species_api_key.clone(),
    ));

    let resolver = PlantResolver::new(Some(repo.clone()), cache.clone(), species);

    let state = AppState {
        repo,
        cache,
        resolver,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global tracing subscriber.
fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let (json_layer, text_layer) = match config.log_format {
        LogFormat::Json => (Some(tracing_subscriber::fmt::layer().json()), None),
        LogFormat::Text => (None, Some(tracing_subscriber::fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Plants
        .route("/plants", get(api::resolve_plants))
        .route("/plants/{id}", get(api::get_plant))
        .route("/plants/guides/{name}", delete(api::delete_guide))
        // Reminders
        .route(
            "/reminders",
            get(api::list_reminders).post(api::create_reminder),
        )
        .route("/reminders/{id}", delete(api::delete_reminder))
        .route("/reminders/{id}/toggle", put(api::toggle_reminder))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
