//! Plant guide API endpoints.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResponse, ApiResult};
use crate::errors::AppError;
use crate::models::Plant;
use crate::resolver::Resolution;
use crate::AppState;

/// Plant lookup query parameters.
#[derive(Debug, Deserialize)]
pub struct PlantQuery {
    /// Free-text plant name; empty or missing lists every plant.
    #[serde(default)]
    pub q: String,
}

/// GET /api/plants - Resolve a plant query through the data tiers.
pub async fn resolve_plants(
    State(state): State<AppState>,
    Query(params): Query<PlantQuery>,
) -> ApiResult<Resolution> {
    let resolution = state.resolver.resolve(&params.q).await;
    tracing::info!(
        "Resolved '{}' to {} plants via {:?}",
        params.q,
        resolution.plants.len(),
        resolution.tier
    );
    success(resolution)
}

/// GET /api/plants/{id} - Get a single plant guide.
///
/// Looks in the hosted database first, then the local cache.
pub async fn get_plant(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Plant> {
    if let Some(plant) = state.repo.get_plant(id).await? {
        return success(plant);
    }

    state
        .cache
        .all()
        .await
        .into_iter()
        .find(|p| p.id == id)
        .map(ApiResponse::new)
        .ok_or_else(|| AppError::NotFound(format!("Plant {} not found", id)))
}

/// DELETE /api/plants/guides/{name} - Delete an externally sourced guide.
pub async fn delete_guide(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<()> {
    state.resolver.delete_guide(&name).await?;
    success(())
}
