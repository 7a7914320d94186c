//! Plant resolver.
//!
//! Resolves a free-text query against the data tiers in a fixed order,
//! stopping at the first tier with results:
//!
//! 1. hosted database (substring search),
//! 2. local cache (exact name, then substring),
//! 3. species API (first candidate only).
//!
//! A plant found through the species API is written back to the hosted
//! database, or to the local cache when the database is missing or refuses
//! the write, so the next identical query stops at tier 1 or 2.
//!
//! Tiers run one after another. Failures in a tier read as "no results"; the
//! caller never sees an error from [`PlantResolver::resolve`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::models::{mint_id, Plant};
use crate::species::{map_species, SpeciesClient};
use crate::storage::LocalPlantCache;

/// Hosted plant database.
#[async_trait]
pub trait HostedPlants: Send + Sync {
    /// Plants whose name overlaps `query`, ordered by name.
    async fn search(&self, query: &str) -> Result<Vec<Plant>, AppError>;
    /// Every plant, ordered by name.
    async fn list_all(&self) -> Result<Vec<Plant>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Plant>, AppError>;
    /// Store `plant`, replacing any plant with the same name. Returns it as stored.
    async fn save(&self, plant: &Plant) -> Result<Plant, AppError>;
    async fn delete_by_name(&self, name: &str) -> Result<bool, AppError>;
}

/// The tier that produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hosted,
    Local,
    External,
    None,
}

/// User-facing notification attached to an external lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Outcome of [`PlantResolver::resolve`].
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub plants: Vec<Plant>,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl Resolution {
    fn from_tier(tier: Tier, plants: Vec<Plant>) -> Self {
        Self {
            plants,
            tier,
            notice: None,
        }
    }

    fn not_found(message: String) -> Self {
        Self {
            plants: Vec::new(),
            tier: Tier::None,
            notice: Some(Notice::Error(message)),
        }
    }
}

/// Tiered plant lookup with write-back.
#[derive(Clone)]
pub struct PlantResolver {
    hosted: Option<Arc<dyn HostedPlants>>,
    cache: LocalPlantCache,
    species: Arc<dyn SpeciesClient>,
}

impl PlantResolver {
    pub fn new(
        hosted: Option<Arc<dyn HostedPlants>>,
        cache: LocalPlantCache,
        species: Arc<dyn SpeciesClient>,
    ) -> Self {
        Self {
            hosted,
            cache,
            species,
        }
    }

    /// Resolve `query` into a list of plants.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> Resolution {
        let query = query.trim();

        if query.is_empty() {
            return self.list_everything().await;
        }

        let hosted = self.search_hosted(query).await;
        if !hosted.is_empty() {
            return Resolution::from_tier(Tier::Hosted, hosted);
        }

        let exact = self.cache.find_exact(query).await;
        if !exact.is_empty() {
            return Resolution::from_tier(Tier::Local, exact);
        }
        let containing = self.cache.find_containing(query).await;
        if !containing.is_empty() {
            return Resolution::from_tier(Tier::Local, containing);
        }

        tracing::debug!("No local match, asking the species API");
        self.fetch_external(query).await
    }

    /// Delete an externally sourced guide by name from every tier holding it.
    ///
    /// Curated guides cannot be deleted.
    pub async fn delete_guide(&self, name: &str) -> Result<(), AppError> {
        let name = name.trim();
        let plant = match self.find_guide(name).await? {
            Some(plant) => plant,
            None => return Err(AppError::NotFound(format!("Plant guide '{}' not found", name))),
        };

        if !plant.is_external {
            return Err(AppError::Validation(format!(
                "Plant guide '{}' is curated and cannot be deleted",
                plant.name
            )));
        }

        let removed_local = self.cache.remove(name).await?;
        let removed_hosted = match &self.hosted {
            Some(hosted) => hosted.delete_by_name(name).await?,
            None => false,
        };

        tracing::info!(
            "Deleted plant guide '{}' (local: {}, hosted: {})",
            plant.name,
            removed_local,
            removed_hosted
        );
        Ok(())
    }

    async fn find_guide(&self, name: &str) -> Result<Option<Plant>, AppError> {
        if let Some(hosted) = &self.hosted {
            if let Some(plant) = hosted.find_by_name(name).await? {
                return Ok(Some(plant));
            }
        }
        Ok(self.cache.find_exact(name).await.into_iter().next())
    }

    async fn list_everything(&self) -> Resolution {
        if let Some(hosted) = &self.hosted {
            match hosted.list_all().await {
                Ok(plants) if !plants.is_empty() => {
                    return Resolution::from_tier(Tier::Hosted, plants)
                }
                Ok(_) => tracing::debug!("Hosted plant list is empty, using local cache"),
                Err(e) => tracing::warn!("Hosted plant list unavailable: {}", e),
            }
        }
        Resolution::from_tier(Tier::Local, self.cache.all().await)
    }

    async fn search_hosted(&self, query: &str) -> Vec<Plant> {
        let Some(hosted) = &self.hosted else {
            return Vec::new();
        };
        match hosted.search(query).await {
            Ok(plants) => plants,
            Err(e) => {
                tracing::warn!("Hosted plant search failed, falling through: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_external(&self, query: &str) -> Resolution {
        let record = match self.species.lookup(query).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!("Species API has no match for '{}'", query);
                return Resolution::not_found(format!("No plant found for '{}'", query));
            }
            Err(e) => {
                tracing::error!("Species lookup for '{}' failed: {}", query, e);
                return Resolution::not_found(format!(
                    "Could not look up '{}' right now",
                    query
                ));
            }
        };

        let plant = map_species(&record, query, mint_id());
        let plant = self.write_back(plant).await;
        let notice = Notice::Success(format!("Found a care guide for {}", plant.name));

        Resolution {
            plants: vec![plant],
            tier: Tier::External,
            notice: Some(notice),
        }
    }

    /// Persist an externally fetched plant. Failures are logged; the plant is
    /// returned either way.
    async fn write_back(&self, plant: Plant) -> Plant {
        if let Some(hosted) = &self.hosted {
            match hosted.save(&plant).await {
                Ok(stored) => return stored,
                Err(e) => tracing::warn!(
                    "Hosted write-back of '{}' failed, using local cache: {}",
                    plant.name,
                    e
                ),
            }
        }

        if let Err(e) = self.cache.save(&plant).await {
            tracing::warn!("Local write-back of '{}' failed: {}", plant.name, e);
        }
        plant
    }
}
