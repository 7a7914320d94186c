//! Local cache tier: bundled guides merged with externally sourced ones.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::Plant;

use super::{bundled_plants, KeyValueStore};

/// Key holding the JSON array of externally sourced plants.
pub const EXTERNAL_PLANTS_KEY: &str = "external_plants";

/// Plant lookups over the bundled catalog and the persisted external guides.
///
/// At most one persisted record exists per case-insensitive name; writes
/// replace in place or append. Read-modify-write cycles are serialized per
/// cache, so two saves of the same name leave the later one.
#[derive(Clone)]
pub struct LocalPlantCache {
    store: Arc<dyn KeyValueStore>,
    bundled: Arc<Vec<Plant>>,
    write_lock: Arc<Mutex<()>>,
}

impl LocalPlantCache {
    pub fn new(store: Arc<dyn KeyValueStore>, bundled: Vec<Plant>) -> Self {
        Self {
            store,
            bundled: Arc::new(bundled),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Cache over `store` seeded with the bundled catalog.
    pub fn with_catalog(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, bundled_plants())
    }

    /// Externally sourced plants persisted in the store.
    ///
    /// A value that no longer parses is logged and read as empty.
    pub async fn persisted(&self) -> Result<Vec<Plant>, AppError> {
        let Some(raw) = self.store.get(EXTERNAL_PLANTS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(plants) => Ok(plants),
            Err(e) => {
                tracing::warn!("Discarding unreadable local plant store: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Bundled plants merged with persisted ones.
    ///
    /// A persisted plant takes the place of a bundled one with the same name.
    /// Store failures are logged and leave only the bundled list.
    pub async fn all(&self) -> Vec<Plant> {
        let persisted = self.persisted().await.unwrap_or_else(|e| {
            tracing::warn!("Local plant store unavailable: {}", e);
            Vec::new()
        });

        let mut merged: Vec<Plant> = self.bundled.as_ref().clone();
        for plant in persisted {
            upsert_by_name(&mut merged, plant);
        }
        merged
    }

    /// Plants whose name equals `query`, ignoring case.
    pub async fn find_exact(&self, query: &str) -> Vec<Plant> {
        self.all()
            .await
            .into_iter()
            .filter(|p| p.has_name(query))
            .collect()
    }

    /// Plants whose name contains `query`, or is contained in it, ignoring case.
    pub async fn find_containing(&self, query: &str) -> Vec<Plant> {
        let query = query.to_lowercase();
        self.all()
            .await
            .into_iter()
            .filter(|p| p.overlaps(&query))
            .collect()
    }

    /// Persist `plant`, replacing any stored plant with the same name.
    pub async fn save(&self, plant: &Plant) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut plants = self.persisted().await?;
        upsert_by_name(&mut plants, plant.clone());
        self.write(&plants).await
    }

    /// Drop the persisted plant named `name`. Returns whether one was removed.
    pub async fn remove(&self, name: &str) -> Result<bool, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut plants = self.persisted().await?;
        let before = plants.len();
        plants.retain(|p| !p.has_name(name));
        if plants.len() == before {
            return Ok(false);
        }
        self.write(&plants).await?;
        Ok(true)
    }

    async fn write(&self, plants: &[Plant]) -> Result<(), AppError> {
        let raw = serde_json::to_string(plants)?;
        self.store.set(EXTERNAL_PLANTS_KEY, &raw).await
    }
}

fn upsert_by_name(plants: &mut Vec<Plant>, plant: Plant) {
    match plants.iter_mut().find(|p| p.has_name(&plant.name)) {
        Some(existing) => *existing = plant,
        None => plants.push(plant),
    }
}
