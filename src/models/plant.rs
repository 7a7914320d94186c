//! Plant record, the unit of resolution.

use serde::{Deserialize, Serialize};

/// One step of a plant's care guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareStep {
    pub title: String,
    pub description: String,
}

/// A plant care guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub difficulty: String,
    pub light: String,
    pub water: String,
    pub temperature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<CareStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edible_parts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grow_time: Option<String>,
    /// Provenance flag: sourced from the species API rather than curated data
    #[serde(default)]
    pub is_external: bool,
}

impl Plant {
    /// Case-insensitive full equality on the name.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    /// Case-insensitive unanchored substring match in either direction.
    ///
    /// `query` must already be lowercased.
    pub fn overlaps(&self, query: &str) -> bool {
        let name = self.name.to_lowercase();
        if name.is_empty() {
            return false;
        }
        name.contains(query) || query.contains(&name)
    }
}

#[cfg(test)]
pub(crate) fn test_plant(id: i64, name: &str) -> Plant {
    Plant {
        id,
        name: name.to_string(),
        image: String::new(),
        difficulty: "Easy".to_string(),
        light: "Medium light".to_string(),
        water: "Moderate watering".to_string(),
        temperature: "18 - 27".to_string(),
        description: None,
        steps: Vec::new(),
        edible: None,
        edible_parts: None,
        grow_time: None,
        is_external: false,
    }
}
