//! Response shapes of the third-party species lookup service.
//!
//! Every field is optional upstream; mapping into [`super::Plant`] happens in
//! `species::map_species`.

use serde::Deserialize;

/// Top-level search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeciesSearchResponse {
    #[serde(default)]
    pub data: Vec<SpeciesRecord>,
}

/// One species candidate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpeciesRecord {
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub default_image: Option<SpeciesImage>,
    #[serde(default)]
    pub care_level: Option<String>,
    #[serde(default)]
    pub watering: Option<String>,
    #[serde(default)]
    pub sunlight: Option<Vec<String>>,
    #[serde(default)]
    pub hardiness: Option<Hardiness>,
}

/// Image variants of a species.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SpeciesImage {
    #[serde(default)]
    pub medium_url: Option<String>,
    #[serde(default)]
    pub regular_url: Option<String>,
}

/// Hardiness zone bounds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Hardiness {
    #[serde(default)]
    pub min: Option<HardinessBound>,
    #[serde(default)]
    pub max: Option<HardinessBound>,
}

/// A hardiness bound, sent either as a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HardinessBound {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for HardinessBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardinessBound::Number(n) => write!(f, "{}", n),
            HardinessBound::Text(s) => f.write_str(s),
        }
    }
}
