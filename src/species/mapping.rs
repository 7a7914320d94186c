//! Mapping from species API records into plant guides.

use crate::models::{HardinessBound, Plant, SpeciesRecord};

/// Difficulty used when the species carries no care level.
pub const DEFAULT_DIFFICULTY: &str = "Moderate";
/// Water requirement for an unknown or missing watering value.
pub const DEFAULT_WATER: &str = "Moderate watering";
/// Light requirement when no sunlight pattern matches.
pub const DEFAULT_LIGHT: &str = "Medium light";
/// Placeholder for a missing hardiness bound.
pub const UNKNOWN_BOUND: &str = "Unknown";

const PLACEHOLDER_IMAGE_URL: &str = "https://source.unsplash.com/featured/";

/// Watering values (lowercased) and the sentence each maps to.
const WATERING_TABLE: [(&str, &str); 4] = [
    ("frequent", "Keep soil moist, water when top inch of soil is dry"),
    ("average", "Water when top 1-2 inches of soil are dry"),
    ("minimum", "Allow soil to dry out between waterings"),
    ("none", "Rarely needs watering"),
];

/// Substrings looked for in the first sunlight value, in order. First hit wins.
const SUNLIGHT_PATTERNS: [(&str, &str); 3] = [
    ("full", "Full sun"),
    ("part", "Partial sun"),
    ("shade", "Shade"),
];

/// Map a species candidate into a plant guide flagged as external.
///
/// `query` stands in for a missing common name; `id` is the identifier the
/// new record is minted with.
pub fn map_species(record: &SpeciesRecord, query: &str, id: i64) -> Plant {
    let name = record
        .common_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(query)
        .to_string();

    let image = record
        .default_image
        .as_ref()
        .and_then(|img| img.medium_url.clone().or_else(|| img.regular_url.clone()))
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| placeholder_image(&name));

    let difficulty = record
        .care_level
        .clone()
        .filter(|level| !level.is_empty())
        .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string());

    let temperature = {
        let hardiness = record.hardiness.as_ref();
        format!(
            "{} - {}",
            bound_label(hardiness.and_then(|h| h.min.as_ref())),
            bound_label(hardiness.and_then(|h| h.max.as_ref()))
        )
    };

    Plant {
        id,
        name,
        image,
        difficulty,
        light: light_requirement(record.sunlight.as_deref()).to_string(),
        water: water_requirement(record.watering.as_deref()).to_string(),
        temperature,
        description: None,
        steps: Vec::new(),
        edible: None,
        edible_parts: None,
        grow_time: None,
        is_external: true,
    }
}

/// Look up the watering sentence for an upstream watering value.
pub fn water_requirement(watering: Option<&str>) -> &'static str {
    let Some(watering) = watering else {
        return DEFAULT_WATER;
    };
    let watering = watering.trim().to_lowercase();
    WATERING_TABLE
        .iter()
        .find(|(key, _)| *key == watering)
        .map(|(_, sentence)| *sentence)
        .unwrap_or(DEFAULT_WATER)
}

/// Classify the first sunlight value into a light requirement.
pub fn light_requirement(sunlight: Option<&[String]>) -> &'static str {
    let Some(first) = sunlight.and_then(|s| s.first()) else {
        return DEFAULT_LIGHT;
    };
    let first = first.to_lowercase();
    SUNLIGHT_PATTERNS
        .iter()
        .find(|(pattern, _)| first.contains(pattern))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_LIGHT)
}

fn bound_label(bound: Option<&HardinessBound>) -> String {
    match bound {
        Some(HardinessBound::Text(s)) if s.trim().is_empty() => UNKNOWN_BOUND.to_string(),
        Some(bound) => bound.to_string(),
        None => UNKNOWN_BOUND.to_string(),
    }
}

/// Image search URL used when a guide has no picture of its own.
pub fn placeholder_image(name: &str) -> String {
    let keywords = format!("{},plant", name);
    reqwest::Url::parse_with_params(PLACEHOLDER_IMAGE_URL, &[("q", keywords.as_str())])
        .map(String::from)
        .unwrap_or_else(|_| PLACEHOLDER_IMAGE_URL.to_string())
}
