//! Curated plant guides bundled with the service.

use once_cell::sync::Lazy;

use crate::models::{CareStep, Plant};
use crate::species::placeholder_image;

static BUNDLED: Lazy<Vec<Plant>> = Lazy::new(|| {
    vec![
        curated(
            -1,
            "Monstera Deliciosa",
            "Easy",
            "Bright indirect light",
            "Water when top 1-2 inches of soil are dry",
            "18 - 27",
            "A climbing aroid grown for its large, split leaves.",
            &[
                ("Support", "Give it a moss pole once the stems start to lean."),
                ("Clean", "Wipe the leaves monthly so they can take in light."),
            ],
        ),
        curated(
            -2,
            "Snake Plant",
            "Easy",
            "Low to bright indirect light",
            "Allow soil to dry out between waterings",
            "15 - 29",
            "Upright succulent leaves that tolerate neglect.",
            &[("Soil", "Use a fast-draining cactus mix.")],
        ),
        curated(
            -3,
            "Golden Pothos",
            "Easy",
            "Medium light",
            "Water when top 1-2 inches of soil are dry",
            "15 - 30",
            "A trailing vine that roots easily from cuttings.",
            &[("Propagate", "Root cuttings below a node in a glass of water.")],
        ),
        curated(
            -4,
            "Fiddle Leaf Fig",
            "Hard",
            "Bright indirect light",
            "Water when top 1-2 inches of soil are dry",
            "16 - 24",
            "A ficus with broad leaves that dislikes being moved.",
            &[
                ("Placement", "Keep it near a bright window and away from drafts."),
                ("Rotate", "Turn the pot a quarter turn every few weeks."),
            ],
        ),
        curated(
            -5,
            "Peace Lily",
            "Easy",
            "Shade",
            "Keep soil moist, water when top inch of soil is dry",
            "18 - 26",
            "Glossy leaves and white spathes; droops visibly when thirsty.",
            &[],
        ),
        curated(
            -6,
            "Aloe Vera",
            "Easy",
            "Full sun",
            "Rarely needs watering",
            "13 - 27",
            "A medicinal succulent with gel-filled leaves.",
            &[("Water", "Soak thoroughly, then let the soil dry completely.")],
        ),
        Plant {
            edible: Some(true),
            edible_parts: Some("Leaves".to_string()),
            grow_time: Some("3-4 weeks".to_string()),
            ..curated(
                -7,
                "Sweet Basil",
                "Easy",
                "Full sun",
                "Keep soil moist, water when top inch of soil is dry",
                "18 - 30",
                "A fast-growing culinary herb.",
                &[("Harvest", "Pinch the top pair of leaves to encourage branching.")],
            )
        },
        Plant {
            edible: Some(true),
            edible_parts: Some("Fruit".to_string()),
            grow_time: Some("60-85 days".to_string()),
            ..curated(
                -8,
                "Cherry Tomato",
                "Moderate",
                "Full sun",
                "Keep soil moist, water when top inch of soil is dry",
                "18 - 29",
                "Compact tomato vines with small, sweet fruit.",
                &[
                    ("Stake", "Tie the main stem to a stake as it grows."),
                    ("Feed", "Switch to a high-potassium feed once flowers appear."),
                ],
            )
        },
    ]
});

/// The curated guides shipped with the service.
///
/// Curated ids are negative so they never collide with database row ids or
/// minted ids, both of which are positive.
pub fn bundled_plants() -> Vec<Plant> {
    BUNDLED.clone()
}

#[allow(clippy::too_many_arguments)]
fn curated(
    id: i64,
    name: &str,
    difficulty: &str,
    light: &str,
    water: &str,
    temperature: &str,
    description: &str,
    steps: &[(&str, &str)],
) -> Plant {
    Plant {
        id,
        name: name.to_string(),
        image: placeholder_image(name),
        difficulty: difficulty.to_string(),
        light: light.to_string(),
        water: water.to_string(),
        temperature: temperature.to_string(),
        description: Some(description.to_string()),
        steps: steps
            .iter()
            .map(|(title, description)| CareStep {
                title: title.to_string(),
                description: description.to_string(),
            })
            .collect(),
        edible: None,
        edible_parts: None,
        grow_time: None,
        is_external: false,
    }
}
