//! Care reminder model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of care task a reminder is for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Water,
    Fertilize,
    Prune,
    Repot,
    Mist,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Water => "water",
            TaskKind::Fertilize => "fertilize",
            TaskKind::Prune => "prune",
            TaskKind::Repot => "repot",
            TaskKind::Mist => "mist",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "water" => Some(TaskKind::Water),
            "fertilize" => Some(TaskKind::Fertilize),
            "prune" => Some(TaskKind::Prune),
            "repot" => Some(TaskKind::Repot),
            "mist" => Some(TaskKind::Mist),
            _ => None,
        }
    }
}

/// A care reminder for one plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub plant_id: i64,
    /// Plant name at the time the reminder was created
    pub plant_name: String,
    pub task: TaskKind,
    /// Frequency label as submitted
    pub frequency: String,
    pub enabled: bool,
    pub next_due: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a reminder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderRequest {
    pub plant_id: i64,
    pub plant_name: String,
    pub task: TaskKind,
    pub frequency: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_enabled() -> bool {
    true
}
