//! Care reminder scheduling.
//!
//! The next due date is computed once, when a reminder is created. Nothing
//! advances it after it passes.

use chrono::{DateTime, Duration, Months, Utc};

/// How often a care task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    /// Parse a frequency label, ignoring case.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "biweekly" => Some(Frequency::Biweekly),
            "monthly" => Some(Frequency::Monthly),
            _ => None,
        }
    }

    /// The instant one period after `from`.
    pub fn advance(self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Frequency::Daily => from + Duration::days(1),
            Frequency::Weekly => from + Duration::days(7),
            Frequency::Biweekly => from + Duration::days(14),
            // Clamps to the last day of a shorter month; falls back to `from`
            // only at the edge of the representable range.
            Frequency::Monthly => from.checked_add_months(Months::new(1)).unwrap_or(from),
        }
    }
}

/// Next due date for a reminder with the given frequency label.
///
/// An unrecognized label yields `now` unchanged.
pub fn next_due_date(frequency: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match Frequency::parse(frequency) {
        Some(freq) => freq.advance(now),
        None => now,
    }
}
