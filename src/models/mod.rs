//! Data models for the Garden Guide backend.
//!
//! Plant and reminder records serialize in camelCase, matching the web client's shapes.

mod ids;
mod plant;
mod reminder;
mod species;

pub use ids::*;
pub use plant::*;
pub use reminder::*;
pub use species::*;

#[cfg(test)]
pub(crate) use plant::test_plant;
