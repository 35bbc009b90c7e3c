//! Trait boundaries for the orchestrator's external collaborators.

pub mod extractor;
pub mod store;
