//! Data model for import jobs and extracted recipes.

pub mod job;
pub mod partial;
pub mod recipe;
pub mod session;
