//! Recipe store implementations.

pub mod memory;
