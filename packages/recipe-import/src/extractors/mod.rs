//! Recipe extractor implementations.

pub mod http;
