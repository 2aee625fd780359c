//! Shared types and models for the Kariyad school weather station
//!
//! This crate contains types shared between the backend, the browser client
//! (via WASM), and any tooling that reads the station's data files.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
