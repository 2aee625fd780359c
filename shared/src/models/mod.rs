//! Domain models for the Kariyad weather station

mod api;
mod comparison;
mod weather;

pub use api::*;
pub use comparison::*;
pub use weather::*;
