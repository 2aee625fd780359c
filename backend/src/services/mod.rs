//! Business logic services for the Kariyad weather station

pub mod auth;
pub mod dashboard;
pub mod export;

pub use auth::AuthService;
pub use dashboard::today_summary;
pub use export::{ExportFile, ExportService};
