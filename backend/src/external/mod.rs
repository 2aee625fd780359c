//! External service integrations

pub mod remote_table;

pub use remote_table::{RemoteError, RemoteTableClient, RemoteTableConfig};
