//! jadwal is a small table-operations service: append, join and fuzzy
//! cluster matching over JSON record tables, exposed over HTTP and as a CLI.

// Module declarations
pub mod error;
pub mod types;
pub mod table;
pub mod matcher;
pub mod service;
pub mod server;
pub mod utils;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::CellValue;
pub use table::{Column, Table};
pub use matcher::{ClusterOptions, ClusteringMatcher};
pub use service::{Operation, TableService};
pub use server::ApiServer;

// Re-export the config from config module
pub use config::JadwalConfig;
