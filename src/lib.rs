//! Core library surface for the library catalog and lending tracker.
//!
//! The binary only glues these pieces together: resolve the data directory,
//! start logging, open the SQLite store, and hand it to the terminal UI.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

pub(crate) mod validation;

/// Everything `main.rs` needs to bring the application up.
pub use config::Config;
pub use db::{initialize, open_store};
pub use error::ValidationError;
pub use logging::init_logging;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
