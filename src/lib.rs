// blkcat store library entry point
// Config-directory stores at the top level, key-value preference state under `modules`.

pub mod error;
pub mod json_file;

// Config directory stores
pub mod agents_store;
pub mod config;
pub mod display_names_store;
pub mod views_store;

// Preference state
pub mod modules;
pub mod state;

pub use config::{ServerConfig, StoreConfig};
pub use display_names_store::{DisplayNames, DisplayNamesStore};
pub use error::{DiagnosticHook, Result, StoreError};
pub use views_store::{View, ViewsStore};
