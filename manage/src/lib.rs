//! SoConn management tool.
//!
//! Resolves the configuration profile, builds the application through the
//! bootstrap crate and dispatches one management command against it.
//!
//! # Modules
//!
//! - **cli**: command-line arguments
//! - **commands**: command implementations
//! - **database**: connection wrapper and migration runner
//! - **migrations**: the application's migration set
//! - **routes**: status endpoints served by `serve`
//!
//! # Usage
//!
//! ```bash
//! # Serve under the heroku profile
//! SOCONN_CONFIG=heroku manage serve
//!
//! # Apply pending migrations
//! manage db up
//!
//! # Inspect the resolved settings
//! manage --config prod config --json
//! ```

pub mod cli;
pub mod commands;
pub mod database;
pub mod migrations;
pub mod routes;
