//! Command-line interface.
//!
//! - `serve` - run the HTTP server
//! - `db` - database migrations
//! - `shell` - interactive application shell
//! - `config` - print resolved settings
//! - `test` - run the workspace test suite

pub mod args;

pub use args::{Cli, Commands};
