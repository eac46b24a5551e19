//! Command implementations, one module per command.

pub mod config;
pub mod db;
pub mod serve;
pub mod shell;
pub mod test;
