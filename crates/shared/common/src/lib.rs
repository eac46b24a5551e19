//! Common types shared across the SoConn workspace.
//!
//! This crate provides:
//! - Unified error handling for bootstrap and management commands
//! - The flat, typed settings record and its override layer
//! - Centralized configuration constants

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult};
