//! SoConn bootstrap library.
//!
//! Resolves the deployment profile an application runs under and applies
//! its initialization chain.
//!
//! # Layers
//!
//! - **env / dotenv**: environment snapshots and `.env` loading
//! - **profile / registry**: statically declared profiles and name lookup
//! - **initializer**: ordered init steps applied to an application
//! - **app**: the application handle contract and its axum implementation
//! - **handlers / logging**: log sinks and the `tracing` subscriber
//! - **middleware**: proxy header normalization and HTTPS enforcement

pub mod app;
pub mod dotenv;
pub mod env;
pub mod handlers;
pub mod initializer;
pub mod logging;
pub mod middleware;
pub mod profile;
pub mod registry;

pub use app::{create_app, Application, ApplicationHandle, EntryPointLayer};
pub use env::EnvVars;
pub use handlers::{LogHandler, LogSink};
pub use initializer::initialize;
pub use profile::{InitStep, Profile};
pub use registry::{Registry, RegistryBuilder};
