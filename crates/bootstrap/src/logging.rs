//! Subscriber installation.
//!
//! The console layer follows `RUST_LOG`; every attached handler adds its
//! own layer with its own level filter.

use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use common::{AppError, AppResult};

use crate::handlers::LogHandler;

/// Console filter directive: `debug` when verbose, else `RUST_LOG` or `info`.
pub fn console_filter(verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

/// Install the global subscriber: console output plus one layer per handler.
pub fn install(filter: &str, handlers: &[LogHandler]) -> AppResult<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> =
        Vec::with_capacity(handlers.len() + 1);

    layers.push(
        tracing_subscriber::fmt::layer()
            .with_filter(EnvFilter::new(filter))
            .boxed(),
    );
    layers.extend(handlers.iter().map(|handler| handler.layer()));

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
