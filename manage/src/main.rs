//! SoConn management entry point.
//!
//! Loads `.env`, resolves the configuration profile, builds the application
//! and dispatches the requested command.

use std::sync::Arc;

use axum::Router;
use clap::Parser;

use bootstrap::{create_app, dotenv, logging, Application, EnvVars, Profile, Registry};
use common::{AppResult, DOTENV_FILE};

use manage::{
    cli::{Cli, Commands},
    commands,
    migrations::Migrator,
};

#[tokio::main]
async fn main() {
    // Before parsing, so `.env` can supply SOCONN_CONFIG
    let dotenv = dotenv::load(DOTENV_FILE);

    let cli = Cli::parse();
    let filter = logging::console_filter(cli.verbose);

    let (profile, app) = match bootstrap(&cli).await {
        Ok(ready) => ready,
        Err(e) => {
            let _ = logging::install(&filter, &[]);
            tracing::error!(code = e.code(), "Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::install(&filter, app.log_handlers()) {
        eprintln!("Failed to install logging: {}", e);
        std::process::exit(1);
    }

    match dotenv {
        Ok(Some(report)) => tracing::info!(
            path = %report.path.display(),
            imported = report.entries.len(),
            skipped = report.skipped,
            "Imported environment from .env"
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env: {}", e),
    }

    tracing::debug!(
        environment = app.environment(),
        handlers = app.log_handlers().len(),
        "Configuration loaded"
    );

    // Execute command
    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, app).await,
        Commands::Db(args) => {
            commands::db::execute::<Migrator>(args, &app.settings().database.url).await
        }
        Commands::Shell => commands::shell::execute(app, &profile).await,
        Commands::Config(args) => commands::config::execute(args, &app),
        Commands::Test(args) => commands::test::execute(args).await,
    };

    // Handle errors
    if let Err(e) = result {
        tracing::error!(code = e.code(), "Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the selected profile and build the application for it.
async fn bootstrap(cli: &Cli) -> AppResult<(Arc<Profile>, Application)> {
    let env = EnvVars::from_process();
    let base_dir = std::env::current_dir()?;
    let registry = Registry::standard(&env, &base_dir)?;
    let profile = registry.select(cli.config.as_deref())?;

    let app = match cli.command {
        Commands::Serve(_) => commands::serve::build(&profile).await?,
        _ => create_app(&profile, Router::new())?,
    };

    Ok((profile, app))
}
