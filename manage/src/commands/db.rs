//! Db command - Database migration management.

use sea_orm_migration::MigratorTrait;

use common::AppResult;

use crate::cli::args::{DbAction, DbArgs};
use crate::database::Database;

/// Execute the db command with migrator `M` against `url`.
pub async fn execute<M: MigratorTrait>(args: DbArgs, url: &str) -> AppResult<()> {
    let db = Database::connect(url).await?;
    run::<M>(args.action, &db).await
}

pub async fn run<M: MigratorTrait>(action: DbAction, db: &Database) -> AppResult<()> {
    match action {
        DbAction::Up => {
            tracing::info!("Running pending migrations...");
            db.migrate_up::<M>().await?;
            tracing::info!("Migrations completed successfully");
        }
        DbAction::Down { steps } => {
            tracing::info!(steps, "Rolling back migrations...");
            db.migrate_down::<M>(steps).await?;
            tracing::info!("Rollback completed successfully");
        }
        DbAction::Status => {
            let status = db.migration_status::<M>().await?;
            if status.is_empty() {
                println!("No migrations defined");
            }
            for (name, applied) in status {
                let label = if applied { "applied" } else { "pending" };
                println!("{}: {}", name, label);
            }
        }
        DbAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations...");
            db.migrate_fresh::<M>().await?;
            tracing::info!("Fresh migrations completed successfully");
        }
    }

    Ok(())
}
