//! Database connection and migration runner.

use std::collections::HashSet;

use sea_orm::{
    ConnectionTrait, Database as SeaDatabase, DatabaseConnection, EntityTrait, QueryOrder,
    Statement,
};
use sea_orm_migration::{seaql_migrations, MigratorTrait};

use common::AppResult;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connect to `url` without touching the schema.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let connection = SeaDatabase::connect(url).await?;
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Run pending migrations.
    pub async fn migrate_up<M: MigratorTrait>(&self) -> AppResult<()> {
        M::up(&self.connection, None).await?;
        Ok(())
    }

    /// Roll back the last `steps` migrations.
    pub async fn migrate_down<M: MigratorTrait>(&self, steps: u32) -> AppResult<()> {
        M::down(&self.connection, Some(steps)).await?;
        Ok(())
    }

    /// Every defined migration with its applied status.
    pub async fn migration_status<M: MigratorTrait>(&self) -> AppResult<Vec<(String, bool)>> {
        M::install(&self.connection).await?;

        let applied: HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        Ok(M::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect())
    }

    /// Drop all tables and re-run every migration.
    pub async fn migrate_fresh<M: MigratorTrait>(&self) -> AppResult<()> {
        M::fresh(&self.connection).await?;
        Ok(())
    }

    /// Check connectivity with a trivial query.
    pub async fn ping(&self) -> AppResult<()> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::Migrator;

    #[tokio::test]
    async fn test_memory_database_round() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.ping().await.unwrap();

        db.migrate_up::<Migrator>().await.unwrap();
        let status = db.migration_status::<Migrator>().await.unwrap();
        assert!(status.is_empty());
    }

    #[tokio::test]
    async fn test_bad_url_is_an_error() {
        let err = Database::connect("nosuchdriver://nowhere").await.err().unwrap();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
