//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions, named
//! `m{YYYYMMDD}_{NNNNNN}_{description}`. The schema itself belongs to the
//! application crate; this set starts empty.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        Vec::new()
    }
}
