//! Helpers for integration tests.

use catalogo::db::{DbPool, MIGRATIONS, establish_connection_pool};
use catalogo::repository::{DieselContext, UnitOfWork};
use diesel_migrations::MigrationHarness;
use tempfile::NamedTempFile;

/// Temporary, migrated and seeded database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Fresh unit of work over its own pooled connection.
    #[allow(dead_code)]
    pub fn unit_of_work(&self) -> UnitOfWork<DieselContext> {
        let context = DieselContext::from_pool(&self.pool).expect("Failed to check out connection");
        UnitOfWork::new(context)
    }
}
