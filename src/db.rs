//! SQLite connection pooling.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Turns on foreign key enforcement, which SQLite leaves off per connection.
#[derive(Debug, Clone, Copy)]
struct EnableForeignKeys;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for EnableForeignKeys {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build a connection pool for the SQLite database at `database_url`.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, diesel::r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(EnableForeignKeys))
        .build(manager)
}

#[cfg(feature = "server")]
pub use migrations::{MIGRATIONS, run_migrations};

#[cfg(feature = "server")]
mod migrations {
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    use super::DbPool;

    pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    /// Apply pending schema migrations, returning how many ran.
    pub fn run_migrations(
        pool: &DbPool,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let mut conn = pool.get()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        for version in &applied {
            log::info!("Applied migration {version}");
        }
        Ok(applied.len())
    }
}
