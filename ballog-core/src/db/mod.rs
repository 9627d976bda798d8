pub mod models;
pub mod operations;
pub mod schema;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info};

use crate::error::AccountError;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(
            "PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
        )
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Build a connection pool for `database_url` (a file path or `:memory:`).
///
/// An in-memory database only lives as long as its connection, so it gets a
/// single connection that is never recycled.
pub fn establish_pool(database_url: &str) -> Result<DbPool, AccountError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = DbPool::builder().connection_customizer(Box::new(ConnectionPragmas));
    let builder = if database_url == IN_MEMORY_DATABASE {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(4)
    };
    let pool = builder.build(manager)?;
    debug!("Opened SQLite pool for {}", database_url);
    Ok(pool)
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), AccountError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| AccountError::Migration(e.to_string()))?;
    if applied.is_empty() {
        debug!("Database schema up to date");
    }
    for version in applied {
        info!("Applied migration {}", version);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::{Integer, Text};
    use diesel::{QueryableByName, RunQueryDsl, sql_query};

    #[derive(QueryableByName)]
    struct BusyTimeout {
        #[diesel(sql_type = Integer)]
        timeout: i32,
    }

    #[derive(QueryableByName)]
    struct JournalMode {
        #[diesel(sql_type = Text)]
        journal_mode: String,
    }

    #[test]
    fn pooled_file_connections_wait_and_use_wal() {
        let path = std::env::temp_dir().join(format!("ballog-{}.db", uuid::Uuid::new_v4()));
        let url = path.to_string_lossy().into_owned();
        {
            let pool = establish_pool(&url).unwrap();
            let mut conns: Vec<DbConn> = (0..4).map(|_| pool.get().unwrap()).collect();
            for conn in conns.iter_mut() {
                let busy = sql_query("PRAGMA busy_timeout")
                    .get_result::<BusyTimeout>(&mut **conn)
                    .unwrap();
                assert_eq!(busy.timeout, 5000);
                let mode = sql_query("PRAGMA journal_mode")
                    .get_result::<JournalMode>(&mut **conn)
                    .unwrap();
                assert_eq!(mode.journal_mode, "wal");
            }
        }
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", url, suffix));
        }
    }

    #[test]
    fn migrations_apply_once() {
        let pool = establish_pool(IN_MEMORY_DATABASE).unwrap();
        let mut conn = pool.get().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();
        assert!(operations::list_accounts(&mut conn).unwrap().is_empty());
    }
}
