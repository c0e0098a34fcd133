//! # Database Handle
//!
//! Opens the fare database and owns the configuration write gate.
//!
//! ## Access Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  calculate / preview / listings          configuration mutations       │
//! │           │                                        │                    │
//! │           │ no gate                                │ lock_writes()      │
//! │           ▼                                        ▼                    │
//! │  ┌──────────────────────────────┐     ┌───────────────────────────┐    │
//! │  │ SqlitePool (WAL readers)     │◄────│ BEGIN ... COMMIT           │    │
//! │  │ max_connections, default 5   │     │ one mutation at a time     │    │
//! │  └──────────────────────────────┘     └───────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL keeps ride pricing readable while an admin transaction is open. The
//! busy timeout covers a second process writing to the same file.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::calculation::CalculationRepository;
use crate::repository::configuration::ConfigurationRepository;
use crate::repository::log::ConfigurationLogRepository;

const IN_MEMORY: &str = ":memory:";

/// How long a statement waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how the pool is sized.
///
/// ```rust,ignore
/// let config = DbConfig::new("./fare.db").max_connections(8);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first use; `:memory:` for a private database.
    pub path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// How long `acquire` waits for a free connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// `None` keeps idle connections open forever.
    pub idle_timeout: Option<Duration>,

    /// Apply pending migrations when opening. Default: true
    pub migrate: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            migrate: true,
        }
    }

    /// A private in-memory database, used by tests.
    ///
    /// SQLite gives every connection its own `:memory:` database, so the pool
    /// is pinned to one connection that never expires.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            migrate: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout);

        if self.is_in_memory() {
            // Dropping the only connection would drop the database with it
            options.max_lifetime(None::<Duration>)
        } else {
            options
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open fare database: pool, repositories and the write gate.
///
/// Clones share both the pool and the gate, so every [`crate::PricingService`]
/// built from one `Database` serializes its mutations against the others.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    write_gate: Arc<Mutex<()>>,
}

impl Database {
    /// Opens (or creates) the database and applies migrations unless
    /// [`DbConfig::run_migrations`] turned them off.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), "Opening fare database");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            in_memory = config.is_in_memory(),
            "Pool ready"
        );

        let db = Database {
            pool,
            write_gate: Arc::new(Mutex::new(())),
        };

        if config.migrate {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations; applied ones are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Waits for exclusive access to the configuration write path.
    ///
    /// Hold the guard across the whole transaction, commit included.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_gate.lock().await
    }

    /// Opens a `BEGIN IMMEDIATE` transaction for a configuration mutation.
    ///
    /// The write gate orders writers inside this process; the immediate
    /// transaction holds the database write lock against other processes
    /// from the first read onward.
    pub async fn begin_write(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub fn configurations(&self) -> ConfigurationRepository {
        ConfigurationRepository::new(self.pool.clone())
    }

    pub fn configuration_logs(&self) -> ConfigurationLogRepository {
        ConfigurationLogRepository::new(self.pool.clone())
    }

    pub fn calculations(&self) -> CalculationRepository {
        CalculationRepository::new(self.pool.clone())
    }

    /// Closes the pool. Later queries fail with `StorageUnavailable`.
    pub async fn close(&self) {
        debug!("Closing fare database");
        self.pool.close().await;
    }

    /// `true` while the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert!(total > 0);
        assert_eq!(total, applied);
        assert_eq!(db.configurations().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_write_gate_is_shared_by_clones() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clone = db.clone();

        let guard = db.lock_writes().await;
        assert!(clone.write_gate.try_lock().is_err());
        drop(guard);
        assert!(clone.write_gate.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_write_transaction_holds_the_database_lock() {
        let dir = std::env::temp_dir().join(format!("fare-lock-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fare.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let other = Database::new(DbConfig::new(&path).run_migrations(false))
            .await
            .unwrap();

        let tx = db.begin_write().await.unwrap();

        // A second handle on the same file waits for the first to commit
        let contender = tokio::spawn(async move {
            let tx = other.begin_write().await?;
            tx.rollback().await.map_err(DbError::from)?;
            Ok::<_, DbError>(other)
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!contender.is_finished());

        tx.commit().await.unwrap();
        let other = contender.await.unwrap().unwrap();

        db.close().await;
        other.close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/fare.db")
            .max_connections(10)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(1));
        assert!(!config.migrate);
        assert!(!config.is_in_memory());

        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
        assert!(memory.idle_timeout.is_none());
    }
}
