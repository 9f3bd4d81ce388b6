use crate::pending::{PendingAction, PendingActionStore, PendingKey};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

struct Migration {
    version: i64,
    description: &'static str,
    sql: &'static str,
}

/// Schema changes, applied in order. Never edit an entry once released.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create pending_actions",
        sql: "CREATE TABLE pending_actions (
                user_id INTEGER NOT NULL,
                chat_id INTEGER NOT NULL,
                action TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, chat_id)
            )",
    },
];

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and apply pending migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Database path is set to {}", path.display());
        let conn = Connection::open(path)
            .context(format!("Failed to open database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Private in-memory database with the full schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    /// Apply every migration newer than the recorded schema version.
    /// Returns how many were applied.
    pub fn run_migrations(&self) -> Result<usize> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create schema_version table")?;

        let current = Self::current_version(&conn)?;
        let mut applied = 0;
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            info!(
                version = migration.version,
                "Running pending migration: {}", migration.description
            );
            Self::apply_migration(&conn, migration)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Highest applied migration, 0 for a fresh database.
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.lock()?;
        Self::current_version(&conn)
    }

    fn current_version(conn: &Connection) -> Result<i64> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .context("Failed to read schema version")
    }

    fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
        conn.execute("BEGIN TRANSACTION", [])?;

        match Self::apply_migration_inner(conn, migration) {
            Ok(_) => {
                conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(e) => {
                conn.execute("ROLLBACK", [])?;
                Err(e).context(format!(
                    "Migration {} failed and was rolled back",
                    migration.version
                ))
            }
        }
    }

    fn apply_migration_inner(conn: &Connection, migration: &Migration) -> Result<()> {
        conn.execute_batch(migration.sql)
            .context(format!("Failed to apply '{}'", migration.description))?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
            params![migration.version, Utc::now().to_rfc3339()],
        )
        .context("Failed to record schema version")?;
        Ok(())
    }

    fn lookup_locked(conn: &Connection, key: PendingKey) -> Result<Option<PendingAction>> {
        let code: Option<String> = conn
            .query_row(
                "SELECT action FROM pending_actions WHERE user_id = ?1 AND chat_id = ?2",
                params![key.user_id, key.chat_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to load pending action")?;

        code.map(|code| code.parse()).transpose()
    }
}

impl PendingActionStore for Database {
    fn lookup(&self, key: PendingKey) -> Result<Option<PendingAction>> {
        let conn = self.lock()?;
        Self::lookup_locked(&conn, key)
    }

    fn set(&self, key: PendingKey, action: PendingAction) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO pending_actions (user_id, chat_id, action, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, chat_id) DO UPDATE
             SET action = excluded.action, updated_at = excluded.updated_at",
            params![key.user_id, key.chat_id, action.code(), Utc::now().to_rfc3339()],
        )
        .context("Failed to save pending action")?;
        Ok(())
    }

    fn clear(&self, key: PendingKey) -> Result<Option<PendingAction>> {
        let conn = self.lock()?;
        let previous = Self::lookup_locked(&conn, key)?;
        conn.execute(
            "DELETE FROM pending_actions WHERE user_id = ?1 AND chat_id = ?2",
            params![key.user_id, key.chat_id],
        )
        .context("Failed to clear pending action")?;
        Ok(previous)
    }
}
