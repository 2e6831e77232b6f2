use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use thiserror::Error;

use crate::models::{AttendanceRecord, AttendanceRow, AttendanceStatus, InvalidStatus};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_ATTENDANCE_TABLE: &str = "CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_name TEXT NOT NULL,
    timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
    status TEXT DEFAULT 'Absent'
)";

const SELECT_RECORD: &str = "SELECT id, student_name, timestamp, status FROM attendance";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Owns the single `attendance` table. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct AttendanceStore {
    pool: SqlitePool,
}

impl AttendanceStore {
    /// Opens (creating if missing) the database file at `path`.
    pub async fn connect<P: AsRef<Path>>(path: P, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        log::info!("Connected to SQLite database at {}", path.as_ref().display());
        Ok(Self { pool })
    }

    /// A private in-memory database. Pinned to one connection, since every
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Waits for in-flight statements, then refuses new ones.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Creates the table if absent and adds `status` to tables that predate it.
    /// Safe to run any number of times.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(CREATE_ATTENDANCE_TABLE)
            .execute(&self.pool)
            .await?;

        if self.has_column("status").await? {
            log::debug!("`attendance.status` already present, nothing to migrate");
            return Ok(());
        }

        sqlx::query("ALTER TABLE attendance ADD COLUMN status TEXT DEFAULT 'Absent'")
            .execute(&self.pool)
            .await?;
        log::info!("Added `status` column to `attendance`");
        Ok(())
    }

    async fn has_column(&self, name: &str) -> StoreResult<bool> {
        let columns = sqlx::query("PRAGMA table_info(attendance)")
            .fetch_all(&self.pool)
            .await?;
        for column in columns {
            let column_name: String = column.try_get("name")?;
            if column_name == name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Appends a record for `student_name` (trimmed) with status Absent and returns its id.
    pub async fn create(&self, student_name: &str) -> StoreResult<i64> {
        let name = student_name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "student name must not be empty".to_string(),
            ));
        }

        let result = sqlx::query(
            "INSERT INTO attendance (student_name, timestamp, status) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(Utc::now())
        .bind(AttendanceStatus::default().as_str())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        log::debug!("Recorded attendance #{} for `{}`", id, name);
        Ok(id)
    }

    /// Replaces the status of record `id`. Never inserts.
    pub async fn update_status(
        &self,
        id: i64,
        status: AttendanceStatus,
    ) -> StoreResult<UpdateOutcome> {
        let result = sqlx::query("UPDATE attendance SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            log::debug!("No attendance record #{} to update", id);
            return Ok(UpdateOutcome::NotFound);
        }
        log::debug!("Attendance #{} is now {}", id, status);
        Ok(UpdateOutcome::Updated)
    }

    /// Every record, ascending by id.
    pub async fn list_all(&self) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!("{} ORDER BY id ASC", SELECT_RECORD);
        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    pub async fn get(&self, id: i64) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!("{} WHERE id = ? LIMIT 1", SELECT_RECORD);
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AttendanceRecord::from))
    }
}

/// Rows written before status was validated may hold any text (or NULL);
/// those read as Absent so one stray row can't break the listing.
impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        let status = match row.status.as_deref() {
            None => AttendanceStatus::default(),
            Some(raw) => raw.parse().unwrap_or_else(|err: InvalidStatus| {
                log::warn!("Attendance #{} has {}, reading it as Absent", row.id, err);
                AttendanceStatus::default()
            }),
        };
        AttendanceRecord {
            id: row.id,
            student_name: row.student_name,
            timestamp: row.timestamp,
            status,
        }
    }
}
