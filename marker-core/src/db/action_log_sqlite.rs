//! The durable action log (`spec.md` §4.B), backed by a local sqlite file
//! the service owns outright — unlike the foreign library database, this
//! schema is ours, so its migrations ship in `marker-core/migrations` and
//! run automatically via `sqlx::migrate!` at startup, the same way
//! `ferrex-core`'s own sqlite-backed side stores bootstrap their schema.

use async_trait::async_trait;
use marker_contracts::error::{PortError, Result};
use marker_contracts::{ActionLogStore, NewActionLogEntry};
use marker_model::{ActionLogEntry, ActionOp, ActionOpId, MarkerId, MarkerType, MediaItemId, RestoreKey, SectionId};
use sqlx::{sqlite::SqlitePoolOptions, FromRow, SqlitePool};

fn backend_err(context: &str, err: sqlx::Error) -> PortError {
    PortError::Backend(format!("{context}: {err}"))
}

#[derive(Debug, Clone)]
pub struct SqliteActionLogStore {
    pool: SqlitePool,
}

impl SqliteActionLogStore {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await
            .map_err(|e| backend_err("connect action log", e))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| PortError::Backend(format!("run action log migrations: {e}")))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn op_to_str(op: ActionOp) -> &'static str {
    op.as_str()
}

fn op_from_str(s: &str) -> Result<ActionOp> {
    match s {
        "add" => Ok(ActionOp::Add),
        "edit" => Ok(ActionOp::Edit),
        "delete" => Ok(ActionOp::Delete),
        "restore" => Ok(ActionOp::Restore),
        "ignore" => Ok(ActionOp::Ignore),
        other => Err(PortError::Backend(format!("unknown action op '{other}' in action log"))),
    }
}

fn marker_type_to_str(t: MarkerType) -> &'static str {
    t.as_str()
}

fn marker_type_from_str(s: &str) -> Result<MarkerType> {
    MarkerType::parse(s).ok_or_else(|| PortError::Backend(format!("unknown marker type '{s}' in action log")))
}

#[derive(FromRow)]
struct ActionLogRow {
    op_id: i64,
    op: String,
    restore_key: String,
    restore_seq: i64,
    marker_id: i64,
    parent_id: i64,
    section_id: i64,
    start_ms: i64,
    end_ms: i64,
    marker_type: String,
    is_final: bool,
    old_start_ms: Option<i64>,
    old_end_ms: Option<i64>,
    ignored: bool,
    at: chrono::DateTime<chrono::Utc>,
}

impl ActionLogRow {
    fn into_entry(self) -> Result<ActionLogEntry> {
        Ok(ActionLogEntry {
            op_id: ActionOpId(self.op_id),
            op: op_from_str(&self.op)?,
            restore_key: RestoreKey(
                uuid::Uuid::parse_str(&self.restore_key)
                    .map_err(|e| PortError::Backend(format!("invalid restore_key uuid: {e}")))?,
            ),
            restore_seq: self.restore_seq,
            marker_id: MarkerId(self.marker_id),
            parent_id: MediaItemId(self.parent_id),
            section_id: SectionId(self.section_id),
            start: self.start_ms,
            end: self.end_ms,
            marker_type: marker_type_from_str(&self.marker_type)?,
            is_final: self.is_final,
            old_start: self.old_start_ms,
            old_end: self.old_end_ms,
            ignored: self.ignored,
            at: self.at,
        })
    }
}

#[async_trait]
impl ActionLogStore for SqliteActionLogStore {
    async fn append(&self, entry: NewActionLogEntry) -> Result<ActionLogEntry> {
        let restore_key = entry.restore_key.0.to_string();
        let mut tx = self.pool.begin().await.map_err(|e| backend_err("begin action log transaction", e))?;

        // Mint this entry's position in its restore key's history from the
        // `restore_key_seq` generator (`spec.md` §6), upserting the row on
        // first use.
        sqlx::query(
            "INSERT INTO restore_key_seq (restore_key, next_seq) VALUES (?1, 0) \
             ON CONFLICT(restore_key) DO UPDATE SET next_seq = next_seq + 1",
        )
        .bind(&restore_key)
        .execute(&mut *tx)
        .await
        .map_err(|e| backend_err("advance restore_key_seq", e))?;

        let restore_seq: i64 = sqlx::query_scalar("SELECT next_seq FROM restore_key_seq WHERE restore_key = ?1")
            .bind(&restore_key)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| backend_err("read restore_key_seq", e))?;

        let row: ActionLogRow = sqlx::query_as(
            "INSERT INTO action_log \
                (op, restore_key, restore_seq, marker_id, parent_id, section_id, start_ms, end_ms, marker_type, is_final, old_start_ms, old_end_ms, ignored, at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, datetime('now')) \
             RETURNING op_id, op, restore_key, restore_seq, marker_id, parent_id, section_id, start_ms, end_ms, marker_type, is_final, old_start_ms, old_end_ms, ignored, at",
        )
        .bind(op_to_str(entry.op))
        .bind(&restore_key)
        .bind(restore_seq)
        .bind(entry.marker_id.get())
        .bind(entry.parent_id.get())
        .bind(entry.section_id.0)
        .bind(entry.start)
        .bind(entry.end)
        .bind(marker_type_to_str(entry.marker_type))
        .bind(entry.is_final)
        .bind(entry.old_start)
        .bind(entry.old_end)
        .bind(entry.ignored)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| backend_err("append action log entry", e))?;

        tx.commit().await.map_err(|e| backend_err("commit action log transaction", e))?;
        row.into_entry()
    }

    async fn all_entries(&self) -> Result<Vec<ActionLogEntry>> {
        let rows: Vec<ActionLogRow> = sqlx::query_as(
            "SELECT op_id, op, restore_key, restore_seq, marker_id, parent_id, section_id, start_ms, end_ms, marker_type, is_final, old_start_ms, old_end_ms, ignored, at \
             FROM action_log ORDER BY op_id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend_err("list action log entries", e))?;
        rows.into_iter().map(ActionLogRow::into_entry).collect()
    }
}
