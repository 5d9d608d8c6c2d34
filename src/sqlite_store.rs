//! SQLite-backed [`KnowledgeStore`] implementation.
//!
//! Rows are decoded into the typed records from `knowledge_hub_core::models`
//! here, at the store boundary; a row that does not decode (unknown enum
//! value, malformed tags JSON) is a [`StoreError::Backend`].
//!
//! Timestamps are stored as Unix milliseconds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use knowledge_hub_core::models::{
    ApprovalStatus, ChatMessage, ChatRole, DailyReflection, KnowledgeRecord, MetricsSnapshot,
    Visibility,
};
use knowledge_hub_core::store::{KnowledgeStore, StoreError, StoreResult};

/// SQLite implementation of the [`KnowledgeStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn decode_err(msg: String) -> StoreError {
    StoreError::backend(anyhow::anyhow!(msg))
}

fn from_millis(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| decode_err(format!("invalid timestamp: {}", ms)))
}

fn row_to_record(row: &SqliteRow) -> StoreResult<KnowledgeRecord> {
    let tags_json: String = row.try_get("tags_json").map_err(StoreError::backend)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(StoreError::backend)?;

    let status: String = row.try_get("approval_status").map_err(StoreError::backend)?;
    let approval_status = ApprovalStatus::parse(&status)
        .ok_or_else(|| decode_err(format!("unknown approval_status: {}", status)))?;

    let visibility: String = row.try_get("visibility").map_err(StoreError::backend)?;
    let visibility = Visibility::parse(&visibility)
        .ok_or_else(|| decode_err(format!("unknown visibility: {}", visibility)))?;

    Ok(KnowledgeRecord {
        id: row.try_get("id").map_err(StoreError::backend)?,
        title: row.try_get("title").map_err(StoreError::backend)?,
        content: row.try_get("content").map_err(StoreError::backend)?,
        tags,
        approval_status,
        visibility,
        view_count: row.try_get("view_count").map_err(StoreError::backend)?,
        created_by: row.try_get("created_by").map_err(StoreError::backend)?,
        created_at: from_millis(row.try_get("created_at").map_err(StoreError::backend)?)?,
    })
}

fn row_to_reflection(row: &SqliteRow) -> StoreResult<DailyReflection> {
    Ok(DailyReflection {
        id: row.try_get("id").map_err(StoreError::backend)?,
        user_id: row.try_get("user_id").map_err(StoreError::backend)?,
        reflection_text: row.try_get("reflection_text").map_err(StoreError::backend)?,
        reflection_type: row.try_get("reflection_type").map_err(StoreError::backend)?,
        metrics_snapshot: MetricsSnapshot {
            points: row.try_get("points").map_err(StoreError::backend)?,
            thanks: row.try_get("thanks").map_err(StoreError::backend)?,
            time_saved: row.try_get("time_saved").map_err(StoreError::backend)?,
        },
        created_at: from_millis(row.try_get("created_at").map_err(StoreError::backend)?)?,
    })
}

fn row_to_message(row: &SqliteRow) -> StoreResult<ChatMessage> {
    let role: String = row.try_get("role").map_err(StoreError::backend)?;
    Ok(ChatMessage {
        id: row.try_get("id").map_err(StoreError::backend)?,
        role: ChatRole::parse(&role).ok_or_else(|| decode_err(format!("unknown role: {}", role)))?,
        content: row.try_get("content").map_err(StoreError::backend)?,
        created_at: from_millis(row.try_get("created_at").map_err(StoreError::backend)?)?,
    })
}

const KNOWLEDGE_COLUMNS: &str = "id, title, content, tags_json, approval_status, visibility, \
                                 view_count, created_by, created_at";

#[async_trait]
impl KnowledgeStore for SqliteStore {
    async fn insert_knowledge(&self, record: &KnowledgeRecord) -> StoreResult<()> {
        let tags_json = serde_json::to_string(&record.tags).map_err(StoreError::backend)?;

        sqlx::query(
            r#"
            INSERT INTO knowledge (id, title, content, tags_json, approval_status,
                                   visibility, view_count, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.title)
        .bind(&record.content)
        .bind(&tags_json)
        .bind(record.approval_status.as_str())
        .bind(record.visibility.as_str())
        .bind(record.view_count)
        .bind(&record.created_by)
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn get_knowledge(&self, id: &str) -> StoreResult<Option<KnowledgeRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM knowledge WHERE id = ?",
            KNOWLEDGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find_knowledge(&self, needle: &str) -> StoreResult<Vec<KnowledgeRecord>> {
        // instr() is a case-sensitive substring test, unlike LIKE.
        let rows = sqlx::query(&format!(
            "SELECT {} FROM knowledge WHERE instr(title, ?) > 0 OR instr(content, ?) > 0",
            KNOWLEDGE_COLUMNS
        ))
        .bind(needle)
        .bind(needle)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn increment_view_count(&self, id: &str) -> StoreResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE knowledge SET view_count = view_count + 1 WHERE id = ? RETURNING view_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        count.ok_or_else(|| StoreError::knowledge_not_found(id))
    }

    async fn insert_reflection(&self, reflection: &DailyReflection) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_reflections (id, user_id, reflection_text, reflection_type,
                                           points, thanks, time_saved, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reflection.id)
        .bind(&reflection.user_id)
        .bind(&reflection.reflection_text)
        .bind(&reflection.reflection_type)
        .bind(reflection.metrics_snapshot.points)
        .bind(reflection.metrics_snapshot.thanks)
        .bind(reflection.metrics_snapshot.time_saved)
        .bind(reflection.created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn list_reflections(&self, user_id: &str) -> StoreResult<Vec<DailyReflection>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, reflection_text, reflection_type,
                   points, thanks, time_saved, created_at
            FROM daily_reflections
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(row_to_reflection).collect()
    }

    async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<()> {
        sqlx::query("INSERT INTO chat_messages (id, role, content, created_at) VALUES (?, ?, ?, ?)")
            .bind(&message.id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.created_at.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn recent_chat_messages(&self, limit: i64) -> StoreResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, role, content, created_at
            FROM chat_messages
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(row_to_message).collect()
    }
}
