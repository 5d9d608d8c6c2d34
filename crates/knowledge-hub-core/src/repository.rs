//! Data-access facade between route handlers and the injected store.
//!
//! [`KnowledgeRepository`] owns an `Arc<dyn KnowledgeStore>` handed to it by
//! the process entry point. It applies input defaults and validation, assigns
//! ids and timestamps, and otherwise passes calls straight through.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use crate::models::{
    ApprovalStatus, ChatMessage, ChatRole, DailyReflection, KnowledgeDraft, KnowledgeRecord,
    ReflectionEntry, DEFAULT_REFLECTION_TYPE,
};
use crate::search;
use crate::store::{KnowledgeStore, StoreError};

/// Default number of chat messages returned by [`KnowledgeRepository::recent_chat_messages`].
pub const DEFAULT_CHAT_LIMIT: i64 = 50;
/// Upper bound on a single chat history read.
pub const MAX_CHAT_LIMIT: i64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Caller supplied a missing or malformed field.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::Store(StoreError::NotFound { .. }))
    }
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

fn required(field: &str, value: Option<String>) -> RepositoryResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RepositoryError::Validation(format!("{} is required", field))),
    }
}

/// Current time at the millisecond precision stores persist.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Trim tags, drop empties, and remove duplicates keeping the first occurrence.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[derive(Clone)]
pub struct KnowledgeRepository {
    store: Arc<dyn KnowledgeStore>,
}

impl KnowledgeRepository {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Keyword search; see [`search::search_knowledge`].
    pub async fn search(&self, query: &str) -> RepositoryResult<Vec<KnowledgeRecord>> {
        Ok(search::search_knowledge(self.store.as_ref(), query).await?)
    }

    /// Create a new pending record from a draft.
    pub async fn submit_knowledge(&self, draft: KnowledgeDraft) -> RepositoryResult<KnowledgeRecord> {
        let title = required("title", draft.title)?;
        let content = required("content", draft.content)?;
        let created_by = required("createdBy", draft.created_by)?;

        let record = KnowledgeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            tags: normalize_tags(draft.tags),
            approval_status: ApprovalStatus::Pending,
            visibility: draft.visibility.unwrap_or_default(),
            view_count: 0,
            created_by,
            created_at: now(),
        };
        self.store.insert_knowledge(&record).await?;
        Ok(record)
    }

    /// Fetch a record without counting a view.
    pub async fn get_knowledge(&self, id: &str) -> RepositoryResult<KnowledgeRecord> {
        self.store
            .get_knowledge(id)
            .await?
            .ok_or_else(|| StoreError::knowledge_not_found(id).into())
    }

    /// Count one view. Returns the new view count.
    pub async fn increment_view_count(&self, id: &str) -> RepositoryResult<i64> {
        if id.trim().is_empty() {
            return Err(RepositoryError::Validation("id is required".to_string()));
        }
        Ok(self.store.increment_view_count(id).await?)
    }

    /// Append a reflection, filling in defaults for omitted fields.
    ///
    /// Each call is an independent insert; nothing is merged per day.
    pub async fn save_daily_reflection(
        &self,
        entry: ReflectionEntry,
    ) -> RepositoryResult<DailyReflection> {
        let user_id = required("userId", entry.user_id)?;

        let reflection = DailyReflection {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            reflection_text: entry.reflection_text.unwrap_or_default(),
            reflection_type: entry
                .reflection_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REFLECTION_TYPE.to_string()),
            metrics_snapshot: entry.metrics_snapshot.unwrap_or_default(),
            created_at: now(),
        };
        self.store.insert_reflection(&reflection).await?;
        Ok(reflection)
    }

    pub async fn list_reflections(&self, user_id: &str) -> RepositoryResult<Vec<DailyReflection>> {
        if user_id.trim().is_empty() {
            return Err(RepositoryError::Validation("userId is required".to_string()));
        }
        Ok(self.store.list_reflections(user_id).await?)
    }

    pub async fn append_chat_message(
        &self,
        role: ChatRole,
        content: String,
    ) -> RepositoryResult<ChatMessage> {
        let content = required("content", Some(content))?;
        let message = ChatMessage {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            created_at: now(),
        };
        self.store.insert_chat_message(&message).await?;
        Ok(message)
    }

    /// Most recent messages in conversation order (oldest first).
    ///
    /// `limit` defaults to [`DEFAULT_CHAT_LIMIT`] and is clamped to
    /// `1..=MAX_CHAT_LIMIT`.
    pub async fn recent_chat_messages(
        &self,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<ChatMessage>> {
        let limit = limit.unwrap_or(DEFAULT_CHAT_LIMIT).clamp(1, MAX_CHAT_LIMIT);
        let mut messages = self.store.recent_chat_messages(limit).await?;
        messages.reverse();
        Ok(messages)
    }
}
