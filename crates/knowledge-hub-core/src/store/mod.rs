//! Storage abstraction for Knowledge Hub.
//!
//! The [`KnowledgeStore`] trait is the only path between the repository and
//! persisted data, so backends (SQLite, in-memory) are injected at
//! construction time rather than reached through globals.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::models::{ChatMessage, DailyReflection, KnowledgeRecord};

/// Errors raised by a [`KnowledgeStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The backend is unreachable or a query failed.
    #[error("store backend failure: {0}")]
    Backend(#[source] anyhow::Error),
}

impl StoreError {
    pub fn knowledge_not_found(id: &str) -> Self {
        StoreError::NotFound {
            kind: "knowledge record",
            id: id.to_string(),
        }
    }

    /// Wrap any backend error (sqlx, I/O, decode) as [`StoreError::Backend`].
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        StoreError::Backend(err.into())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Abstract storage backend for knowledge records, reflections and chat history.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_knowledge`](KnowledgeStore::insert_knowledge) | Persist a new record |
/// | [`get_knowledge`](KnowledgeStore::get_knowledge) | Fetch one record by id |
/// | [`find_knowledge`](KnowledgeStore::find_knowledge) | Records whose title or content contains a substring |
/// | [`increment_view_count`](KnowledgeStore::increment_view_count) | Atomic `view_count + 1` |
/// | [`insert_reflection`](KnowledgeStore::insert_reflection) | Append a reflection |
/// | [`list_reflections`](KnowledgeStore::list_reflections) | Reflections for one user |
/// | [`insert_chat_message`](KnowledgeStore::insert_chat_message) | Append a chat message |
/// | [`recent_chat_messages`](KnowledgeStore::recent_chat_messages) | Newest chat messages |
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    async fn insert_knowledge(&self, record: &KnowledgeRecord) -> StoreResult<()>;

    async fn get_knowledge(&self, id: &str) -> StoreResult<Option<KnowledgeRecord>>;

    /// Return every record whose title or content contains `needle`
    /// (case-sensitive). Order is not significant; callers sort.
    async fn find_knowledge(&self, needle: &str) -> StoreResult<Vec<KnowledgeRecord>>;

    /// Add one to the record's view count and return the new value.
    ///
    /// Must be atomic with respect to concurrent callers, including callers
    /// in other processes sharing the same backend. Returns
    /// [`StoreError::NotFound`] when no record has this id.
    async fn increment_view_count(&self, id: &str) -> StoreResult<i64>;

    async fn insert_reflection(&self, reflection: &DailyReflection) -> StoreResult<()>;

    /// Reflections for `user_id`, newest first.
    async fn list_reflections(&self, user_id: &str) -> StoreResult<Vec<DailyReflection>>;

    async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<()>;

    /// The `limit` newest messages, newest first.
    async fn recent_chat_messages(&self, limit: i64) -> StoreResult<Vec<ChatMessage>>;
}
