//! In-memory [`KnowledgeStore`] implementation for tests and embedding.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock`. Every mutation
//! happens under a single write guard, which is what makes
//! [`increment_view_count`](KnowledgeStore::increment_view_count) atomic here.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::models::{ChatMessage, DailyReflection, KnowledgeRecord};

use super::{KnowledgeStore, StoreError, StoreResult};

/// In-memory store for tests and single-process use.
pub struct InMemoryStore {
    knowledge: RwLock<HashMap<String, KnowledgeRecord>>,
    reflections: RwLock<Vec<DailyReflection>>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            knowledge: RwLock::new(HashMap::new()),
            reflections: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored reflections across all users.
    pub fn reflection_count(&self) -> StoreResult<usize> {
        Ok(read(&self.reflections)?.len())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::backend(anyhow::anyhow!("in-memory store lock poisoned")))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::backend(anyhow::anyhow!("in-memory store lock poisoned")))
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    async fn insert_knowledge(&self, record: &KnowledgeRecord) -> StoreResult<()> {
        let mut knowledge = write(&self.knowledge)?;
        if knowledge.contains_key(&record.id) {
            return Err(StoreError::backend(anyhow::anyhow!(
                "duplicate knowledge id: {}",
                record.id
            )));
        }
        knowledge.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_knowledge(&self, id: &str) -> StoreResult<Option<KnowledgeRecord>> {
        Ok(read(&self.knowledge)?.get(id).cloned())
    }

    async fn find_knowledge(&self, needle: &str) -> StoreResult<Vec<KnowledgeRecord>> {
        Ok(read(&self.knowledge)?
            .values()
            .filter(|r| r.title.contains(needle) || r.content.contains(needle))
            .cloned()
            .collect())
    }

    async fn increment_view_count(&self, id: &str) -> StoreResult<i64> {
        let mut knowledge = write(&self.knowledge)?;
        let record = knowledge
            .get_mut(id)
            .ok_or_else(|| StoreError::knowledge_not_found(id))?;
        record.view_count += 1;
        Ok(record.view_count)
    }

    async fn insert_reflection(&self, reflection: &DailyReflection) -> StoreResult<()> {
        write(&self.reflections)?.push(reflection.clone());
        Ok(())
    }

    async fn list_reflections(&self, user_id: &str) -> StoreResult<Vec<DailyReflection>> {
        // Insertion order doubles as creation order; reverse for newest first.
        Ok(read(&self.reflections)?
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_chat_message(&self, message: &ChatMessage) -> StoreResult<()> {
        write(&self.messages)?.push(message.clone());
        Ok(())
    }

    async fn recent_chat_messages(&self, limit: i64) -> StoreResult<Vec<ChatMessage>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(read(&self.messages)?
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Visibility};
    use chrono::Utc;
    use std::sync::Arc;

    fn record(id: &str, title: &str, content: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: Vec::new(),
            approval_status: ApprovalStatus::Pending,
            visibility: Visibility::Public,
            view_count: 0,
            created_by: "tester".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_matches_title_or_content() {
        let store = InMemoryStore::new();
        store
            .insert_knowledge(&record("a", "Release checklist", "steps"))
            .await
            .unwrap();
        store
            .insert_knowledge(&record("b", "Onboarding", "read the release notes"))
            .await
            .unwrap();
        store
            .insert_knowledge(&record("c", "Holidays", "calendar"))
            .await
            .unwrap();

        let mut ids: Vec<String> = store
            .find_knowledge("elease")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = InMemoryStore::new();
        store.insert_knowledge(&record("a", "x", "y")).await.unwrap();
        let err = store.insert_knowledge(&record("a", "x", "y")).await;
        assert!(matches!(err, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_increment_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.increment_view_count("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_knowledge(&record("hot", "t", "c")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_view_count("hot").await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let stored = store.get_knowledge("hot").await.unwrap().unwrap();
        assert_eq!(stored.view_count, 64);
    }

    #[tokio::test]
    async fn test_recent_chat_messages_newest_first() {
        let store = InMemoryStore::new();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            store
                .insert_chat_message(&ChatMessage {
                    id: format!("m{}", i),
                    role: crate::models::ChatRole::User,
                    content: text.to_string(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }
        let recent = store.recent_chat_messages(2).await.unwrap();
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["three", "two"]);
    }

    #[test]
    fn test_poisoned_lock_is_backend_error() {
        let store = Arc::new(InMemoryStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.reflections.write().unwrap();
            panic!("poison the reflections lock");
        })
        .join();

        assert!(matches!(
            store.reflection_count(),
            Err(StoreError::Backend(_))
        ));
    }
}
