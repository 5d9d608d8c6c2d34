//! Keyword search over knowledge records.
//!
//! The search operates entirely through the [`KnowledgeStore`] trait. The
//! store narrows candidates (SQLite does it with `instr`, the in-memory store
//! with `str::contains`); this module re-checks every candidate against
//! [`matches`] and fixes the result order, so every backend returns the same
//! answer for the same data.
//!
//! # Matching
//!
//! A record matches when its title or its content contains the query as a
//! case-sensitive substring. Tags are not searched. There is no tokenisation,
//! ranking or pagination.
//!
//! # Ordering
//!
//! Newest first by `created_at`, ties broken by ascending `id`.

use crate::models::KnowledgeRecord;
use crate::store::{KnowledgeStore, StoreResult};

/// Returns true when `record` satisfies `query`.
pub fn matches(record: &KnowledgeRecord, query: &str) -> bool {
    record.title.contains(query) || record.content.contains(query)
}

/// Run a keyword search against a [`KnowledgeStore`] backend.
///
/// This is the function every frontend (CLI, HTTP) delegates to. Rejecting
/// empty queries is the caller's job; an empty query here simply yields no
/// results. Never mutates the store.
pub async fn search_knowledge<S>(store: &S, query: &str) -> StoreResult<Vec<KnowledgeRecord>>
where
    S: KnowledgeStore + ?Sized,
{
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut results: Vec<KnowledgeRecord> = store
        .find_knowledge(query)
        .await?
        .into_iter()
        .filter(|r| matches(r, query))
        .collect();

    sort_results(&mut results);
    Ok(results)
}

/// Sort into the canonical result order.
pub fn sort_results(results: &mut [KnowledgeRecord]) {
    results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, Visibility};
    use crate::store::memory::InMemoryStore;
    use chrono::{DateTime, Utc};

    fn make_record(id: &str, title: &str, content: &str, ts: i64) -> KnowledgeRecord {
        KnowledgeRecord {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: vec!["guide".to_string()],
            approval_status: ApprovalStatus::Approved,
            visibility: Visibility::Public,
            view_count: 0,
            created_by: "u1".to_string(),
            created_at: DateTime::<Utc>::from_timestamp(ts, 0).unwrap(),
        }
    }

    async fn seeded(records: Vec<KnowledgeRecord>) -> InMemoryStore {
        let store = InMemoryStore::new();
        for r in &records {
            store.insert_knowledge(r).await.unwrap();
        }
        store
    }

    fn ids(results: &[KnowledgeRecord]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_japanese_substring_example() {
        let store = seeded(vec![
            make_record("1", "情報公開条例の手引", "", 200),
            make_record("2", "個人情報保護制度", "", 100),
        ])
        .await;

        let both = search_knowledge(&store, "情報").await.unwrap();
        assert_eq!(ids(&both), vec!["1", "2"]);

        let first = search_knowledge(&store, "手引").await.unwrap();
        assert_eq!(ids(&first), vec!["1"]);
    }

    #[tokio::test]
    async fn test_non_matching_records_excluded() {
        let store = seeded(vec![
            make_record("a", "Rust ownership", "borrowing rules", 1),
            make_record("b", "Docker", "containers and ownership of volumes", 2),
            make_record("c", "Gardening", "tomatoes", 3),
        ])
        .await;

        let results = search_knowledge(&store, "ownership").await.unwrap();
        assert_eq!(ids(&results), vec!["b", "a"]);
        for r in &results {
            assert!(r.title.contains("ownership") || r.content.contains("ownership"));
        }
    }

    #[tokio::test]
    async fn test_case_sensitive() {
        let store = seeded(vec![make_record("a", "Rust", "", 1)]).await;
        assert!(search_knowledge(&store, "rust").await.unwrap().is_empty());
        assert_eq!(search_knowledge(&store, "Rust").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tags_not_searched() {
        let store = seeded(vec![make_record("a", "title", "body", 1)]).await;
        assert!(search_knowledge(&store, "guide").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let store = seeded(vec![make_record("a", "title", "body", 1)]).await;
        assert!(search_knowledge(&store, "").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_does_not_touch_view_count() {
        let store = seeded(vec![make_record("a", "title", "body", 1)]).await;
        search_knowledge(&store, "title").await.unwrap();
        let r = store.get_knowledge("a").await.unwrap().unwrap();
        assert_eq!(r.view_count, 0);
    }

    #[test]
    fn test_sort_ties_break_on_id() {
        let mut results = vec![
            make_record("b", "", "", 5),
            make_record("a", "", "", 5),
            make_record("c", "", "", 9),
        ];
        sort_results(&mut results);
        assert_eq!(ids(&results), vec!["c", "a", "b"]);
    }
}
