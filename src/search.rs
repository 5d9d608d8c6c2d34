//! Application-level search entry points.
//!
//! The matching and ordering rules live in `knowledge_hub_core::search` and
//! run through the [`KnowledgeStore`](knowledge_hub_core::store::KnowledgeStore)
//! trait. This wrapper handles the database connection and CLI output.

use anyhow::{bail, Result};

use knowledge_hub_core::models::KnowledgeRecord;

use crate::config::Config;
use crate::db;

/// Search the configured database. Shared by `kb search` and the tests.
pub async fn search_records(config: &Config, query: &str) -> Result<Vec<KnowledgeRecord>> {
    if query.is_empty() {
        bail!("query must not be empty");
    }
    if query.chars().count() > config.search.max_query_chars {
        bail!(
            "query must be at most {} characters",
            config.search.max_query_chars
        );
    }

    let (repo, pool) = db::open_repository(config).await?;
    let results = repo.search(query).await?;
    pool.close().await;
    Ok(results)
}

/// CLI entry point — calls [`search_records`] and prints results to stdout.
pub async fn run_search(config: &Config, query: &str) -> Result<()> {
    let results = search_records(config, query).await?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, record) in results.iter().enumerate() {
        println!(
            "{}. {} [{}] ({} views)",
            i + 1,
            record.title,
            record.approval_status.as_str(),
            record.view_count
        );
        if !record.tags.is_empty() {
            println!("    tags: {}", record.tags.join(", "));
        }
        println!("    created: {} by {}", record.created_at.to_rfc3339(), record.created_by);
        println!("    excerpt: \"{}\"", excerpt(&record.content, 160));
        println!("    id: {}", record.id);
        println!();
    }

    Ok(())
}

/// First `max_chars` characters of `text` on one line.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let trimmed = flat.trim();
    if trimmed.chars().count() <= max_chars {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "個人情報保護制度の概要";
        assert_eq!(excerpt(text, 4), "個人情報...");
        assert_eq!(excerpt("short\ntext", 50), "short text");
    }
}
