//! Knowledge record commands: submit, get, and view.
//!
//! Used by the `kb submit`, `kb get`, and `kb view` CLI commands. Each opens
//! the configured database and goes through the repository, the same path
//! the HTTP handlers take.

use anyhow::{Context, Result};

use knowledge_hub_core::models::{KnowledgeDraft, KnowledgeRecord, Visibility};

use crate::config::Config;
use crate::db;

pub async fn submit(
    config: &Config,
    title: String,
    content: String,
    created_by: String,
    tags: Vec<String>,
    visibility: Option<&str>,
) -> Result<KnowledgeRecord> {
    let visibility = visibility
        .map(|v| {
            Visibility::parse(v)
                .with_context(|| format!("invalid visibility '{}': use public, internal, or private", v))
        })
        .transpose()?;

    let (repo, pool) = db::open_repository(config).await?;
    let record = repo
        .submit_knowledge(KnowledgeDraft {
            title: Some(title),
            content: Some(content),
            tags,
            visibility,
            created_by: Some(created_by),
        })
        .await;
    pool.close().await;
    Ok(record?)
}

pub async fn run_submit(
    config: &Config,
    title: String,
    content: String,
    created_by: String,
    tags: Vec<String>,
    visibility: Option<String>,
) -> Result<()> {
    let record = submit(config, title, content, created_by, tags, visibility.as_deref()).await?;
    println!("Submitted {} (pending approval).", record.id);
    Ok(())
}

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let (repo, pool) = db::open_repository(config).await?;
    let record = repo.get_knowledge(id).await;
    pool.close().await;
    let record = record?;

    println!("--- Knowledge ---");
    println!("id:         {}", record.id);
    println!("title:      {}", record.title);
    println!("status:     {}", record.approval_status.as_str());
    println!("visibility: {}", record.visibility.as_str());
    println!("views:      {}", record.view_count);
    println!("created_by: {}", record.created_by);
    println!("created_at: {}", record.created_at.to_rfc3339());
    if !record.tags.is_empty() {
        println!("tags:       {}", record.tags.join(", "));
    }
    println!();
    println!("{}", record.content);
    Ok(())
}

pub async fn run_view(config: &Config, id: &str) -> Result<()> {
    let (repo, pool) = db::open_repository(config).await?;
    let count = repo.increment_view_count(id).await;
    pool.close().await;
    println!("{} now has {} views.", id, count?);
    Ok(())
}
