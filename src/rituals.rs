//! Daily reflection commands (`kb reflect`, `kb reflections`).

use anyhow::Result;

use knowledge_hub_core::models::{MetricsSnapshot, ReflectionEntry};

use crate::config::Config;
use crate::db;

pub async fn run_reflect(
    config: &Config,
    user_id: String,
    text: Option<String>,
    reflection_type: Option<String>,
    metrics: MetricsSnapshot,
) -> Result<()> {
    let (repo, pool) = db::open_repository(config).await?;
    let saved = repo
        .save_daily_reflection(ReflectionEntry {
            user_id: Some(user_id),
            reflection_text: text,
            reflection_type,
            metrics_snapshot: Some(metrics),
        })
        .await;
    pool.close().await;
    let saved = saved?;

    println!(
        "Saved {} reflection {} for {}.",
        saved.reflection_type, saved.id, saved.user_id
    );
    Ok(())
}

pub async fn run_list(config: &Config, user_id: &str) -> Result<()> {
    let (repo, pool) = db::open_repository(config).await?;
    let reflections = repo.list_reflections(user_id).await;
    pool.close().await;
    let reflections = reflections?;

    if reflections.is_empty() {
        println!("No reflections.");
        return Ok(());
    }

    for r in &reflections {
        let m = r.metrics_snapshot;
        println!(
            "{}  [{}]  points={} thanks={} time_saved={}",
            r.created_at.to_rfc3339(),
            r.reflection_type,
            m.points,
            m.thanks,
            m.time_saved
        );
        if !r.reflection_text.is_empty() {
            println!("    {}", r.reflection_text);
        }
    }
    Ok(())
}
