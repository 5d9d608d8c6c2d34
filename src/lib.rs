//! # Knowledge Hub
//!
//! A knowledge-base service: users submit knowledge records (articles with
//! tags, an approval status, and a view count), search them by keyword,
//! count views, and log daily reflections and chat history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │   CLI    │   │   HTTP   │
//! │   (kb)   │   │  (Axum)  │
//! └────┬─────┘   └────┬─────┘
//!      └──────┬───────┘
//!             ▼
//!   ┌───────────────────┐      ┌──────────────┐
//!   │KnowledgeRepository│─────▶│KnowledgeStore│  SQLite / in-memory
//!   └───────────────────┘      └──────────────┘
//! ```
//!
//! The store is created by the entry point (`kb serve`, or a CLI command) and
//! injected into the repository; nothing holds a global client.
//!
//! ## Quick Start
//!
//! ```bash
//! kb init
//! kb submit --title "情報公開条例の手引" --content "..." --author u1
//! kb search "情報"
//! kb serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool (WAL) and repository wiring |
//! | [`migrate`] | Idempotent schema creation |
//! | [`sqlite_store`] | SQLite `KnowledgeStore` |
//! | [`search`] | Search entry points for the CLI |
//! | [`knowledge`] | Submit / get / view commands |
//! | [`rituals`] | Daily reflection commands |
//! | [`server`] | JSON HTTP API |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod db;
pub mod knowledge;
pub mod logging;
pub mod migrate;
pub mod rituals;
pub mod search;
pub mod server;
pub mod sqlite_store;

pub use knowledge_hub_core::models;
pub use knowledge_hub_core::repository::{KnowledgeRepository, RepositoryError};
pub use knowledge_hub_core::store;
