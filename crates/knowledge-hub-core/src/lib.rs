//! # Knowledge Hub Core
//!
//! Backend-agnostic logic for Knowledge Hub: data models, the store
//! abstraction, keyword search, and the repository facade.
//!
//! This crate contains no sqlx, HTTP, or filesystem I/O. Backends implement
//! [`store::KnowledgeStore`] and are injected into
//! [`repository::KnowledgeRepository`].

pub mod models;
pub mod repository;
pub mod search;
pub mod store;
