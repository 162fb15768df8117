//! trendpress-core
//!
//! Core of the AI content pipeline: trend source -> tasks -> content
//! generator -> draft posts.
//!
//! # Modules
//! - **domain**: model (ids, task lifecycle, content, providers, errors, slugs)
//! - **ports**: seams (TaskStore, ContentStore, ProviderStore, TrendSource, ContentGenerator, Clock)
//! - **impls**: in-memory and SQLite stores, Gemini / OpenAI-compatible / mock vendors
//! - **app**: orchestrator, builder, provider factory, category resolver
//! - **config**: settings from defaults and environment
//! - **observability**: tracing setup and status views

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{Orchestrator, OrchestratorBuilder};
pub use config::Settings;
