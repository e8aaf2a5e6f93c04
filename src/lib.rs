//! # lexiscope
//!
//! A dictionary lookup service that combines a free dictionary API with
//! structured LLM calls, returning one section of a word's profile per
//! request or the whole profile in one batch.
//!
//! ## Architecture
//!
//! A section request flows through a small DAG:
//!
//! ```text
//!                      ┌──────────────────┐
//!                      │  Section Request │
//!                      └────────┬─────────┘
//!                               ▼
//!                  ┌────────────────────────┐
//!                  │  Validate + Dispatch   │  400 before any I/O
//!                  └────────────┬───────────┘
//!                               ▼
//!                  ┌────────────────────────┐
//!                  │       Discovery        │
//!                  │ dictionary API (once)  │
//!                  │  └─miss─▶ AI discovery │  entry-level only
//!                  └────────────┬───────────┘
//!                               │ (entry, sense) resolution
//!            ┌──────────────────┼───────────────────┐
//!            ▼                  ▼                   ▼
//!   ┌─────────────────┐ ┌───────────────┐ ┌──────────────────┐
//!   │ Sense Enrichment│ │ Granular call │ │  Video matching  │
//!   │ core ║ related  │ │ default on    │ │ phrase ║ phrase  │
//!   │ one deadline    │ │ failure       │ │ search, probe    │
//!   └────────┬────────┘ └───────┬───────┘ └────────┬─────────┘
//!            │ merge: ground    │                  │
//!            │ truth first,     │                  │
//!            │ pad to 3         │                  │
//!            └──────────────────┼──────────────────┘
//!                               ▼
//!                  ┌────────────────────────┐
//!                  │ {headword, ..., time}  │
//!                  └────────────────────────┘
//! ```
//!
//! The full-word lookup runs the five granular calls and one enrichment per
//! sense in a single pool of `min(10, 5 + senses)` workers under a 60s batch
//! deadline.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration: LLM provider, tier budgets, deadlines, video filters
//! - [`models`] - Shared data types: entries, senses, section payloads, request/response types
//! - [`error`] - `TaskFailure` for single sub-tasks and `LookupError` at the lookup boundary
//! - [`sources::dictionary`] - Free dictionary API adapter and pronunciation selection
//! - [`sources::bilibili`] - Video search, metadata and subtitle tracks
//! - [`llm::gateway`] - Structured completions with per-tier token and timeout budgets
//! - [`llm::prompts`] - Prompt builders for every model task
//! - [`lookup`] - Discovery, sense enrichment, section dispatch and the full-word batch
//! - [`video`] - Candidate filtering, engagement scoring and subtitle matching
//! - [`api`] - Axum HTTP handlers and error-to-status mapping
//! - [`state`] - Shared application state holding the lookup service

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod lookup;
pub mod models;
pub mod sources;
pub mod state;
pub mod video;
