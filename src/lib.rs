//! # trivia-fetch
//!
//! Acquisition pipeline for trivia question sets served by a rate-limited,
//! paginated remote API (Open Trivia DB and compatible endpoints).
//!
//! ## What it does
//!
//! - **Paginates** - a requested total is split into requests of at most 50
//! - **Paces** - consecutive requests are separated by a fixed delay
//! - **Decodes** - HTML character references are resolved before records leave the fetcher
//! - **Caches** - completed sets are kept for the session, keyed by total
//! - **Cancels** - changing the total or dropping the service stops the run at its next step
//!
//! ## Quick Start
//!
//! ```no_run
//! use trivia_fetch::{Config, TriviaService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = TriviaService::new(Config::default())?;
//!
//!     // Watch snapshots as they are published
//!     let mut snapshots = service.subscribe();
//!     tokio::spawn(async move {
//!         while snapshots.changed().await.is_ok() {
//!             let snapshot = snapshots.borrow().clone();
//!             println!("loading={} error={:?}", snapshot.loading, snapshot.error);
//!         }
//!     });
//!
//!     service.request(80);
//!     let snapshot = service.settled().await;
//!     println!("{} questions", snapshot.questions.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Session cache of assembled question sets
pub mod cache;
/// Cooperative cancellation helpers
pub mod cancel;
/// Configuration types
pub mod config;
/// HTML character reference decoding
pub mod decode;
/// Error types
pub mod error;
/// Sequential batch fetching
pub mod fetcher;
/// Data access service for presentation layers
pub mod service;
/// Remote question source
pub mod source;
/// Core types and events
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use cache::{MemoryStorage, QuestionCache, SessionStorage, SqliteStorage};
pub use cancel::{CancellationToken, SleepOutcome, cancellable_sleep};
pub use config::{ApiConfig, BatchConfig, CacheConfig, Config, QueryFilters};
pub use decode::decode_entities;
pub use error::{Error, ErrorKind, Result, StorageError};
pub use fetcher::{BatchFetcher, RequestPlan};
pub use service::TriviaService;
pub use source::{HttpQuestionSource, QuestionSource};
pub use types::{
    ApiResponse, Difficulty, Event, FetchSnapshot, QuestionRecord, QuestionType, RawQuestion,
    derive_categories,
};
