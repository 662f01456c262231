//! Batch fetch orchestration
//!
//! A run turns a requested total into a [`RequestPlan`], then walks the plan
//! strictly in order:
//!
//! 1. check the run's cancellation token
//! 2. request one batch from the [`QuestionSource`]
//! 3. reject non-zero response codes and short batches
//! 4. decode every text field and append the batch to the accumulator
//! 5. unless this was the last batch, wait out the inter-request delay
//!
//! Only a run that completes every batch writes to the cache and returns data;
//! any failure discards what was accumulated.

mod plan;


pub use plan::RequestPlan;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::cache::QuestionCache;
use crate::cancel::{
    CancellationToken, SleepOutcome, cancellable_sleep, ensure_active, run_until_cancelled,
};
use crate::config::BatchConfig;
use crate::decode::decode_question;
use crate::error::{Error, Result};
use crate::source::QuestionSource;
use crate::types::{ApiResponse, Event, QuestionRecord, RawQuestion};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Sequential, rate-respecting fetcher for a full question set
#[derive(Clone)]
pub struct BatchFetcher {
    source: Arc<dyn QuestionSource>,
    cache: QuestionCache,
    batching: BatchConfig,
    event_tx: broadcast::Sender<Event>,
}

impl BatchFetcher {
    /// Fetcher reading from `source` and writing completed sets to `cache`
    pub fn new(
        source: Arc<dyn QuestionSource>,
        cache: QuestionCache,
        batching: BatchConfig,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            cache,
            batching,
            event_tx,
        }
    }

    /// Subscribe to run progress events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> &broadcast::Sender<Event> {
        &self.event_tx
    }

    /// Cache this fetcher writes to
    pub fn cache(&self) -> &QuestionCache {
        &self.cache
    }

    /// Plan for `total_amount` under this fetcher's batch limit
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero total or a batch size outside
    /// `1..=SOURCE_MAX_PER_REQUEST`.
    pub fn plan(&self, total_amount: u32) -> Result<RequestPlan> {
        self.batching.validate()?;
        RequestPlan::new(total_amount, self.batching.max_per_request)
    }

    /// Fetch `total_amount` questions, honoring `token` between every step
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for a zero total or an out-of-range batch size
    /// - [`Error::Transport`] / [`Error::Network`] when a request fails
    /// - [`Error::ApiRejected`] when the source reports a non-zero response code
    /// - [`Error::Cancelled`] when `token` fires before the run completes
    pub async fn run(
        &self,
        total_amount: u32,
        token: &CancellationToken,
    ) -> Result<Vec<QuestionRecord>> {
        let plan = self.plan(total_amount)?;
        let batches = plan.len();

        tracing::info!(
            total_amount,
            batches,
            source = self.source.name(),
            "Starting question fetch"
        );
        self.event_tx
            .send(Event::FetchStarted {
                total_amount,
                batches,
            })
            .ok();

        let mut accumulated: Vec<QuestionRecord> = Vec::new();

        for (batch, batch_size) in plan.batches().enumerate() {
            ensure_active(token)?;

            tracing::debug!(total_amount, batch, batch_size, "Requesting batch");
            let response =
                run_until_cancelled(token, self.source.fetch_batch(batch_size)).await?;
            let raw = validate_batch(response, batch, batch_size)?;
            accumulated.extend(raw.into_iter().map(decode_question));

            self.event_tx
                .send(Event::BatchCompleted {
                    total_amount,
                    batch,
                    batches,
                    received: accumulated.len(),
                })
                .ok();

            if !plan.is_last(batch) {
                ensure_active(token)?;
                tracing::debug!(
                    delay_ms = self.batching.request_delay.as_millis() as u64,
                    "Waiting before next request"
                );
                if cancellable_sleep(self.batching.request_delay, token).await
                    == SleepOutcome::Cancelled
                {
                    tracing::debug!(total_amount, batch, "Fetch cancelled during delay");
                    return Err(Error::Cancelled);
                }
            }
        }

        ensure_active(token)?;
        self.cache.put(total_amount, &accumulated).await;

        tracing::info!(
            total_amount,
            questions = accumulated.len(),
            "Question fetch complete"
        );
        Ok(accumulated)
    }
}

impl std::fmt::Debug for BatchFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchFetcher")
            .field("source", &self.source.name())
            .field("cache", &self.cache)
            .field("batching", &self.batching)
            .finish()
    }
}

/// Accept a batch only if the source reported success and sent every record
fn validate_batch(
    response: ApiResponse,
    batch: usize,
    expected: u32,
) -> Result<Vec<RawQuestion>> {
    if response.response_code != 0 {
        tracing::warn!(
            batch,
            response_code = response.response_code,
            "Question source rejected request"
        );
        return Err(Error::ApiRejected {
            code: response.response_code,
        });
    }

    if response.results.len() != expected as usize {
        tracing::warn!(
            batch,
            expected,
            received = response.results.len(),
            "Question source returned wrong batch size"
        );
        return Err(Error::Other(format!(
            "question source returned {} questions for batch {}, expected {}",
            response.results.len(),
            batch,
            expected
        )));
    }

    Ok(response.results)
}
