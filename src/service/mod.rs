//! Data access service: the single entry point for a presentation layer.
//!
//! [`TriviaService`] owns the lifecycle of fetch runs. Requesting a total
//! cancels whatever run is in flight, publishes a loading snapshot, serves the
//! session cache if it holds that total, and otherwise starts a new
//! [`BatchFetcher`] run. Consumers observe results through a `watch` channel of
//! [`FetchSnapshot`]s.
//!
//! Every run carries a generation number. A run may only publish while its
//! generation is current, and the check happens under the same lock that
//! starts new runs, so a superseded run never becomes observable.


use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};

use crate::cache::{MemoryStorage, QuestionCache, SessionStorage};
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::BatchFetcher;
use crate::source::{HttpQuestionSource, QuestionSource};
use crate::types::{Event, FetchSnapshot};

/// Bookkeeping for the run that currently owns the snapshot
#[derive(Debug, Default)]
struct RunState {
    generation: u64,
    total_amount: Option<u32>,
    token: Option<CancellationToken>,
}

struct Inner {
    fetcher: BatchFetcher,
    snapshot_tx: watch::Sender<FetchSnapshot>,
    run: Mutex<RunState>,
}

impl Inner {
    fn lock_run(&self) -> MutexGuard<'_, RunState> {
        // RunState holds no invariants a panicking holder could break halfway
        self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish `snapshot` only if `generation` still owns the service
    fn publish_if_current(&self, generation: u64, snapshot: FetchSnapshot) -> bool {
        let run = self.lock_run();
        if run.generation != generation {
            return false;
        }
        self.snapshot_tx.send_replace(snapshot);
        true
    }

    fn emit(&self, event: Event) {
        self.fetcher.event_sender().send(event).ok();
    }
}

/// Lifecycle owner and snapshot publisher for question sets
///
/// Dropping the service cancels the in-flight run.
///
/// # Example
///
/// ```no_run
/// use trivia_fetch::{Config, TriviaService};
///
/// # async fn example() -> trivia_fetch::Result<()> {
/// let service = TriviaService::new(Config::default())?;
/// service.request(80);
///
/// let snapshot = service.settled().await;
/// if let Some(error) = &snapshot.error {
///     eprintln!("fetch failed: {error}");
/// } else {
///     println!("{} questions in {:?}", snapshot.questions.len(), snapshot.categories);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TriviaService {
    inner: Arc<Inner>,
}

impl TriviaService {
    /// Service talking HTTP to the configured source, caching in memory
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let source = HttpQuestionSource::new(&config.api, &config.filters)?;
        Self::with_parts(Arc::new(source), Arc::new(MemoryStorage::new()), &config)
    }

    /// Service over an injected source and session storage
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration is
    /// invalid.
    pub fn with_parts(
        source: Arc<dyn QuestionSource>,
        storage: Arc<dyn SessionStorage>,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        let cache = QuestionCache::new(storage, &config.cache);
        Ok(Self::from_fetcher(BatchFetcher::new(
            source,
            cache,
            config.batching.clone(),
        )))
    }

    /// Service driving an existing fetcher
    pub fn from_fetcher(fetcher: BatchFetcher) -> Self {
        let (snapshot_tx, _rx) = watch::channel(FetchSnapshot::idle());
        Self {
            inner: Arc::new(Inner {
                fetcher,
                snapshot_tx,
                run: Mutex::new(RunState::default()),
            }),
        }
    }

    /// Show `total_amount` questions
    ///
    /// Starts a new run when the total differs from the current one, when no
    /// run has happened yet, after [`shutdown`](Self::shutdown), or when the
    /// last run for this total failed.
    /// Otherwise this is a no-op. Must be called from within a Tokio runtime.
    pub fn request(&self, total_amount: u32) {
        let mut run = self.inner.lock_run();
        let unchanged = run.total_amount == Some(total_amount)
            && run.token.is_some()
            && self.inner.snapshot_tx.borrow().error.is_none();
        if unchanged {
            tracing::debug!(total_amount, "Requested total unchanged, keeping current run");
            return;
        }
        self.start_run(&mut run, total_amount);
    }

    /// Re-run the current total, bypassing the unchanged-total check
    ///
    /// The cache is still consulted. Returns the total that was restarted, if any.
    pub fn reload(&self) -> Option<u32> {
        let mut run = self.inner.lock_run();
        let total_amount = run.total_amount?;
        self.start_run(&mut run, total_amount);
        Some(total_amount)
    }

    /// Cancel the in-flight run, if any
    ///
    /// The last published snapshot stays in place.
    pub fn shutdown(&self) {
        let mut run = self.inner.lock_run();
        if let Some(token) = run.token.take() {
            tracing::debug!(generation = run.generation, "Cancelling in-flight fetch");
            token.cancel();
        }
        // nothing already spawned may publish after shutdown
        run.generation += 1;
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> FetchSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Receiver for run progress events
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.inner.fetcher.subscribe()
    }

    /// Derived category list of the latest snapshot
    pub fn categories(&self) -> Vec<String> {
        self.inner.snapshot_tx.borrow().categories.clone()
    }

    /// Total the service is currently serving
    pub fn total_amount(&self) -> Option<u32> {
        self.inner.lock_run().total_amount
    }

    /// Wait until the current run has published its outcome
    ///
    /// Returns immediately when nothing is loading.
    pub async fn settled(&self) -> FetchSnapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(|snapshot| !snapshot.loading).await {
            Ok(snapshot) => snapshot.clone(),
            // the sender lives in `self`, so this only happens mid-drop
            Err(_) => self.snapshot(),
        }
    }

    fn start_run(&self, run: &mut RunState, total_amount: u32) {
        if let Some(previous) = run.token.take() {
            previous.cancel();
        }

        run.generation += 1;
        run.total_amount = Some(total_amount);
        let generation = run.generation;
        let token = CancellationToken::new();
        run.token = Some(token.clone());

        self.inner
            .snapshot_tx
            .send_replace(FetchSnapshot::loading(total_amount));

        tracing::debug!(total_amount, generation, "Starting fetch run");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            drive_run(inner, generation, total_amount, token).await;
        });
    }
}

impl Drop for TriviaService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TriviaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriviaService")
            .field("fetcher", &self.inner.fetcher)
            .field("run", &*self.inner.lock_run())
            .finish()
    }
}

/// Cache check, fetch and publish for one generation
async fn drive_run(inner: Arc<Inner>, generation: u64, total_amount: u32, token: CancellationToken) {
    if let Some(cached) = inner.fetcher.cache().get(total_amount).await {
        tracing::info!(total_amount, questions = cached.len(), "Serving questions from cache");
        if inner.publish_if_current(generation, FetchSnapshot::ready(total_amount, cached)) {
            inner.emit(Event::CacheHit { total_amount });
        }
        return;
    }

    match inner.fetcher.run(total_amount, &token).await {
        Ok(questions) => {
            if inner.publish_if_current(generation, FetchSnapshot::ready(total_amount, questions)) {
                inner.emit(Event::FetchCompleted {
                    total_amount,
                    completed_at: chrono::Utc::now().timestamp(),
                });
            }
        }
        Err(e) if e.is_cancelled() => {
            tracing::debug!(total_amount, generation, "Fetch run cancelled");
            inner.emit(Event::FetchCancelled { total_amount });
        }
        Err(e) => {
            let message = e.user_message();
            tracing::warn!(total_amount, kind = %e.kind(), error = %e, "Fetch run failed");
            if inner.publish_if_current(
                generation,
                FetchSnapshot::failed(total_amount, message.clone()),
            ) {
                inner.emit(Event::FetchFailed {
                    total_amount,
                    error: message,
                });
            }
        }
    }
}
