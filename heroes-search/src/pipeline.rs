//! Term-in / batch-out search pipeline.
//!
//! The driver task owns the debounce timer and the change filter. Terms
//! arrive through a single-slot `watch` cell, so only the newest pushed term
//! is ever held. Each accepted term advances the generation and spawns one
//! search; a finished search delivers only if its generation is still the
//! current one.

use crate::HeroSearch;
use crate::config::SearchConfig;
use heroes_model::Hero;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Heroes found for one accepted term.
pub type ResultBatch = Vec<Hero>;

struct DeliveryState {
    generation: u64,
    results: Option<broadcast::Sender<ResultBatch>>,
}

/// Generation counter and output sender behind one lock.
///
/// Search tasks only reach the output through [`Delivery::deliver`], so
/// closing the delivery ends the stream even while searches are in flight.
struct Delivery(Mutex<DeliveryState>);

impl Delivery {
    fn new(results: broadcast::Sender<ResultBatch>) -> Self {
        Self(Mutex::new(DeliveryState {
            generation: 0,
            results: Some(results),
        }))
    }

    fn lock(&self) -> MutexGuard<'_, DeliveryState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> u64 {
        self.lock().generation
    }

    fn subscriber_count(&self) -> usize {
        self.lock()
            .results
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }

    fn advance(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.generation
    }

    /// Sends `batch` only if `generation` is still current. Holding the
    /// lock keeps a stale result from slipping in after a newer term has
    /// been accepted.
    fn deliver(&self, generation: u64, batch: ResultBatch) -> bool {
        let state = self.lock();
        if state.generation != generation {
            return false;
        }
        if let Some(results) = &state.results {
            if results.send(batch).is_err() {
                debug!("Search results for generation {generation} had no subscribers");
            }
        }
        true
    }

    /// Discards everything in flight and closes the output.
    fn close(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.results = None;
    }
}

/// A running live-search pipeline.
///
/// Dropping the pipeline stops the driver, discards any search still in
/// flight and closes every [`SearchResults`].
pub struct SearchPipeline {
    terms: watch::Sender<String>,
    results: broadcast::Sender<ResultBatch>,
    delivery: Arc<Delivery>,
    driver: JoinHandle<()>,
}

impl SearchPipeline {
    /// Starts the pipeline on the current tokio runtime.
    pub fn spawn(searcher: Arc<dyn HeroSearch>, config: SearchConfig) -> Self {
        let (terms_tx, terms_rx) = watch::channel(String::new());
        let (results_tx, _) = broadcast::channel(config.channel_capacity.max(1));
        let delivery = Arc::new(Delivery::new(results_tx.clone()));

        let driver = tokio::spawn(run_driver(
            terms_rx,
            searcher,
            Arc::clone(&delivery),
            config.debounce(),
        ));

        Self {
            terms: terms_tx,
            results: results_tx,
            delivery,
            driver,
        }
    }

    /// Pushes a raw term, replacing any term still waiting out the quiet
    /// window. The empty string is a valid "clear search" input.
    pub fn push(&self, term: impl Into<String>) {
        self.terms.send_replace(term.into());
    }

    /// Subscribes to result batches delivered from now on.
    pub fn subscribe(&self) -> SearchResults {
        SearchResults {
            rx: self.results.subscribe(),
        }
    }

    /// Number of terms accepted so far.
    pub fn generation(&self) -> u64 {
        self.delivery.current()
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        self.driver.abort();
        self.delivery.close();
    }
}

/// Receiving side of a [`SearchPipeline`].
pub struct SearchResults {
    rx: broadcast::Receiver<ResultBatch>,
}

impl SearchResults {
    /// Waits for the next batch and returns the newest one available.
    /// Older batches still buffered for this subscriber are skipped.
    /// Returns `None` once the pipeline is gone.
    pub async fn next(&mut self) -> Option<ResultBatch> {
        loop {
            match self.rx.recv().await {
                Ok(batch) => return Some(self.newest_after(batch)),
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Search subscriber skipped {skipped} stale batches");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the newest batch already delivered, without waiting.
    pub fn try_next(&mut self) -> Option<ResultBatch> {
        let mut newest = None;
        loop {
            match self.rx.try_recv() {
                Ok(batch) => newest = Some(batch),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return newest,
            }
        }
    }

    fn newest_after(&mut self, batch: ResultBatch) -> ResultBatch {
        self.try_next().unwrap_or(batch)
    }
}

async fn run_driver(
    mut terms: watch::Receiver<String>,
    searcher: Arc<dyn HeroSearch>,
    delivery: Arc<Delivery>,
    quiet: Duration,
) {
    let mut last_accepted: Option<String> = None;

    while let Some(term) = next_debounced(&mut terms, quiet).await {
        if last_accepted.as_deref() == Some(term.as_str()) {
            debug!("Ignoring unchanged search term {term:?}");
            continue;
        }
        if delivery.subscriber_count() == 0 {
            debug!("Dropping search term {term:?}: no subscribers");
            continue;
        }

        let current = delivery.advance();
        last_accepted = Some(term.clone());
        debug!("Accepted search term {term:?} (generation {current})");

        let searcher = Arc::clone(&searcher);
        let delivery = Arc::clone(&delivery);
        tokio::spawn(async move {
            let batch = searcher.search_heroes(&term).await;
            if !delivery.deliver(current, batch) {
                debug!("Discarding superseded results for {term:?} (generation {current})");
            }
        });
    }

    debug!("Search pipeline driver stopped");
}

/// Waits for a pushed term, then for the quiet window to pass with no newer
/// push. Returns `None` when the input side is gone.
async fn next_debounced(terms: &mut watch::Receiver<String>, quiet: Duration) -> Option<String> {
    terms.changed().await.ok()?;
    loop {
        tokio::select! {
            () = tokio::time::sleep(quiet) => break,
            changed = terms.changed() => changed.ok()?,
        }
    }
    Some(terms.borrow_and_update().clone())
}
