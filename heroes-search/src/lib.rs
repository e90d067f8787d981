//! Live search over the heroes collection.
//!
//! Turns a noisy stream of search terms (one per keystroke) into a small
//! number of ordered searches:
//!
//! 1. **Debounce**: a term is only considered once no newer term has been
//!    pushed for the quiet window (300ms by default).
//! 2. **Change filter**: a debounced term equal to the previously accepted
//!    term is dropped.
//! 3. **Supersession**: each accepted term starts one search. Results of
//!    searches started before the most recent one are discarded on arrival.
//!
//! # Example
//!
//! ```no_run
//! use heroes_client::{ClientConfig, HeroClient, MessageLog};
//! use heroes_search::{SearchConfig, SearchPipeline};
//! use std::sync::Arc;
//!
//! # async fn run() -> heroes_client::ClientResult<()> {
//! let client = HeroClient::new(ClientConfig::default(), Arc::new(MessageLog::new()))?;
//! let pipeline = SearchPipeline::spawn(Arc::new(client), SearchConfig::default());
//! let mut results = pipeline.subscribe();
//!
//! pipeline.push("m");
//! pipeline.push("ma");
//! pipeline.push("mag");
//!
//! if let Some(batch) = results.next().await {
//!     println!("{} matches", batch.len());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod pipeline;

pub use config::SearchConfig;
pub use pipeline::{ResultBatch, SearchPipeline, SearchResults};

use async_trait::async_trait;
use heroes_client::HeroClient;
use heroes_model::Hero;

/// Something that can answer a single search term.
///
/// Implementations must not fail: any error is absorbed into an empty result.
#[async_trait]
pub trait HeroSearch: Send + Sync {
    async fn search_heroes(&self, term: &str) -> Vec<Hero>;
}

#[async_trait]
impl HeroSearch for HeroClient {
    async fn search_heroes(&self, term: &str) -> Vec<Hero> {
        self.search(term).await
    }
}
