//! HTTP client for the heroes collection.
//!
//! Every public operation completes with a value. Failures of any kind are
//! logged through `tracing`, summarized into one notification, and replaced
//! by the operation's fallback (empty list, `None`, or `()`).
//!
//! Operations are plain `async fn`s: building the future performs no I/O,
//! the request is only sent once the future is awaited.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::notifications::NotificationSink;
use heroes_model::{Hero, HeroDraft, HeroId};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Names the operation in notifications and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListHeroes,
    GetHero,
    AddHero,
    UpdateHero,
    DeleteHero,
    SearchHeroes,
}

impl Operation {
    pub const fn name(self) -> &'static str {
        match self {
            Operation::ListHeroes => "list_heroes",
            Operation::GetHero => "get_hero",
            Operation::AddHero => "add_hero",
            Operation::UpdateHero => "update_hero",
            Operation::DeleteHero => "delete_hero",
            Operation::SearchHeroes => "search_heroes",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed CRUD client for the remote heroes collection.
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// notification sink.
#[derive(Clone)]
pub struct HeroClient {
    config: Arc<ClientConfig>,
    http: Client,
    log: Arc<dyn NotificationSink>,
}

impl fmt::Debug for HeroClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeroClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HeroClient {
    /// Creates a client that records outcomes into `log`.
    pub fn new(config: ClientConfig, log: Arc<dyn NotificationSink>) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http, log))
    }

    /// Creates a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        config: ClientConfig,
        http: Client,
        log: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            http,
            log,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The sink this client writes to.
    pub fn notifications(&self) -> &Arc<dyn NotificationSink> {
        &self.log
    }

    // ── Public operations ────────────────────────────────────────

    /// Fetches every hero. Falls back to an empty list.
    pub async fn list(&self) -> Vec<Hero> {
        let result = self.fetch_all().await;
        self.recover(Operation::ListHeroes, result, Vec::new())
    }

    /// Fetches one hero. Falls back to `None`, including when the hero does
    /// not exist.
    pub async fn get(&self, id: HeroId) -> Option<Hero> {
        let result = self.fetch_one(id).await.map(Some);
        self.recover(Operation::GetHero, result, None)
    }

    /// Submits a draft; returns the stored hero carrying its assigned id.
    pub async fn create(&self, draft: &HeroDraft) -> Option<Hero> {
        let result = self.post_draft(draft).await.map(Some);
        self.recover(Operation::AddHero, result, None)
    }

    /// Replaces the stored state of `hero`, keyed by its id.
    pub async fn update(&self, hero: &Hero) {
        let result = self.put_hero(hero).await;
        self.recover(Operation::UpdateHero, result, ())
    }

    /// Deletes a hero given either its id or the hero itself.
    ///
    /// Returns the deleted hero when the remote echoes it back, `None` when
    /// the response has no body or the call failed.
    pub async fn delete(&self, target: impl Into<HeroId>) -> Option<Hero> {
        let result = self.delete_by_id(target.into()).await;
        self.recover(Operation::DeleteHero, result, None)
    }

    /// Fetches heroes whose name contains `term`.
    ///
    /// A term that is blank after trimming returns an empty list immediately
    /// without contacting the remote and without a notification.
    pub async fn search(&self, term: &str) -> Vec<Hero> {
        if term.trim().is_empty() {
            debug!("Skipping search for blank term");
            return Vec::new();
        }
        let result = self.search_by_name(term).await;
        self.recover(Operation::SearchHeroes, result, Vec::new())
    }

    // ── Requests ─────────────────────────────────────────────────

    async fn fetch_all(&self) -> ClientResult<Vec<Hero>> {
        let response = self.http.get(self.config.collection_url()).send().await?;
        let heroes: Vec<Hero> = decode(response).await?;
        self.notify("fetched heroes");
        Ok(heroes)
    }

    async fn fetch_one(&self, id: HeroId) -> ClientResult<Hero> {
        let response = self.http.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }
        let hero: Hero = decode(response).await?;
        self.notify(format!("fetched hero id={id}"));
        Ok(hero)
    }

    async fn post_draft(&self, draft: &HeroDraft) -> ClientResult<Hero> {
        let response = self
            .http
            .post(self.config.collection_url())
            .json(draft)
            .send()
            .await?;
        let hero: Hero = decode(response).await?;
        self.notify(format!("added hero w/ id={}", hero.id));
        Ok(hero)
    }

    async fn put_hero(&self, hero: &Hero) -> ClientResult<()> {
        let response = self
            .http
            .put(self.config.collection_url())
            .json(hero)
            .send()
            .await?;
        check_status(response).await?;
        self.notify(format!("updated hero id={}", hero.id));
        Ok(())
    }

    async fn delete_by_id(&self, id: HeroId) -> ClientResult<Option<Hero>> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id));
        }
        let body = check_status(response).await?.bytes().await?;
        let deleted = if body.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            serde_json::from_slice::<Option<Hero>>(&body)?
        };
        self.notify(format!("deleted hero id={id}"));
        Ok(deleted)
    }

    async fn search_by_name(&self, term: &str) -> ClientResult<Vec<Hero>> {
        let response = self
            .http
            .get(self.config.collection_url())
            .query(&[("name", term)])
            .send()
            .await?;
        let heroes: Vec<Hero> = decode(response).await?;
        if heroes.is_empty() {
            self.notify(format!("no heroes matching \"{term}\""));
        } else {
            self.notify(format!("found heroes matching \"{term}\""));
        }
        Ok(heroes)
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn item_url(&self, id: HeroId) -> String {
        format!("{}/{id}", self.config.collection_url())
    }

    fn notify(&self, message: impl fmt::Display) {
        self.log
            .append(format!("{}: {message}", self.config.service_name));
    }

    /// Converts a failed request into `fallback`, leaving a trace in the
    /// diagnostic log and one entry in the notification sink.
    fn recover<T>(&self, operation: Operation, result: ClientResult<T>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                error!(
                    "{} {operation} failed ({:?}): {e:?}",
                    self.config.service_name,
                    e.kind()
                );
                self.notify(format_args!("{operation} failed: {e}"));
                fallback
            }
        }
    }
}

async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let body = check_status(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
