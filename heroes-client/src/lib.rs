//! Data-access layer for the remote heroes collection.
//!
//! - [`HeroClient`] — typed CRUD and search operations that never fail from
//!   the caller's point of view
//! - [`NotificationSink`] / [`MessageLog`] — the append-only outcome log the
//!   client writes to
//! - [`ClientConfig`] — endpoint and client settings
//!
//! # Example
//!
//! ```no_run
//! use heroes_client::{ClientConfig, HeroClient, MessageLog, NotificationSink};
//! use std::sync::Arc;
//!
//! # async fn run() -> heroes_client::ClientResult<()> {
//! let log = Arc::new(MessageLog::new());
//! let client = HeroClient::new(ClientConfig::default(), log.clone())?;
//!
//! let heroes = client.list().await;
//! println!("{} heroes", heroes.len());
//! for entry in log.current_entries() {
//!     println!("{entry}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod notifications;

pub use client::{HeroClient, Operation};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, FailureKind};
pub use notifications::{MessageLog, Notification, NotificationSink};

pub use heroes_model::{Hero, HeroDraft, HeroId};
