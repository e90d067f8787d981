//! Entity model for the heroes resource collection.
//!
//! Defines the records exchanged with the remote store:
//! - [`HeroId`] — identifier assigned by the remote store, never by the client
//! - [`Hero`] — an authoritative record returned by the remote store
//! - [`HeroDraft`] — a pending creation, carrying no id at all
//!
//! Only values decoded from a remote response are [`Hero`]s. Anything the
//! client builds itself before the store has assigned an id is a
//! [`HeroDraft`], so a draft can never be mistaken for a persisted record.

mod hero;
mod ids;

pub use hero::{Hero, HeroDraft};
pub use ids::HeroId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while building model values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("hero name must not be empty")]
    EmptyName,

    #[error("invalid hero id: {0}")]
    InvalidId(String),
}
