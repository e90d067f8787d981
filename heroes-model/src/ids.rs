//! Identifier type for heroes.
//!
//! Ids are integers assigned by the remote store on creation.

use crate::ModelError;
use crate::hero::Hero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier of a hero in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeroId(i64);

impl HeroId {
    /// Wraps a raw id received from the remote store.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Parses an id from a string.
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for HeroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HeroId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for HeroId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<&Hero> for HeroId {
    fn from(hero: &Hero) -> Self {
        hero.id
    }
}

impl From<Hero> for HeroId {
    fn from(hero: Hero) -> Self {
        hero.id
    }
}
