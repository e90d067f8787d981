use crate::{HeroId, ModelError, Result};
use serde::{Deserialize, Serialize};

/// A hero as stored by the remote collection.
///
/// The `id` is authoritative: it was assigned by the store and arrives in a
/// response body. Use [`HeroDraft`] for a hero that does not exist yet.
///
/// Decoding rejects a name that is blank after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StoredHero")]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
}

impl Hero {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: HeroId::new(id),
            name: name.into(),
        }
    }

    /// Returns a copy of this hero with a new name, keeping the id.
    ///
    /// The name is trimmed and must not be empty.
    pub fn renamed(&self, name: &str) -> Result<Self> {
        Ok(Self {
            id: self.id,
            name: validated_name(name)?,
        })
    }
}

/// Wire shape of a hero before its name has been checked.
#[derive(Deserialize)]
struct StoredHero {
    id: HeroId,
    name: String,
}

impl TryFrom<StoredHero> for Hero {
    type Error = ModelError;

    fn try_from(stored: StoredHero) -> Result<Self> {
        if stored.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(Self {
            id: stored.id,
            name: stored.name,
        })
    }
}

/// A hero pending creation. Serializes without an `id` field so the remote
/// store is the one to assign it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroDraft {
    name: String,
}

impl HeroDraft {
    /// Builds a draft from user input. Leading and trailing whitespace is
    /// dropped; a name that is empty afterwards is rejected.
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: validated_name(name)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validated_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::EmptyName);
    }
    Ok(trimmed.to_string())
}
