//! Object identifiers as used by Xcode project manifests.
//!
//! An identifier is 24 uppercase hexadecimal digits (96 bits). Uniqueness is
//! only probabilistic; [`IdGenerator::next_unique`] additionally retries
//! against the identifiers already present in one manifest.

use std::{collections::HashSet, fmt::Display, str::FromStr};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of hex digits in an identifier.
pub const ID_LEN: usize = 24;

/// A validated manifest object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `s` has the shape of an identifier.
    pub fn is_valid(s: &str) -> bool {
        s.len() == ID_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'))
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ObjectId::is_valid(s) {
            Ok(ObjectId(s.to_string()))
        } else {
            Err(Error::InvalidIdentifier(s.to_string()))
        }
    }
}

impl TryFrom<String> for ObjectId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if ObjectId::is_valid(&value) {
            Ok(ObjectId(value))
        } else {
            Err(Error::InvalidIdentifier(value))
        }
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Random identifier source.
pub struct IdGenerator {
    rng: StdRng,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produces a fresh identifier without checking for collisions.
    pub fn next_id(&mut self) -> ObjectId {
        let mut bytes = [0u8; ID_LEN / 2];
        self.rng.fill_bytes(&mut bytes);
        ObjectId(hex::encode_upper(bytes))
    }

    /// Produces an identifier that is not in `taken`.
    pub fn next_unique(&mut self, taken: &HashSet<ObjectId>) -> ObjectId {
        loop {
            let id = self.next_id();
            if !taken.contains(&id) {
                return id;
            }
            tracing::debug!(%id, "identifier collision, retrying");
        }
    }
}
