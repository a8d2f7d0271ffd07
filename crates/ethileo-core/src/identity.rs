//! Stable entity identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Length of the canonical hyphenated form.
const HYPHENATED_LEN: usize = 36;

/// A UUID in canonical 36-character hyphenated form.
///
/// The text passed to [`Uuid::from_string`] is kept verbatim, so the value
/// renders back exactly as it was read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uuid(String);

impl Uuid {
    /// Generates a fresh random (version 4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string())
    }

    /// Parses a hyphenated UUID string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `value` is not a well-formed
    /// hyphenated UUID.
    pub fn from_string(value: &str) -> Result<Self, DomainError> {
        if value.len() != HYPHENATED_LEN || uuid::Uuid::try_parse(value).is_err() {
            return Err(DomainError::Validation(format!("Invalid UUID: {value}")));
        }
        Ok(Self(value.to_owned()))
    }

    /// Returns the string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uuid {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl TryFrom<String> for Uuid {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

impl From<Uuid> for String {
    fn from(value: Uuid) -> Self {
        value.0
    }
}
