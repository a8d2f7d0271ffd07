//! Event publication status.

use std::fmt;
use std::str::FromStr;

use ethileo_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Publication status of an event. Any status may move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Not yet visible to guests.
    #[default]
    Draft,
    /// Visible to guests.
    Published,
    /// Retired; kept for history.
    Archived,
}

impl EventStatus {
    /// The stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::Validation(format!(
                "unknown event status: {other}"
            ))),
        }
    }
}
