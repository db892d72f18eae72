use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Learning progress of a single word.
///
/// Words start as `Pending`, move to `InProgress` once their first exercise is
/// answered and end as `Learned`. The textual form (`pending`, `in_progress`,
/// `learned`) is what gets persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnStatus {
    Pending,
    InProgress,
    Learned,
}

impl Default for LearnStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl LearnStatus {
    pub const ALL: [LearnStatus; 3] = [Self::Pending, Self::InProgress, Self::Learned];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Learned => "learned",
        }
    }

    pub fn can_transition_to(self, target: LearnStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::InProgress) | (Self::InProgress, Self::Learned)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Learned)
    }
}

impl fmt::Display for LearnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown learn status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for LearnStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "learned" => Ok(Self::Learned),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
