use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SubjectId);

/// Identifier of a feed candidate. The backend has issued both numeric ids
/// and prefixed string ids (`"evt_3"`), so both are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for CandidateId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CandidateId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Which discovery feed a session browses: leisure activities ("matcha") or
/// professional opportunities ("coffee").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    #[default]
    Matcha,
    Coffee,
}

impl FeedMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matcha => "matcha",
            Self::Coffee => "coffee",
        }
    }

    pub fn is_matcha(self) -> bool {
        matches!(self, Self::Matcha)
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Matcha => Self::Coffee,
            Self::Coffee => Self::Matcha,
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feed mode '{0}' (expected 'matcha' or 'coffee')")]
pub struct ParseFeedModeError(pub String);

impl FromStr for FeedMode {
    type Err = ParseFeedModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "matcha" => Ok(Self::Matcha),
            "coffee" => Ok(Self::Coffee),
            _ => Err(ParseFeedModeError(s.to_string())),
        }
    }
}

/// Outcome of presenting one candidate. Travels as `"left"`/`"right"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    #[serde(rename = "left")]
    Reject,
    #[serde(rename = "right")]
    Accept,
}

impl SwipeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "left",
            Self::Accept => "right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only fields of a candidate. Never consulted for control flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub payload: CandidatePayload,
}

impl Candidate {
    pub fn new(id: impl Into<CandidateId>, payload: CandidatePayload) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }
}
