use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    Candidate, CandidateId, CandidatePayload, FeedMode, SubjectId, SwipeDirection,
};

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An event as the backend returns it from `GET /events` and `POST /events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: CandidateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// Feed modes this event is listed under, by name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mode: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl EventRecord {
    /// Events that list no mode are shown in both feeds.
    pub fn is_listed_in(&self, mode: FeedMode) -> bool {
        self.mode.is_empty()
            || self
                .mode
                .iter()
                .any(|listed| listed.trim().eq_ignore_ascii_case(mode.as_str()))
    }

    pub fn into_candidate(self) -> Candidate {
        Candidate {
            id: self.id,
            payload: CandidatePayload {
                title: self.title.unwrap_or_default(),
                description: self.description,
                tags: self.tags,
                image_url: self.image_url,
            },
        }
    }
}

impl From<EventRecord> for Candidate {
    fn from(value: EventRecord) -> Self {
        value.into_candidate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeRequest {
    pub user_id: SubjectId,
    pub event_id: CandidateId,
    pub direction: SwipeDirection,
    pub view_start: DateTime<Utc>,
    pub view_end: DateTime<Utc>,
    pub matcha_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCreateRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub matcha_mode: bool,
}
