use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Candidate as listed by the upstream API. Only the identifier is needed to
/// walk into the candidate's panels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    pub id: String,
}

/// A named group of interviews held for one candidate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Panel {
    #[serde(default)]
    pub interviews: Vec<Interview>,
}

/// Cancellation marker as sent upstream. Only an explicit `null` means the
/// interview went ahead; a record without the field is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cancellation {
    #[default]
    Unreported,
    NotCanceled,
    CanceledAt(DateTime<Utc>),
}

impl Cancellation {
    pub fn is_unreported(&self) -> bool {
        matches!(self, Cancellation::Unreported)
    }
}

impl Serialize for Cancellation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cancellation::CanceledAt(at) => serializer.serialize_i64(at.timestamp_millis()),
            Cancellation::NotCanceled | Cancellation::Unreported => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Cancellation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            match chrono::serde::ts_milliseconds_option::deserialize(deserializer)? {
                Some(at) => Cancellation::CanceledAt(at),
                None => Cancellation::NotCanceled,
            },
        )
    }
}

/// Single interview slot. Timestamps arrive as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(default, skip_serializing_if = "Cancellation::is_unreported")]
    pub canceled_at: Cancellation,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub interviewers: Vec<Interviewer>,
}

impl Interview {
    pub fn occurred(&self) -> bool {
        self.canceled_at == Cancellation::NotCanceled
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interviewer {
    pub email: String,
}

/// Person submitted by the caller for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub email: String,
    pub username: String,
}

/// Outcome for one person. `date_granted` is present only for grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRecord {
    pub username: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_iso_millis"
    )]
    pub date_granted: Option<DateTime<Utc>>,
}

impl DecisionRecord {
    pub fn granted(username: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            date_granted: Some(date),
        }
    }

    pub fn revoked(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            date_granted: None,
        }
    }
}

/// Response body for a review: who gains the privilege and who loses it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessDecisions {
    pub grant_to: Vec<DecisionRecord>,
    pub revoke_from: Vec<DecisionRecord>,
}

/// Renders `2024-01-05T00:00:00.000Z`.
pub fn iso_millis(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_iso_millis<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.serialize_str(&iso_millis(date)),
        None => serializer.serialize_none(),
    }
}
