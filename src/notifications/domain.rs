use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of a candidate's submission as handed over by the job board.
///
/// Text fields that are absent or `null` become empty so partial payloads still render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplicationRecord {
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub applicant_display_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub job_opening_title: String,
    #[serde(default)]
    pub salutation: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cover_letter: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl JobApplicationRecord {
    /// Salutation followed by first and last name, skipping blank parts.
    pub fn addressed_name(&self) -> String {
        [
            self.salutation.as_deref().unwrap_or_default(),
            self.first_name.as_str(),
            self.last_name.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// URL into the admin interface for one application. Treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminLink(pub String);

impl AdminLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdminLink {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The two emails produced for a new application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StaffAlert,
    ApplicantConfirmation,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::StaffAlert => "staff_alert",
            NotificationKind::ApplicantConfirmation => "applicant_confirmation",
        }
    }
}

/// Fully rendered email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub kind: NotificationKind,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}
