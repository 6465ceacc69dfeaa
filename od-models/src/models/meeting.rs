//! Meeting entity model, create/update payload, and transcript parse jobs.

use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use od_core::constants::job_status;
use od_core::error::{OdError, OdResult};

use super::team::Team;
use super::user::User;

lazy_static! {
    static ref MEET_ID_RE: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
}

/// A meeting as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub google_meet_id: Option<String>,
    #[serde(default)]
    pub google_doc_id: Option<String>,
    #[serde(default)]
    pub google_drive_folder_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub organizer_id: Option<i64>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub meeting_type: Option<String>,
    #[serde(default)]
    pub recurrence_pattern: Option<String>,
    #[serde(default)]
    pub recurrence_rule: Option<String>,
    #[serde(default)]
    pub series_id: Option<String>,
    #[serde(default)]
    pub original_start_time: Option<String>,
    #[serde(default)]
    pub recurrence_end_date: Option<String>,
    #[serde(default)]
    pub max_occurrences: Option<i64>,
    #[serde(default)]
    pub is_exception: Option<bool>,
    #[serde(default)]
    pub participant_count: Option<i64>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub organizer: Option<User>,
}

impl Meeting {
    /// Whether the meeting is still on the calendar.
    pub fn is_scheduled(&self) -> bool {
        self.status.as_deref() == Some(od_core::constants::meeting_status::SCHEDULED)
    }
}

/// Payload for creating or updating a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPayload {
    pub title: String,
    pub description: String,
    pub google_meet_id: String,
    pub team_id: i64,
    pub organizer_id: i64,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<String>,
}

impl MeetingPayload {
    /// Validate the payload against the dashboard form rules.
    pub fn validate(&self) -> OdResult<()> {
        if self.title.trim().len() < 3 {
            return Err(OdError::Validation(
                "title must be at least 3 characters".into(),
            ));
        }
        if self.description.trim().len() < 5 {
            return Err(OdError::Validation(
                "description must be at least 5 characters".into(),
            ));
        }
        if !MEET_ID_RE.is_match(&self.google_meet_id) {
            return Err(OdError::Validation(
                "invalid Google Meet ID format (lowercase letters, digits, dashes)".into(),
            ));
        }
        if self.start_time.trim().is_empty() || self.end_time.trim().is_empty() {
            return Err(OdError::Validation("start and end time are required".into()));
        }
        Ok(())
    }
}

/// A tracked transcript-parse job.
///
/// The browser app kept these in local-storage keys so an in-flight parse
/// survived a reload; here they live in the local store and are reloaded on
/// startup to resume polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseJob {
    /// Local tracking id.
    pub id: String,
    /// Meeting the transcript belongs to.
    pub meeting_id: i64,
    /// Backend job identifier.
    pub job_id: String,
    /// Last observed status (pending/processing/completed/failed).
    pub status: String,
    /// When tracking began (ms since epoch).
    pub created_at: i64,
    /// Last status change (ms since epoch).
    pub updated_at: i64,
}

impl ParseJob {
    /// Construct a ParseJob from a store row.
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            meeting_id: row.get("meeting_id")?,
            job_id: row.get("job_id")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Whether polling for this job should stop.
    pub fn is_terminal(&self) -> bool {
        job_status::is_terminal(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MeetingPayload {
        MeetingPayload {
            title: "Weekly sync".into(),
            description: "All-hands weekly sync".into(),
            google_meet_id: "abc-defg-hij".into(),
            team_id: 1,
            organizer_id: 7,
            start_time: "2025-06-02T10:00:00.000Z".into(),
            end_time: "2025-06-02T11:00:00.000Z".into(),
            status: None,
            meeting_type: None,
        }
    }

    #[test]
    fn test_valid_payload() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_short_title_rejected() {
        let mut p = payload();
        p.title = "ab".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_bad_meet_id_rejected() {
        let mut p = payload();
        p.google_meet_id = "ABC_DEF".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_missing_times_rejected() {
        let mut p = payload();
        p.end_time = String::new();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_meeting_envelope_fields() {
        let json = r#"{
            "id": 11, "title": "Retro", "description": "Sprint retro",
            "teamId": 2, "organizerId": 5, "status": "scheduled",
            "startTime": "2025-06-02T10:00:00.000Z",
            "endTime": "2025-06-02T11:00:00.000Z"
        }"#;
        let m: Meeting = serde_json::from_str(json).unwrap();
        assert!(m.is_scheduled());
        assert_eq!(m.team_id, Some(2));
    }

    #[test]
    fn test_parse_job_terminal() {
        let mut job = ParseJob {
            id: "local-1".into(),
            meeting_id: 11,
            job_id: "job-9".into(),
            status: "processing".into(),
            created_at: 0,
            updated_at: 0,
        };
        assert!(!job.is_terminal());
        job.status = "completed".into();
        assert!(job.is_terminal());
    }
}
