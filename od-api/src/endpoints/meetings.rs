//! Meeting endpoints, including transcript-parse jobs.

use od_core::error::OdResult;
use od_models::{Meeting, MeetingPayload};

use crate::client::ApiClient;
use crate::response::{ListEnvelope, ParseJobStarted, ParseJobStatus};
use crate::routes;

impl ApiClient {
    /// List all meetings. The backend wraps this list in a `data`
    /// envelope.
    pub async fn list_meetings(&self) -> OdResult<Vec<Meeting>> {
        let envelope: ListEnvelope<Meeting> = self.get_json(routes::meetings::INDEX).await?;
        Ok(envelope.into_items())
    }

    /// Get a single meeting by id (bare object, no envelope).
    pub async fn get_meeting(&self, id: i64) -> OdResult<Meeting> {
        self.get_json(&routes::meetings::by_id(id)).await
    }

    /// Create a meeting.
    pub async fn create_meeting(&self, payload: &MeetingPayload) -> OdResult<Meeting> {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        self.post_json(routes::meetings::INDEX, &body).await
    }

    /// Update a meeting (PATCH).
    pub async fn update_meeting(&self, id: i64, payload: &MeetingPayload) -> OdResult<Meeting> {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        self.patch_json(&routes::meetings::by_id(id), &body).await
    }

    /// Delete a meeting.
    pub async fn delete_meeting(&self, id: i64) -> OdResult<()> {
        self.delete(&routes::meetings::by_id(id)).await?;
        Ok(())
    }

    /// Kick off transcript parsing for a meeting. Returns the backend job
    /// id to poll.
    pub async fn start_transcript_parse(&self, meeting_id: i64) -> OdResult<ParseJobStarted> {
        self.post_json(
            &routes::meetings::parse_transcript(meeting_id),
            &serde_json::json!({}),
        )
        .await
    }

    /// Poll the status of a transcript-parse job.
    pub async fn transcript_parse_status(
        &self,
        meeting_id: i64,
        job_id: &str,
    ) -> OdResult<ParseJobStatus> {
        self.get_json(&routes::meetings::parse_status(meeting_id, job_id))
            .await
    }
}
