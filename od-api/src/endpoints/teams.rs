//! Team endpoints.

use od_core::error::OdResult;
use od_models::{Team, TeamPayload};

use crate::client::ApiClient;
use crate::response::ListEnvelope;
use crate::routes;

impl ApiClient {
    /// List all teams.
    pub async fn list_teams(&self) -> OdResult<Vec<Team>> {
        let envelope: ListEnvelope<Team> = self.get_json(routes::teams::INDEX).await?;
        Ok(envelope.into_items())
    }

    /// Get a single team by id.
    pub async fn get_team(&self, id: i64) -> OdResult<Team> {
        self.get_json(&routes::teams::by_id(id)).await
    }

    /// Create a team. The payload is validated before any network call.
    pub async fn create_team(&self, payload: &TeamPayload) -> OdResult<Team> {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        self.post_json(routes::teams::INDEX, &body).await
    }

    /// Update a team (PATCH, per the backend's conventions).
    pub async fn update_team(&self, id: i64, payload: &TeamPayload) -> OdResult<Team> {
        payload.validate()?;
        let body = serde_json::to_value(payload)?;
        self.patch_json(&routes::teams::by_id(id), &body).await
    }

    /// Delete a team.
    pub async fn delete_team(&self, id: i64) -> OdResult<()> {
        self.delete(&routes::teams::by_id(id)).await?;
        Ok(())
    }
}
