//! User endpoints.

use od_core::error::OdResult;
use od_models::{User, UserPayload};

use crate::client::ApiClient;
use crate::response::ListEnvelope;
use crate::routes;

impl ApiClient {
    /// List all users.
    pub async fn list_users(&self) -> OdResult<Vec<User>> {
        let envelope: ListEnvelope<User> = self.get_json(routes::users::INDEX).await?;
        Ok(envelope.into_items())
    }

    /// Get a single user by id.
    pub async fn get_user(&self, id: i64) -> OdResult<User> {
        self.get_json(&routes::users::by_id(id)).await
    }

    /// Create a user. Requires a password in the payload.
    pub async fn create_user(&self, payload: &UserPayload) -> OdResult<User> {
        payload.validate()?;
        self.post_json(routes::users::INDEX, &payload.to_body()).await
    }

    /// Update a user (PATCH). Password is omitted from the body when not
    /// set.
    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> OdResult<User> {
        payload.validate()?;
        self.patch_json(&routes::users::by_id(id), &payload.to_body())
            .await
    }

    /// Delete a user.
    pub async fn delete_user(&self, id: i64) -> OdResult<()> {
        self.delete(&routes::users::by_id(id)).await?;
        Ok(())
    }
}
