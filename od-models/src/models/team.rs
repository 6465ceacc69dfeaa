//! Team entity model and create/update payload.

use serde::{Deserialize, Serialize};

use od_core::error::{OdError, OdResult};

use super::NamedRef;

/// A team as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub code: String,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// A member row embedded in a team response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<NamedRef>,
    #[serde(default)]
    pub status: Option<NamedRef>,
}

impl TeamMember {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for creating or updating a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPayload {
    pub name: String,
    pub description: String,
    pub code: String,
    pub is_active: bool,
}

impl TeamPayload {
    /// Validate the payload against the same rules the dashboard form
    /// enforced before submission.
    pub fn validate(&self) -> OdResult<()> {
        if self.name.trim().len() < 2 {
            return Err(OdError::Validation(
                "team name must be at least 2 characters".into(),
            ));
        }
        if self.description.trim().len() < 5 {
            return Err(OdError::Validation(
                "description must be at least 5 characters".into(),
            ));
        }
        if self.code.trim().is_empty() {
            return Err(OdError::Validation("team code is required".into()));
        }
        Ok(())
    }
}
