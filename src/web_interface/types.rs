use serde::{Deserialize, Serialize};

use crate::storage::types::Session;

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// A session as returned by the JSON API, with the derived creator name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse<'a> {
    #[serde(flatten)]
    pub session: &'a Session,
    pub created_by_display_name: &'a str,
}

impl<'a> From<&'a Session> for SessionResponse<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            session,
            created_by_display_name: session.created_by_display_name(),
        }
    }
}

/// Query string accepted by `GET /sessions`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Only list sessions created by this user ID
    pub created_by: Option<String>,
}
