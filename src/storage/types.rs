use serde::{Deserialize, Serialize};

/// Reserved `created_by_id` value for sessions with no authenticated creator.
pub const ANONYMOUS_CREATOR_ID: &str = "anonymous";

/// Metadata about one recorded session.
///
/// `id` is zero until a store assigns one on first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub published_date: String,
    #[serde(rename = "videoURL")]
    pub video_url: String,
    pub description: String,
    pub created_by: String,
    #[serde(rename = "createdByID")]
    pub created_by_id: String,
}

impl Session {
    /// Name to show for the creator of this session.
    pub fn created_by_display_name(&self) -> &str {
        if self.created_by_id == ANONYMOUS_CREATOR_ID {
            "Anonymous"
        } else {
            &self.created_by
        }
    }

    pub fn set_creator_anonymous(&mut self) {
        self.created_by.clear();
        self.created_by_id = ANONYMOUS_CREATOR_ID.to_string();
    }

    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Equality filter applied by the list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    pub created_by_id: Option<String>,
}

impl SessionFilter {
    pub fn matches(&self, session: &Session) -> bool {
        match &self.created_by_id {
            Some(id) => &session.created_by_id == id,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_creator_always_displays_as_anonymous() {
        let session = Session {
            created_by: "Mallory".into(),
            created_by_id: ANONYMOUS_CREATOR_ID.into(),
            ..Default::default()
        };
        assert_eq!(session.created_by_display_name(), "Anonymous");
    }

    #[test]
    fn named_creator_displays_stored_name() {
        let session = Session {
            created_by: "Ada".into(),
            created_by_id: "u1".into(),
            ..Default::default()
        };
        assert_eq!(session.created_by_display_name(), "Ada");
    }

    #[test]
    fn set_creator_anonymous_clears_name() {
        let mut session = Session {
            created_by: "Ada".into(),
            created_by_id: "u1".into(),
            ..Default::default()
        };
        session.set_creator_anonymous();
        assert_eq!(session.created_by, "");
        assert_eq!(session.created_by_id, ANONYMOUS_CREATOR_ID);
        assert_eq!(session.created_by_display_name(), "Anonymous");
    }

    #[test]
    fn json_uses_form_field_names() {
        let session = Session {
            id: 3,
            video_url: "https://example.com/v.mp4".into(),
            created_by_id: "u1".into(),
            published_date: "2024-05-01".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["videoURL"], "https://example.com/v.mp4");
        assert_eq!(json["createdByID"], "u1");
        assert_eq!(json["publishedDate"], "2024-05-01");
    }

    #[test]
    fn filter_matches_on_creator() {
        let session = Session {
            created_by_id: "u1".into(),
            ..Default::default()
        };
        assert!(SessionFilter::default().matches(&session));
        let f = SessionFilter {
            created_by_id: Some("u1".into()),
        };
        assert!(f.matches(&session));
        let f = SessionFilter {
            created_by_id: Some("u2".into()),
        };
        assert!(!f.matches(&session));
    }
}
