//! Helpers for building `SessionFilter` values.

pub use crate::storage::types::SessionFilter;

/// Build a `SessionFilter` that matches sessions created by `user_id`.
///
/// An empty `user_id` yields the match-all filter, so listing "by nobody"
/// lists everything.
pub fn by_creator<S: Into<String>>(user_id: S) -> SessionFilter {
    let user_id = user_id.into();
    if user_id.is_empty() {
        SessionFilter::default()
    } else {
        SessionFilter {
            created_by_id: Some(user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_creator_matches_everything() {
        assert_eq!(by_creator(""), SessionFilter::default());
    }

    #[test]
    fn creator_is_kept() {
        assert_eq!(by_creator("u1").created_by_id.as_deref(), Some("u1"));
    }
}
