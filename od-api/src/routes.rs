//! Backend route table.
//!
//! Mirrors the backend's REST paths in one place so endpoint modules and
//! the public-endpoint allow-list stay consistent.

pub mod auth {
    pub const LOGIN: &str = "/auth/email/login";
    pub const REFRESH: &str = "/auth/refresh";
}

pub mod teams {
    pub const INDEX: &str = "/teams";

    pub fn by_id(id: i64) -> String {
        format!("{INDEX}/{id}")
    }
}

pub mod users {
    pub const INDEX: &str = "/users";

    pub fn by_id(id: i64) -> String {
        format!("{INDEX}/{id}")
    }
}

pub mod meetings {
    pub const INDEX: &str = "/meetings";

    pub fn by_id(id: i64) -> String {
        format!("{INDEX}/{id}")
    }

    pub fn parse_transcript(id: i64) -> String {
        format!("{INDEX}/{id}/parse-transcript")
    }

    pub fn parse_status(id: i64, job_id: &str) -> String {
        format!("{INDEX}/{id}/parse-status?jobId={job_id}")
    }
}

pub mod whatsapp {
    pub const INDEX: &str = "/whatsapp-messages";
}

pub mod chatbot {
    pub const INDEX: &str = "/chatbot";

    pub fn history_for_user(user_id: i64) -> String {
        format!("{INDEX}/user/{user_id}")
    }
}

/// Endpoints that are sent without an Authorization header even when a
/// session exists. The refresh endpoint carries the refresh token itself.
pub const PUBLIC_ENDPOINTS: &[&str] = &[auth::LOGIN, auth::REFRESH];

/// Whether a request path hits a public (unauthenticated) endpoint.
pub fn is_public(path: &str) -> bool {
    PUBLIC_ENDPOINTS
        .iter()
        .any(|endpoint| path.contains(endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_is_public() {
        assert!(is_public(auth::LOGIN));
        assert!(is_public(auth::REFRESH));
    }

    #[test]
    fn test_entity_routes_are_private() {
        assert!(!is_public(teams::INDEX));
        assert!(!is_public(&users::by_id(3)));
        assert!(!is_public(&meetings::parse_status(4, "job-1")));
    }

    #[test]
    fn test_public_match_with_query() {
        assert!(is_public("/auth/refresh?source=cli"));
    }

    #[test]
    fn test_route_builders() {
        assert_eq!(teams::by_id(7), "/teams/7");
        assert_eq!(meetings::parse_transcript(4), "/meetings/4/parse-transcript");
        assert_eq!(
            meetings::parse_status(4, "j-9"),
            "/meetings/4/parse-status?jobId=j-9"
        );
        assert_eq!(chatbot::history_for_user(2), "/chatbot/user/2");
    }
}
