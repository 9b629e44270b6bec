//! Explicit session context for the logged-in user.
//!
//! A [`Session`] only comes into existence from a successful login and is
//! dropped on logout. Components receive it as an argument rather than
//! reading ambient storage.

use crate::types::{LoginResponse, PersonProfile};

/// Credentials and profile of a logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    username: String,
    profile: Option<PersonProfile>,
}

impl Session {
    /// Build a session from a login response.
    ///
    /// `login` is the name the user typed; it is used when the backend
    /// does not echo a username back.
    pub fn from_login(login: &str, response: LoginResponse) -> Self {
        Self {
            token: response.access_token,
            username: response.username.unwrap_or_else(|| login.to_string()),
            profile: response.person,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn profile(&self) -> Option<&PersonProfile> {
        self.profile.as_ref()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Profile name when known, login name otherwise.
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .map(PersonProfile::display_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.username.clone())
    }
}

/// Login state of one client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    /// Start a session, replacing any previous one.
    pub fn begin(&mut self, session: Session) {
        *self = SessionState::Authenticated(session);
    }

    /// End the session. Returns the session that was active, if any.
    pub fn end(&mut self) -> Option<Session> {
        match std::mem::take(self) {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(username: Option<&str>, person: Option<PersonProfile>) -> LoginResponse {
        LoginResponse {
            access_token: "tok".to_string(),
            token_type: "bearer".to_string(),
            username: username.map(str::to_string),
            person,
        }
    }

    #[test]
    fn test_session_prefers_backend_username() {
        let session = Session::from_login("typed", response(Some("admin"), None));
        assert_eq!(session.username(), "admin");
        assert_eq!(session.bearer(), "Bearer tok");
    }

    #[test]
    fn test_session_falls_back_to_typed_login() {
        let session = Session::from_login("typed", response(None, None));
        assert_eq!(session.username(), "typed");
        assert_eq!(session.display_name(), "typed");
    }

    #[test]
    fn test_display_name_uses_profile() {
        let profile = PersonProfile {
            first_name: Some("Anna".to_string()),
            last_name: Some("Rossi".to_string()),
            father_name: Some("Marco".to_string()),
        };
        let session = Session::from_login("anna", response(None, Some(profile)));
        assert_eq!(session.display_name(), "Anna Rossi Marco");
    }

    #[test]
    fn test_state_lifecycle() {
        let mut state = SessionState::default();
        assert!(!state.is_authenticated());
        assert!(state.end().is_none());

        state.begin(Session::from_login("a", response(None, None)));
        assert!(state.is_authenticated());
        assert_eq!(state.session().map(Session::token), Some("tok"));

        let ended = state.end();
        assert!(ended.is_some());
        assert_eq!(state, SessionState::Anonymous);
    }
}
