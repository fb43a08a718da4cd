use uuid::Uuid;

use crate::models::{Role, SessionRecord};
use crate::navigation::paths;

/// Landing path for each role after a successful login.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Learner => paths::DASHBOARD,
        Role::Instructor => paths::ADMIN_COURSES,
        Role::Admin => paths::ADMIN_ANALYTICS,
    }
}

/// Identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub role: Role,
}

impl From<&SessionRecord> for SessionIdentity {
    fn from(record: &SessionRecord) -> Self {
        Self {
            session_id: record.id,
            user_id: record.user_id,
            first_name: record.first_name.clone(),
            role: record.role,
        }
    }
}

/// Session
///
/// The per-request session value handed to every navigation decision. It is
/// never mutated in place: logging in or out consumes the current value and
/// yields a `Transition` carrying the next one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(SessionIdentity),
}

/// The outcome of a session state change: the new session plus the one
/// navigation the client must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: Session,
    pub navigate_to: &'static str,
}

impl Session {
    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity.role),
        }
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Role used for display only. Not an authorization input.
    pub fn display_role(&self) -> Role {
        self.role().unwrap_or(Role::Learner)
    }

    /// Replaces the current session with `identity` and navigates to the
    /// landing path of its role.
    pub fn login(self, identity: SessionIdentity) -> Transition {
        let navigate_to = landing_path(identity.role);
        Transition {
            session: Session::Authenticated(identity),
            navigate_to,
        }
    }

    pub fn logout(self) -> Transition {
        Transition {
            session: Session::Anonymous,
            navigate_to: paths::LOGIN,
        }
    }
}
