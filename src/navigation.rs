use crate::models::{NavLink, Role, ViewResponse};

/// Navigable paths.
pub mod paths {
    pub const LANDING: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const SIGNUP: &str = "/signup";
    pub const DASHBOARD: &str = "/dashboard";
    pub const ADMIN_COURSES: &str = "/admin/courses";
    pub const ADMIN_ANALYTICS: &str = "/admin/analytics";
    pub const LOGOUT: &str = "/api/auth/logout";
}

/// ViewKind
///
/// The leaf views a path can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Landing,
    Login,
    Signup,
    Dashboard,
    CourseManager,
    Analytics,
}

impl ViewKind {
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Landing => "landing",
            ViewKind::Login => "login",
            ViewKind::Signup => "signup",
            ViewKind::Dashboard => "dashboard",
            ViewKind::CourseManager => "courseManager",
            ViewKind::Analytics => "analytics",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewKind::Landing => "LearnHub",
            ViewKind::Login => "Welcome Back",
            ViewKind::Signup => "Create Account",
            ViewKind::Dashboard => "Learner Dashboard",
            ViewKind::CourseManager => "Manage Courses",
            ViewKind::Analytics => "Course Analytics",
        }
    }

    fn links(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ViewKind::Landing => &[("Login", paths::LOGIN), ("Sign Up", paths::SIGNUP)],
            ViewKind::Login => &[("Sign up", paths::SIGNUP)],
            ViewKind::Signup => &[("Log In", paths::LOGIN)],
            ViewKind::Dashboard => &[("Logout", paths::LOGOUT)],
            ViewKind::CourseManager | ViewKind::Analytics => &[],
        }
    }
}

/// Guard
///
/// Access rule attached to a route-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Reachable with or without a session.
    Open,
    /// Only the given role renders the view; everyone else is sent to `otherwise`.
    RequireRole {
        role: Role,
        otherwise: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub view: ViewKind,
    pub guard: Guard,
}

/// Every path LearnHub navigates to. Fixed at compile time.
pub const ROUTE_TABLE: &[RouteEntry] = &[
    RouteEntry {
        path: paths::LANDING,
        view: ViewKind::Landing,
        guard: Guard::Open,
    },
    RouteEntry {
        path: paths::LOGIN,
        view: ViewKind::Login,
        guard: Guard::Open,
    },
    RouteEntry {
        path: paths::SIGNUP,
        view: ViewKind::Signup,
        guard: Guard::Open,
    },
    // The session role is only a display default here.
    RouteEntry {
        path: paths::DASHBOARD,
        view: ViewKind::Dashboard,
        guard: Guard::Open,
    },
    RouteEntry {
        path: paths::ADMIN_COURSES,
        view: ViewKind::CourseManager,
        guard: Guard::RequireRole {
            role: Role::Instructor,
            otherwise: paths::LOGIN,
        },
    },
    RouteEntry {
        path: paths::ADMIN_ANALYTICS,
        view: ViewKind::Analytics,
        guard: Guard::RequireRole {
            role: Role::Admin,
            otherwise: paths::LOGIN,
        },
    },
];

/// A view ready to render, with the role it should display (dashboard only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Login,
    Signup,
    Dashboard { display_role: Role },
    CourseManager,
    Analytics,
}

impl View {
    pub fn kind(&self) -> ViewKind {
        match self {
            View::Landing => ViewKind::Landing,
            View::Login => ViewKind::Login,
            View::Signup => ViewKind::Signup,
            View::Dashboard { .. } => ViewKind::Dashboard,
            View::CourseManager => ViewKind::CourseManager,
            View::Analytics => ViewKind::Analytics,
        }
    }

    pub fn display_role(&self) -> Option<Role> {
        match self {
            View::Dashboard { display_role } => Some(*display_role),
            _ => None,
        }
    }

    /// Builds the response body for this view as seen by `role`. `first_name`
    /// only reaches the dashboard.
    pub fn to_response(&self, path: &str, role: Option<Role>, first_name: Option<&str>) -> ViewResponse {
        let kind = self.kind();
        let first_name = match self {
            View::Dashboard { .. } => first_name.map(str::to_string),
            _ => None,
        };
        ViewResponse {
            view: kind.name().to_string(),
            path: path.to_string(),
            title: kind.title().to_string(),
            role,
            display_role: self.display_role(),
            first_name,
            links: kind
                .links()
                .iter()
                .map(|(label, path)| NavLink {
                    label: label.to_string(),
                    path: path.to_string(),
                })
                .collect(),
        }
    }
}

/// Why a guarded path refused to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No session role at all.
    Unauthenticated,
    /// Authenticated, but as a different role than the route requires.
    RoleMismatch { required: Role, actual: Role },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render(View),
    Redirect {
        to: &'static str,
        reason: DenyReason,
    },
}

pub fn lookup(path: &str) -> Option<&'static RouteEntry> {
    ROUTE_TABLE.iter().find(|entry| entry.path == path)
}

/// resolve
///
/// Decides what a navigation to `path` produces for the given session role.
/// Returns `None` for paths outside `ROUTE_TABLE`. Pure: the same inputs always
/// give the same decision.
pub fn resolve(path: &str, role: Option<Role>) -> Option<Decision> {
    let entry = lookup(path)?;

    if let Guard::RequireRole {
        role: required,
        otherwise,
    } = entry.guard
    {
        match role {
            Some(actual) if actual == required => {}
            Some(actual) => {
                return Some(Decision::Redirect {
                    to: otherwise,
                    reason: DenyReason::RoleMismatch { required, actual },
                });
            }
            None => {
                return Some(Decision::Redirect {
                    to: otherwise,
                    reason: DenyReason::Unauthenticated,
                });
            }
        }
    }

    let view = match entry.view {
        ViewKind::Landing => View::Landing,
        ViewKind::Login => View::Login,
        ViewKind::Signup => View::Signup,
        ViewKind::Dashboard => View::Dashboard {
            display_role: role.unwrap_or(Role::Learner),
        },
        ViewKind::CourseManager => View::CourseManager,
        ViewKind::Analytics => View::Analytics,
    };
    Some(Decision::Render(view))
}
