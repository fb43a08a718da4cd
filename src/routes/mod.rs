/// Router Module Index
///
/// Splits the HTTP surface by access level. Page routes are generated from the
/// navigation route table and decide access per request; the API routers are
/// split into public and session-protected groups.

/// Navigable pages, one route per `ROUTE_TABLE` entry.
pub mod pages;

/// Routes reachable without a session (health, login, signup, session probe).
pub mod public;

/// Routes behind the `AuthUser` middleware layer.
pub mod authenticated;
