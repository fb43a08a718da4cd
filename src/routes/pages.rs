use crate::{AppState, handlers, navigation::ROUTE_TABLE};
use axum::{Router, routing::get};

/// Page Router Module
///
/// Registers every path of the navigation route table against the single
/// `render_page` handler. Guards are not applied here: the table decides per
/// request whether a path renders or redirects.
pub fn page_routes() -> Router<AppState> {
    ROUTE_TABLE
        .iter()
        .fold(Router::new(), |router, entry| {
            router.route(entry.path, get(handlers::render_page))
        })
}
