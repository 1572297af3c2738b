// --- File: crates/calboard_calendly/src/routes.rs ---

use crate::handlers::{
    auth_callback_handler, auth_start_handler, create_professional_handler,
    delete_professional_handler, list_professionals_handler, organization_events_csv_handler,
    organization_events_handler, professional_events_csv_handler, professional_events_handler,
    show_professional_handler, update_professional_handler, CalendlyState,
};
use axum::{routing::get, Router};

/// Creates a router containing all routes of the Calendly feature.
pub fn routes(state: CalendlyState) -> Router {
    Router::new()
        .route("/auth/calendly/start", get(auth_start_handler))
        .route("/auth/calendly/callback", get(auth_callback_handler))
        .route("/organization/events", get(organization_events_handler))
        .route(
            "/organization/events.csv",
            get(organization_events_csv_handler),
        )
        .route(
            "/professionals",
            get(list_professionals_handler).post(create_professional_handler),
        )
        .route(
            "/professionals/{id}",
            get(show_professional_handler)
                .put(update_professional_handler)
                .delete(delete_professional_handler),
        )
        .route(
            "/professionals/{id}/events",
            get(professional_events_handler),
        )
        .route(
            "/professionals/{id}/events.csv",
            get(professional_events_csv_handler),
        )
        .with_state(state)
}
