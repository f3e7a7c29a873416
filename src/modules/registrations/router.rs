use crate::modules::registrations::controller::{
    accept_registration, claim_registration, get_registration, get_registrations,
    mark_registration_paid, reject_registration, release_registration, submit_existing_registration,
    submit_new_registration,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Applicant-facing submission forms.
pub fn init_public_registrations_router() -> Router<AppState> {
    Router::new()
        .route("/new", post(submit_new_registration))
        .route("/existing", post(submit_existing_registration))
}

pub fn init_registrations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_registrations))
        .route("/{id}", get(get_registration))
        .route("/{id}/accept", post(accept_registration))
        .route("/{id}/reject", post(reject_registration))
        .route("/{id}/claim", post(claim_registration))
        .route("/{id}/release", post(release_registration))
        .route("/{id}/mark-paid", post(mark_registration_paid))
}
