use crate::modules::schedule::controller::{
    create_session, get_schedule, get_session, get_sessions, update_session_status,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_schedule_router() -> Router<AppState> {
    Router::new().route("/", get(get_schedule))
}

pub fn init_sessions_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session).get(get_sessions))
        .route("/{id}", get(get_session))
        .route("/{id}/status", put(update_session_status))
}
