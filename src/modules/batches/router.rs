use crate::modules::batches::controller::{
    add_batch_student, archive_batch, create_batch, get_batch, get_batch_roster, get_batches,
    reconcile_enrollment, remove_batch_student, set_batch_teacher, update_batch,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn init_batches_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_batch).get(get_batches))
        .route("/reconcile", post(reconcile_enrollment))
        .route(
            "/{id}",
            get(get_batch).put(update_batch).delete(archive_batch),
        )
        .route("/{id}/roster", get(get_batch_roster))
        .route("/{id}/students", post(add_batch_student))
        .route("/{id}/students/{student_id}", delete(remove_batch_student))
        .route("/{id}/teacher", put(set_batch_teacher))
}
