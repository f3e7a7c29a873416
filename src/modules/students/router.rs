use crate::modules::students::controller::{
    assign_student_batch, create_student, deactivate_student, get_student, get_students,
    update_student,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route(
            "/{id}",
            get(get_student)
                .put(update_student)
                .delete(deactivate_student),
        )
        .route("/{id}/batch", put(assign_student_batch))
}
