use crate::modules::teachers::controller::{
    assign_teacher_batch, create_teacher, deactivate_teacher, get_teacher, get_teacher_load,
    get_teacher_performance, get_teacher_schedule, get_teachers, update_teacher,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_teacher).get(get_teachers))
        .route(
            "/{id}",
            get(get_teacher)
                .put(update_teacher)
                .delete(deactivate_teacher),
        )
        .route("/{id}/batch", put(assign_teacher_batch))
        .route("/{id}/load", get(get_teacher_load))
        .route("/{id}/performance", get(get_teacher_performance))
        .route("/{id}/schedule", get(get_teacher_schedule))
}
