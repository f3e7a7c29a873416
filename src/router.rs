use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::actor::ACTOR_HEADER;
use crate::modules::batches::router::init_batches_router;
use crate::modules::classrooms::router::init_classrooms_router;
use crate::modules::dashboard::router::init_dashboard_router;
use crate::modules::registrations::router::{
    init_public_registrations_router, init_registrations_router,
};
use crate::modules::schedule::router::{init_schedule_router, init_sessions_router};
use crate::modules::students::router::init_students_router;
use crate::modules::teachers::router::init_teachers_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest(
            "/api",
            Router::new()
                .nest(
                    "/registrations",
                    init_public_registrations_router().merge(init_registrations_router()),
                )
                .nest("/students", init_students_router())
                .nest("/teachers", init_teachers_router())
                .nest("/batches", init_batches_router())
                .nest("/classrooms", init_classrooms_router())
                .nest("/schedule", init_schedule_router())
                .nest("/sessions", init_sessions_router())
                .nest("/dashboard", init_dashboard_router())
                .nest("/users", init_users_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    HeaderName::from_static(ACTOR_HEADER),
                ])
                .allow_credentials(true)
        })
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
