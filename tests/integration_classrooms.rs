mod common;

use axum::http::StatusCode;
use common::{create_test_classroom, get_request, json_request, read_json, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_update_classroom(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/classrooms",
            Some(json!({
                "name": "Hall A",
                "capacity": 40,
                "location": "Ground floor"
            })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["name"], "Hall A");
    assert_eq!(body["capacity"], 40);
    assert_eq!(body["is_active"], true);
    let id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/classrooms/{}", id),
            Some(json!({ "capacity": 45, "notes": "Projector installed" })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["capacity"], 45);
    assert_eq!(body["notes"], "Projector installed");
    assert_eq!(body["location"], "Ground floor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_classroom_rejects_zero_capacity(pool: PgPool) {
    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/classrooms",
            Some(json!({ "name": "Cupboard", "capacity": 0 })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_archive_classroom_hides_from_active_list(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let kept = create_test_classroom(&mut tx, "Hall 1").await;
    let archived = create_test_classroom(&mut tx, "Hall 2").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/classrooms/{}", archived),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["is_active"], false);

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/classrooms?is_active=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], kept.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_classroom_not_found(pool: PgPool) {
    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(&format!(
            "/api/classrooms/{}",
            uuid::Uuid::new_v4()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
