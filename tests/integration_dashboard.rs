mod common;

use axum::http::StatusCode;
use common::{
    create_test_batch, create_test_student, create_test_teacher, generate_unique_email,
    get_request, json_request, new_registration_body, read_json, setup_test_app,
};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_counts(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_teacher(&mut tx, "Counted Teacher").await;
    create_test_student(&mut tx, "Counted Student", None).await;
    let gone = create_test_student(&mut tx, "Inactive Student", None).await;
    sqlx::query("UPDATE users SET status = 'inactive' WHERE id = $1")
        .bind(gone)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let email = generate_unique_email();
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/registrations/new",
            Some(new_registration_body(&email, None)),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = setup_test_app(pool);
    let response = app.oneshot(get_request("/api/dashboard")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["active_students"], 1);
    assert_eq!(body["active_teachers"], 1);
    assert_eq!(body["pending_registrations"], 1);
    assert_eq!(body["recent_registrations"][0]["email"], email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_user(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher = create_test_teacher(&mut tx, "Visible Teacher").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(&format!("/api/users/{}", teacher)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["name"], "Visible Teacher");
    assert_eq!(body["role"], "teacher");
    assert!(body.get("temp_password_hash").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_seated_student_releases_seat(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Grade 10 Maths A", 5).await;
    let student = create_test_student(&mut tx, "Departing", Some(batch.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/users/{}", student),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "User deleted successfully");

    let enrollment: i32 =
        sqlx::query_scalar("SELECT current_enrollment FROM batches WHERE id = $1")
            .bind(batch.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(enrollment, 0);

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(&format!("/api/users/{}", student)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_teacher_frees_batch(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Grade 9 Science", 5).await;
    let teacher = create_test_teacher(&mut tx, "Leaving Teacher").await;
    sqlx::query("UPDATE batches SET teacher_id = $1 WHERE id = $2")
        .bind(teacher)
        .bind(batch.id)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/users/{}", teacher),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(&format!("/api/batches/{}", batch.id)))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["teacher_id"].is_null());
}
