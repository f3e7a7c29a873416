mod common;

use axum::http::StatusCode;
use common::{
    create_test_batch, create_test_student, create_test_teacher, get_request, json_request,
    read_json, setup_test_app,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn enrollment(pool: &PgPool, batch_id: Uuid) -> i32 {
    sqlx::query_scalar("SELECT current_enrollment FROM batches WHERE id = $1")
        .bind(batch_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_batch(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher = create_test_teacher(&mut tx, "Mrs. Fernando").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/batches",
            Some(json!({
                "name": "Grade 11 ICT A",
                "grade": "Grade 11",
                "subject": "ICT",
                "capacity": 25,
                "class_type": "both",
                "teacher_id": teacher,
                "start_date": "2024-01-08"
            })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["name"], "Grade 11 ICT A");
    assert_eq!(body["current_enrollment"], 0);
    assert_eq!(body["teacher_id"], teacher.to_string());
    assert_eq!(body["teacher_name"], "Mrs. Fernando");
    assert_eq!(body["is_active"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_batch_rejects_zero_capacity(pool: PgPool) {
    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/batches",
            Some(json!({
                "name": "Empty",
                "grade": "Grade 6",
                "subject": "English",
                "capacity": 0,
                "class_type": "online"
            })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["code"], "validation");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_add_student_until_full(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Grade 10 Maths A", 1).await;
    let first = create_test_student(&mut tx, "First Student", None).await;
    let second = create_test_student(&mut tx, "Second Student", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/batches/{}/students", batch.id),
            Some(json!({ "student_id": first })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["batch_id"], batch.id.to_string());
    assert!(body["previous_batch_id"].is_null());

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/batches/{}/students", batch.id),
            Some(json!({ "student_id": second })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], "capacity");

    assert_eq!(enrollment(&pool, batch.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_remove_student_frees_seat(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Grade 9 Science", 5).await;
    let student = create_test_student(&mut tx, "Seated Student", Some(batch.id)).await;
    tx.commit().await.unwrap();

    assert_eq!(enrollment(&pool, batch.id).await, 1);

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/batches/{}/students/{}", batch.id, student),
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(body["batch_id"].is_null());
    assert_eq!(enrollment(&pool, batch.id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_batch_detail_and_roster(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Grade 8 English", 10).await;
    create_test_student(&mut tx, "Inside Student", Some(batch.id)).await;
    create_test_student(&mut tx, "Waiting Student", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(get_request(&format!("/api/batches/{}", batch.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["students"].as_array().unwrap().len(), 1);
    assert_eq!(body["students"][0]["name"], "Inside Student");

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request(&format!("/api/batches/{}/roster", batch.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["current_students"].as_array().unwrap().len(), 1);
    let available: Vec<&str> = body["available_students"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(available, vec!["Waiting Student"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_capacity_cannot_drop_below_enrollment(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Grade 7 Maths", 5).await;
    create_test_student(&mut tx, "One", Some(batch.id)).await;
    create_test_student(&mut tx, "Two", Some(batch.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/batches/{}", batch.id),
            Some(json!({ "capacity": 1 })),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "validation");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_set_teacher_moves_between_batches(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let first = create_test_batch(&mut tx, "Batch One", 10).await;
    let second = create_test_batch(&mut tx, "Batch Two", 10).await;
    let teacher = create_test_teacher(&mut tx, "Mr. Jayasuriya").await;
    tx.commit().await.unwrap();

    for batch_id in [first.id, second.id] {
        let app = setup_test_app(pool.clone());
        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/api/batches/{}/teacher", batch_id),
                Some(json!({ "teacher_id": teacher })),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let led: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM batches WHERE teacher_id = $1")
        .bind(teacher)
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(led, vec![second.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_archived_batch_refuses_students(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Old Batch", 10).await;
    let student = create_test_student(&mut tx, "Late Student", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/batches/{}", batch.id),
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
        .oneshot(json_request(
            "POST",
            &format!("/api/batches/{}/students", batch.id),
            Some(json!({ "student_id": student })),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reconcile_enrollment(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let batch = create_test_batch(&mut tx, "Drifted", 10).await;
    create_test_student(&mut tx, "Counted", Some(batch.id)).await;
    tx.commit().await.unwrap();

    sqlx::query("UPDATE batches SET current_enrollment = 4 WHERE id = $1")
        .bind(batch.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(json_request("POST", "/api/batches/reconcile", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["batches_corrected"], 1);
    assert_eq!(enrollment(&pool, batch.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_batches_filters_by_subject(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    create_test_batch(&mut tx, "Maths Batch", 10).await;
    sqlx::query(
        "INSERT INTO batches (name, grade, subject, capacity) VALUES ('English Batch', 'Grade 9', 'English', 10)",
    )
    .execute(&mut *tx)
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let app = setup_test_app(pool);
    let response = app
        .oneshot(get_request("/api/batches?subject=English"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "English Batch");
}
