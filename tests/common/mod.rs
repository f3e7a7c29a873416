use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use nanapatha::nanapatha_config::CorsConfig;
use nanapatha::router::init_router;
use nanapatha::state::AppState;
use serde_json::Value;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    let state = AppState {
        db: pool,
        cors_config: CorsConfig::from_env(),
    };
    init_router(state)
}

/// Builds a JSON request; `actor` fills the `x-actor` header when given.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Option<Value>, actor: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(actor) = actor {
        builder = builder.header("x-actor", actor);
    }

    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[allow(dead_code)]
pub struct TestBatch {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
}

#[allow(dead_code)]
pub async fn create_test_batch(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    capacity: i32,
) -> TestBatch {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO batches (name, grade, subject, capacity)
        VALUES ($1, 'Grade 10', 'Mathematics', $2)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(capacity)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestBatch {
        id,
        name: name.to_string(),
        capacity,
    }
}

#[allow(dead_code)]
pub async fn create_test_teacher(tx: &mut Transaction<'_, Postgres>, name: &str) -> Uuid {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, role, status)
        VALUES ($1, $2, 'teacher', 'active')
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(generate_unique_email())
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    sqlx::query("INSERT INTO teacher_profiles (user_id, subjects) VALUES ($1, ARRAY['Mathematics'])")
        .bind(id)
        .execute(&mut **tx)
        .await
        .unwrap();

    id
}

/// Creates an active student with a profile; the caller keeps the batch
/// counter in step when `batch_id` is given.
#[allow(dead_code)]
pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    batch_id: Option<Uuid>,
) -> Uuid {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, role, status)
        VALUES ($1, $2, 'student', 'active')
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(generate_unique_email())
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    sqlx::query(
        r#"
        INSERT INTO student_profiles (user_id, batch_id, student_id_number, grade)
        VALUES ($1, $2, $3, 'Grade 10')
        "#,
    )
    .bind(id)
    .bind(batch_id)
    .bind(format!("T{}", &Uuid::new_v4().simple().to_string()[..12]))
    .execute(&mut **tx)
    .await
    .unwrap();

    if let Some(batch_id) = batch_id {
        sqlx::query("UPDATE batches SET current_enrollment = current_enrollment + 1 WHERE id = $1")
            .bind(batch_id)
            .execute(&mut **tx)
            .await
            .unwrap();
    }

    id
}

#[allow(dead_code)]
pub async fn create_test_classroom(tx: &mut Transaction<'_, Postgres>, name: &str) -> Uuid {
    sqlx::query_scalar("INSERT INTO classrooms (name, capacity) VALUES ($1, 30) RETURNING id")
        .bind(name)
        .fetch_one(&mut **tx)
        .await
        .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

/// Body for `POST /api/registrations/new`.
#[allow(dead_code)]
pub fn new_registration_body(email: &str, batch_id: Option<Uuid>) -> Value {
    serde_json::json!({
        "name": "Nimal Perera",
        "email": email,
        "mobile": "0771234567",
        "address": "12 Temple Road, Kandy",
        "dob": "2008-04-12",
        "grade": "Grade 10",
        "class_type": "physical",
        "selected_batch_id": batch_id,
        "payment_amount": 2500.0,
        "payment_method": "bank_transfer"
    })
}
