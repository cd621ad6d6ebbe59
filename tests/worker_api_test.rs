use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use skillgauge_backend::middleware::auth::issue_token;
use skillgauge_backend::models::user::Role;
use skillgauge_backend::services::worker_service::WorkerService;
use skillgauge_backend::{middleware, routes, AppState};

async fn setup() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("JWT_EXPIRES_HOURS", "2");
    let _ = skillgauge_backend::config::init_config();

    let pool = skillgauge_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    Some(pool)
}

async fn build_app(pool: PgPool) -> Router {
    let worker_service = WorkerService::init(pool.clone()).await.expect("worker service");
    let app_state = AppState::new(pool, worker_service);

    Router::new()
        .route(
            "/api/admin/workers",
            get(routes::workers::list_workers).post(routes::workers::register_worker),
        )
        .route(
            "/api/admin/workers/:id",
            get(routes::workers::get_worker)
                .put(routes::workers::update_worker)
                .delete(routes::workers::delete_worker),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .with_state(app_state)
}

fn admin_token() -> String {
    issue_token(Uuid::new_v4(), &[Role::Admin], "test_secret_key", 2).expect("token")
}

async fn json_body(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: &str, body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn unique_national_id() -> String {
    format!("{:013}", Uuid::new_v4().as_u128() % 10_000_000_000_000)
}

fn unique_phone() -> String {
    format!("06{:08}", Uuid::new_v4().as_u128() % 100_000_000)
}

fn profile(name: &str, national_id: &str, phone: &str) -> JsonValue {
    json!({
        "personal": {
            "full_name": name,
            "phone": phone,
            "birth_date": "1990-04-12",
            "gender": "male",
            // A field with no relational column; lives only in the overlay.
            "nickname": "Lek"
        },
        "identity": { "national_id": national_id },
        "employment": {
            "position": "electrician",
            "start_date": "2024-01-15",
            "worker_status": "active"
        },
        "emergency_contact": { "name": "Ploy", "phone": "0899999999" }
    })
}

#[tokio::test]
async fn worker_lifecycle_with_overlay_merge() {
    let Some(pool) = setup().await else { return };
    let app = build_app(pool.clone()).await;
    let token = admin_token();

    let national_id = unique_national_id();
    let phone = unique_phone();
    let name = format!("Worker {}", Uuid::new_v4());

    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({
                "profile": profile(&name, &national_id, &phone),
                "password": "strongpass1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["profile"]["personal"]["full_name"], json!(name));
    // Overlay-only sections come back on reads.
    assert_eq!(created["profile"]["personal"]["nickname"], json!("Lek"));
    assert_eq!(
        created["profile"]["emergency_contact"]["name"],
        json!("Ploy")
    );
    assert_eq!(
        created["profile"]["identity"]["national_id"],
        json!(national_id)
    );

    // A second worker with the same national id is rejected.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({
                "profile": profile("Copy Cat", &national_id, &unique_phone()),
                "password": "strongpass1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(resp).await["message"], json!("duplicate_national_id"));

    // Registration without a password is rejected before any write.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({
                "profile": profile("No Pass", &unique_national_id(), &unique_phone())
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], json!("missing_password"));

    // Short national id.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({
                "profile": profile("Short Id", "12345", &unique_phone()),
                "password": "strongpass1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await["message"],
        json!("invalid_national_id_length")
    );

    // Update changes a relational column and an overlay field together.
    let mut updated_profile = profile(&name, &national_id, &phone);
    updated_profile["employment"]["position"] = json!("supervisor");
    updated_profile["personal"]["nickname"] = json!("Boss");
    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/admin/workers/{}", id),
            &token,
            Some(json!({ "profile": updated_profile })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(
        updated["profile"]["employment"]["position"],
        json!("supervisor")
    );
    assert_eq!(updated["profile"]["personal"]["nickname"], json!("Boss"));

    // Relational columns win over a stale overlay value.
    let row_position: String =
        sqlx::query_scalar("SELECT position FROM workers WHERE id = $1::uuid")
            .bind(&id)
            .fetch_one(&pool)
            .await
            .expect("position");
    assert_eq!(row_position, "supervisor");

    // Search by name fragment.
    let resp = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/admin/workers?search={}", national_id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await;
    assert_eq!(page["total"], json!(1));
    assert_eq!(page["items"][0]["id"].as_str().unwrap(), id);

    let resp = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/admin/workers/{}", id), &token, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(request("GET", &format!("/api/admin/workers/{}", id), &token, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn worker_profile_shape_rules() {
    let Some(pool) = setup().await else { return };
    let app = build_app(pool).await;
    let token = admin_token();

    // Foreign-format phone is rejected; workers register local numbers.
    let mut bad_phone = profile("Phone Check", &unique_national_id(), &unique_phone());
    bad_phone["personal"]["phone"] = json!("+66812345678");
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({ "profile": bad_phone, "password": "strongpass1" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], json!("invalid_phone"));

    let mut bad_email = profile("Email Check", &unique_national_id(), &unique_phone());
    bad_email["personal"]["email"] = json!("not-an-email");
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({ "profile": bad_email, "password": "strongpass1" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], json!("invalid_email"));

    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/admin/workers",
            &token,
            Some(json!({
                "profile": { "identity": { "national_id": unique_national_id() } },
                "password": "strongpass1"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], json!("missing_full_name"));
}
