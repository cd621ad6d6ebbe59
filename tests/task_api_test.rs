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
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_manager))
        .with_state(app_state)
}

fn token_for(roles: &[Role]) -> String {
    issue_token(Uuid::new_v4(), roles, "test_secret_key", 2).expect("token")
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

struct Fixtures {
    project_id: Uuid,
    site_id: Uuid,
    assignee_id: Uuid,
    project_name: String,
}

async fn seed_fixtures(pool: &PgPool) -> Fixtures {
    let project_name = format!("Tower {}", Uuid::new_v4());
    let project_id: Uuid =
        sqlx::query_scalar("INSERT INTO projects (name) VALUES ($1) RETURNING id")
            .bind(&project_name)
            .fetch_one(pool)
            .await
            .unwrap();
    let site_id: Uuid = sqlx::query_scalar("INSERT INTO sites (name) VALUES ($1) RETURNING id")
        .bind("North wing")
        .fetch_one(pool)
        .await
        .unwrap();
    let phone = format!("06{:08}", Uuid::new_v4().as_u128() % 100_000_000);
    let assignee_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (full_name, phone, password_hash) VALUES ($1, $2, 'x') RETURNING id",
    )
    .bind("Somchai Assignee")
    .bind(&phone)
    .fetch_one(pool)
    .await
    .unwrap();

    Fixtures {
        project_id,
        site_id,
        assignee_id,
        project_name,
    }
}

#[tokio::test]
async fn task_lifecycle_with_filters() {
    let Some(pool) = setup().await else { return };
    let app = build_app(pool.clone()).await;
    let fx = seed_fixtures(&pool).await;
    let manager = token_for(&[Role::ProjectManager]);

    // Create with every optional field set.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            &manager,
            Some(json!({
                "title": "Pour slab",
                "project_id": fx.project_id,
                "site_id": fx.site_id,
                "assignee_user_id": fx.assignee_id,
                "priority": "high",
                "due_date": "2026-09-01"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task = json_body(resp).await;
    assert_eq!(task["status"], "todo");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["project_name"], JsonValue::String(fx.project_name.clone()));
    assert_eq!(task["site_name"], "North wing");
    assert_eq!(task["assignee_name"], "Somchai Assignee");
    let task_id = task["id"].as_str().unwrap().to_string();

    // A second task with defaults only.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            &manager,
            Some(json!({ "title": "Inspect scaffolding", "project_id": fx.project_id })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let second = json_body(resp).await;
    assert_eq!(second["priority"], "medium");
    assert!(second["site_id"].is_null());
    let second_id = second["id"].as_str().unwrap().to_string();

    // Project filter sees both; the dated task sorts first.
    let resp = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/tasks?project_id={}", fx.project_id),
            &manager,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_body(resp).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["id"], JsonValue::String(task_id.clone()));

    // Assignee filter narrows to the first task.
    let resp = app
        .clone()
        .oneshot(request(
            "GET",
            &format!(
                "/api/tasks?project_id={}&assignee_id={}",
                fx.project_id, fx.assignee_id
            ),
            &manager,
            None,
        ))
        .await
        .unwrap();
    let page = json_body(resp).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "Pour slab");

    // Move the task to done and detach the site with an explicit null.
    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/tasks/{}", task_id),
            &manager,
            Some(json!({ "status": "done", "site_id": null })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["status"], "done");
    assert!(updated["site_id"].is_null());
    assert_eq!(updated["assignee_name"], "Somchai Assignee");

    let resp = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/tasks?project_id={}&status=done", fx.project_id),
            &manager,
            None,
        ))
        .await
        .unwrap();
    let page = json_body(resp).await;
    assert_eq!(page["total"], 1);

    // Delete, then the row is gone.
    let resp = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/tasks/{}", second_id), &manager, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = app
        .clone()
        .oneshot(request("GET", &format!("/api/tasks/{}", second_id), &manager, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_validation_and_references() {
    let Some(pool) = setup().await else { return };
    let app = build_app(pool.clone()).await;
    let fx = seed_fixtures(&pool).await;
    let manager = token_for(&[Role::Admin]);

    // Blank title.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            &manager,
            Some(json!({ "title": "   ", "project_id": fx.project_id })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "missing_title");

    // Unknown project id fails the foreign key, not the server.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            &manager,
            Some(json!({ "title": "Orphan", "project_id": Uuid::new_v4() })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "invalid_reference");

    // An update that names no fields is rejected.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/tasks",
            &manager,
            Some(json!({ "title": "Real task", "project_id": fx.project_id })),
        ))
        .await
        .unwrap();
    let task = json_body(resp).await;
    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/tasks/{}", task["id"].as_str().unwrap()),
            &manager,
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "nothing_to_update");
}

#[tokio::test]
async fn task_routes_require_manager_role() {
    let Some(pool) = setup().await else { return };
    let app = build_app(pool.clone()).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/tasks")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["message"], "missing_token");

    for roles in [&[Role::Worker][..], &[Role::Foreman][..]] {
        let resp = app
            .clone()
            .oneshot(request("GET", "/api/tasks", &token_for(roles), None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(resp).await["message"], "forbidden");
    }

    let resp = app
        .clone()
        .oneshot(request("GET", "/api/tasks", &token_for(&[Role::ProjectManager]), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
