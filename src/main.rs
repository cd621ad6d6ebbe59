use axum::{
    routing::{get, post},
    Router,
};
use skillgauge_backend::services::worker_service::WorkerService;
use skillgauge_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let worker_service = WorkerService::init(pool.clone()).await?;
    let app_state = AppState::new(pool, worker_service);

    let public_api = Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/users/by-phone", get(routes::users::lookup_by_phone));

    let authed_api = Router::new()
        .route("/api/assessments", post(routes::assessments::submit_assessment))
        .route(
            "/api/assessments/:id",
            get(routes::assessments::get_assessment)
                .delete(routes::assessments::delete_assessment),
        )
        .route(
            "/api/users/:id/assessments",
            get(routes::assessments::list_user_assessments),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_auth));

    let manager_api = Router::new()
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
        .layer(axum::middleware::from_fn(middleware::auth::require_manager));

    let admin_api = Router::new()
        .route(
            "/api/admin/questions",
            get(routes::questions::list_questions).post(routes::questions::create_question),
        )
        .route(
            "/api/admin/questions/:id",
            get(routes::questions::get_question)
                .put(routes::questions::update_question)
                .delete(routes::questions::delete_question),
        )
        .route(
            "/api/admin/assessments/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
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
        .route(
            "/api/admin/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/api/admin/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/api/admin/users/:id/roles/grant",
            post(routes::users::grant_role),
        )
        .route(
            "/api/admin/users/:id/roles/revoke",
            post(routes::users::revoke_role),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_admin));

    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    };

    let app = public_api
        .merge(authed_api)
        .merge(manager_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
