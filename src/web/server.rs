//! HTTP server: shared state, routes and startup.

use super::{admin, pages};
use crate::config::{Config, SessionConfig};
use crate::db::Database;
use axum::{
    Router,
    response::Json,
    routing::{get, post},
};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub session: Arc<SessionConfig>,
}

impl AppState {
    pub fn new(db: Arc<Database>, session: SessionConfig) -> Self {
        Self {
            db,
            session: Arc::new(session),
        }
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Authentication
        .route("/", get(pages::root))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/logout", post(pages::logout))
        .route("/register", post(pages::register))
        // Personal views
        .route("/dashboard", get(pages::dashboard))
        .route("/objectives", get(pages::objectives_page))
        .route("/reports", get(pages::reports_page))
        .route("/tasks", get(pages::tasks_page))
        // Hierarchy
        .route(
            "/objectives/new",
            get(pages::new_objective_form).post(pages::create_objective),
        )
        .route(
            "/objectives/edit",
            get(pages::objective_form).post(pages::update_objective),
        )
        .route(
            "/objectives/delete",
            get(pages::objective_form).post(pages::delete_objective),
        )
        .route(
            "/outcomes/new",
            get(pages::new_outcome_form).post(pages::create_outcome),
        )
        .route(
            "/outcomes/edit",
            get(pages::outcome_form).post(pages::update_outcome),
        )
        .route(
            "/outcomes/delete",
            get(pages::outcome_form).post(pages::delete_outcome),
        )
        .route(
            "/activities/new",
            get(pages::new_activity_form).post(pages::create_activity),
        )
        .route(
            "/activities/edit",
            get(pages::activity_form).post(pages::update_activity),
        )
        .route(
            "/activities/delete",
            get(pages::activity_form).post(pages::delete_activity),
        )
        .route(
            "/tasks/new",
            get(pages::new_task_form).post(pages::create_task),
        )
        .route(
            "/tasks/edit",
            get(pages::task_form).post(pages::update_task),
        )
        .route(
            "/tasks/delete",
            get(pages::task_form).post(pages::delete_task),
        )
        // User management
        .route("/staff", get(admin::staff_list))
        .route(
            "/staff/new",
            get(admin::new_staff_form).post(admin::create_staff),
        )
        .route(
            "/staff/edit",
            get(admin::staff_form).post(admin::update_staff),
        )
        .route(
            "/staff/delete",
            get(admin::staff_form).post(admin::delete_staff),
        )
        // Reviewer views
        .route("/supervisor/dashboard", get(admin::supervisor_dashboard))
        .route("/supervisor/staff", get(admin::staff_report))
        // Comments
        .route("/comments", get(admin::list_comments))
        .route("/comments/new", post(admin::create_comment))
        .route("/comments/delete", post(admin::delete_comment))
        .route("/api/health", get(health))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn start_server(db: Arc<Database>, config: &Config) -> anyhow::Result<()> {
    let state = AppState::new(db, config.session.clone());
    let app = build_router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.bind.as_str(), config.server.port)).await?;
    let bound_addr = listener.local_addr()?;

    info!("Listening on http://{}", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
