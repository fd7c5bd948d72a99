pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod response;
pub mod slug;
pub mod state;
pub mod storage;

use axum::{routing::get, routing::post, Extension, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::identity::CurrentIdentity;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected area (session enforced by the route guard)
        .route("/dashboard", get(dashboard))
        // API surface
        .merge(auth_routes())
        .merge(recipe_routes())
        .merge(upload_routes())
        // Request pipeline: session resolver runs first, then the route
        // guard, then handlers. Axum layers wrap outside-in, so the resolver
        // is added last.
        .layer(axum::middleware::from_fn(
            middleware::route_guard_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_resolver_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/whoami", get(auth::whoami))
}

fn recipe_routes() -> Router<AppState> {
    use handlers::{recipes, social};

    Router::new()
        .route("/api/recipes", get(recipes::list).post(recipes::create))
        // GET resolves the path segment as a slug; PUT/DELETE as the recipe id
        .route(
            "/api/recipes/:id",
            get(recipes::get_by_slug)
                .put(recipes::update)
                .delete(recipes::delete),
        )
        .route("/api/recipes/:id/like", post(social::toggle_like))
        .route("/api/recipes/:id/bookmark", post(social::toggle_bookmark))
        .route("/api/recipes/:id/comments", post(social::add_comment))
}

fn upload_routes() -> Router<AppState> {
    use handlers::uploads;

    Router::new().route("/api/uploads/presign", post(uploads::presign))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Ladle API",
            "version": version,
            "description": "Recipe-sharing backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/sign-up, /api/auth/sign-in, /api/auth/sign-out, /api/auth/whoami",
                "recipes": "/api/recipes[/:id] (mutations require a session)",
                "social": "/api/recipes/:id/{like,bookmark,comments} (session required)",
                "uploads": "/api/uploads/presign (session required)",
                "dashboard": "/dashboard (session required, redirects to /login)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.gateway.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// The guard redirects anonymous requests before this handler runs, so the
/// identity is always present here.
async fn dashboard(Extension(identity): Extension<CurrentIdentity>) -> ApiResult<Value> {
    let user = identity.require_user()?;
    Ok(ApiResponse::success(json!({
        "user": user,
    })))
}
