//! JSON API over the post repository

mod error;

pub use error::{ApiError, ErrorBody};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::content::{Post, PostMetadata, PostRepository};
use crate::Site;

/// Server state
pub struct AppState {
    /// Service name reported by the health check
    pub name: String,
    pub repository: PostRepository,
}

/// Health check body
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

/// Start the API server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState {
        name: site.config.name.clone(),
        repository: site.repository(),
    });
    let app = router(state, &site.config.allowed_origins);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    tracing::info!("Serving posts from {:?}", site.content_dir);
    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router
pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let content = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:slug", get(get_post));

    Router::new()
        .route("/", get(root))
        .nest("/v1/content", content)
        .fallback(not_found)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow the configured origins, with credentials, any method and any header
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    // Wildcards are not allowed together with credentials, so mirror the request
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

/// GET / - health check
async fn root(State(state): State<Arc<AppState>>) -> Json<Message> {
    Json(Message {
        message: state.name.clone(),
    })
}

/// GET /v1/content/posts - published posts, newest first
async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PostMetadata>>, ApiError> {
    let repository = state.repository.clone();
    let posts = tokio::task::spawn_blocking(move || repository.list()).await?;
    Ok(Json(posts))
}

/// GET /v1/content/posts/:slug - a single rendered post
async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let repository = state.repository.clone();
    let post = tokio::task::spawn_blocking(move || repository.load(&slug)).await??;
    Ok(Json(post))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not Found")))
}
