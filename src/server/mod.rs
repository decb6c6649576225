//! Voice-message drop box service.
//!
//! A small JSON-over-HTTP API: accounts with shareable profile links,
//! anonymous or attributed uploads of rendered voice messages, and an
//! authenticated inbox with read/favorite state. Enabled with the
//! `server` feature.

pub mod auth;
pub mod config;
pub mod dto;
pub mod entity;
pub mod error;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tracing::info;

use crate::server::config::ServerConfig;
use crate::server::store::Store;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<ServerConfig>,
}

/// Builds the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/signup", post(routes::signup))
        .route("/api/login", post(routes::login))
        .route("/api/logout", post(routes::logout))
        .route("/api/me", get(routes::me))
        .route("/api/profile/{link}", get(routes::profile))
        .route("/api/upload", post(routes::upload))
        .route("/api/recordings/inbox", get(routes::inbox))
        .route("/api/recordings/sent", get(routes::sent))
        .route("/api/recordings/favorites", get(routes::favorites))
        .route("/api/recordings/{id}/read", post(routes::mark_read))
        .route("/api/recordings/{id}/favorite", post(routes::toggle_favorite))
        .route("/api/recordings/{id}", delete(routes::delete_recording))
        .route("/api/audio/{id}", get(routes::audio))
        .route("/api/stats", get(routes::stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let store = Store::connect("sqlite::memory:", 30).await.unwrap();
        router(AppState {
            store,
            config: Arc::new(ServerConfig::default()),
        })
    }

    async fn status_of(router: Router, method: Method, path: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn public_route_paths_are_registered() {
        // The web client hardcodes these paths; a 404 means the route table
        // drifted. Empty bodies and missing tokens still prove the match:
        // a registered route answers with 401/400/415, never 404.
        let cases = [
            (Method::POST, "/api/signup"),
            (Method::POST, "/api/login"),
            (Method::POST, "/api/logout"),
            (Method::GET, "/api/me"),
            (Method::POST, "/api/upload"),
            (Method::GET, "/api/recordings/inbox"),
            (Method::GET, "/api/recordings/sent"),
            (Method::GET, "/api/recordings/favorites"),
            (Method::POST, "/api/recordings/1/read"),
            (Method::POST, "/api/recordings/1/favorite"),
            (Method::DELETE, "/api/recordings/1"),
            (Method::GET, "/api/audio/1"),
            (Method::GET, "/api/stats"),
        ];
        for (method, path) in cases {
            let status = status_of(test_router().await, method.clone(), path).await;
            assert_ne!(status, StatusCode::NOT_FOUND, "{method} {path}");
        }
    }

    #[tokio::test]
    async fn profile_route_resolves_a_real_link() {
        let store = Store::connect("sqlite::memory:", 30).await.unwrap();
        let user = store
            .create_user("jane@example.com", "secret", "Jane Doe")
            .await
            .unwrap()
            .unwrap();
        let router = router(AppState {
            store,
            config: Arc::new(ServerConfig::default()),
        });

        let path = format!("/api/profile/{}", user.profile_link);
        let status = status_of(router, Method::GET, &path).await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Connects the store, binds the listener, and serves until ctrl-c.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let store = Store::connect(
        &config.storage.database_url,
        config.policy.session_ttl_days,
    )
    .await?;
    tokio::fs::create_dir_all(&config.storage.uploads_dir).await?;

    let addr = config.bind_addr();
    let state = AppState {
        store,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
