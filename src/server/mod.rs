use axum::{http::HeaderValue, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api_routes::{self, AppState};
use crate::config::{Config, ServerConfig};

pub fn build_app(config: &Config) -> Router {
    let state = Arc::new(AppState::from_config(config));
    api_routes::api_routes(state)
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if server.allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable allowed origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub async fn start_server(config: &Config, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let app = build_app(config);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("Lead desk API listening at http://{}", addr);
    println!("Forwarding leads to {}", config.api.base_url);

    // Open browser automatically unless disabled.
    if open_browser {
        let url = format!("http://{}/health", addr);
        if let Err(err) = open::that(&url) {
            tracing::warn!(error = %err, url = %url, "could not open browser");
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server started");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::spawn_server;

    #[tokio::test]
    async fn health_answers_behind_the_layers() {
        let (addr, handle) = spawn_server(build_app(&Config::default())).await;

        let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert!(response.status().is_success());
        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        handle.abort();
    }

    #[tokio::test]
    async fn default_config_grants_no_cross_origin_access() {
        let (addr, handle) = spawn_server(build_app(&Config::default())).await;

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/health"))
            .header("Origin", "https://some-other-site.example")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn cors_echoes_configured_origin() {
        let mut config = Config::default();
        config.server.allowed_origins = vec!["https://allinonepay.in".to_string()];
        let (addr, handle) = spawn_server(build_app(&config)).await;

        let response = reqwest::Client::new()
            .get(format!("http://{addr}/health"))
            .header("Origin", "https://allinonepay.in")
            .send()
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("https://allinonepay.in")
        );

        handle.abort();
    }
}
