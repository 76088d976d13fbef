use crate::gps_logic::config::Settings;
use crate::gps_logic::cors::reflect_origin;
use crate::gps_logic::error::AppError;
use crate::gps_logic::state::AppState;
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use lib_gps::RefreshStatus;
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    markers: usize,
    #[serde(flatten)]
    refresh: RefreshStatus,
    ts: String,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/gps", get(gps_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn(reflect_origin))
        .with_state(app_state)
}

pub async fn run(settings: Settings, app_state: AppState, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    let listener = TcpListener::bind(&addr).await?;
    log::info!("bus-server listening on {}", addr);

    serve(listener, app_state, shutdown).await
}

pub async fn serve(listener: TcpListener, app_state: AppState, shutdown: CancellationToken) -> anyhow::Result<()> {
    axum::serve(listener, router(app_state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("Downstream server shutting down.");
        })
        .await?;
    Ok(())
}

async fn gps_handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.cache.read();
    let body = serde_json::to_vec(&*snapshot)?;

    let mut response = (StatusCode::OK, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let refresh = state.cache.status();
    let status = if refresh.last_success.is_some() { "ok" } else { "starting" };

    Json(HealthResponse {
        status,
        markers: state.cache.read().len(),
        refresh,
        ts: Utc::now().to_rfc3339(),
    })
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_gps::{MarkerCache, Snapshot};
    use reqwest::Method;
    use std::sync::Arc;

    async fn spawn_server(cache: Arc<MarkerCache>) -> (String, CancellationToken, tokio::task::JoinHandle<anyhow::Result<()>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, AppState::new(cache), shutdown.clone()));
        (base, shutdown, handle)
    }

    #[tokio::test]
    async fn test_gps_returns_snapshot_json() {
        let cache = Arc::new(MarkerCache::new());
        cache.replace(Snapshot::parse(b"bus,12,24.745,59.437,0,90,1234\n"));
        let (base, shutdown, handle) = spawn_server(cache).await;

        let response = reqwest::get(format!("{}/gps", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "1234": {"id": "1234", "type": "bus", "number": "12", "long": "24.745", "lat": "59.437", "dir": "90"}
            })
        );

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_gps_empty_cache_is_empty_object() {
        let (base, shutdown, handle) = spawn_server(Arc::new(MarkerCache::new())).await;

        let body: serde_json::Value = reqwest::get(format!("{}/gps", base)).await.unwrap().json().await.unwrap();
        assert_eq!(body, serde_json::json!({}));

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_origin_is_reflected() {
        let (base, shutdown, handle) = spawn_server(Arc::new(MarkerCache::new())).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("{}/gps", base))
            .header("Origin", "https://example.com")
            .send()
            .await
            .unwrap();
        assert_eq!(response.headers()["access-control-allow-origin"], "https://example.com");
        assert_eq!(response.headers()["access-control-allow-methods"], "POST, GET, OPTIONS, PUT, DELETE");

        let plain = client.get(format!("{}/gps", base)).send().await.unwrap();
        assert!(plain.headers().get("access-control-allow-origin").is_none());

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_options_is_answered_empty_without_routing() {
        let (base, shutdown, handle) = spawn_server(Arc::new(MarkerCache::new())).await;
        let client = reqwest::Client::new();

        // Unknown route too: the wrapper answers before the router sees it.
        for path in ["/gps", "/does-not-exist"] {
            let response = client
                .request(Method::OPTIONS, format!("{}{}", base, path))
                .header("Origin", "https://example.com")
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 200);
            assert_eq!(response.headers()["access-control-allow-origin"], "https://example.com");
            assert!(response.bytes().await.unwrap().is_empty());
        }

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_health_reports_refresh_status() {
        let cache = Arc::new(MarkerCache::new());
        let (base, shutdown, handle) = spawn_server(cache.clone()).await;

        let body: serde_json::Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "starting");
        assert_eq!(body["markers"], 0);
        assert_eq!(body["state"], "idle");

        cache.replace(Snapshot::parse(b"bus,12,24.745,59.437,0,90,1234\ntram,3,24.7,59.4,0,180,55\n"));
        cache.record_failure("feed returned HTTP 502");

        let body: serde_json::Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["markers"], 2);
        assert_eq!(body["successes"], 1);
        assert_eq!(body["failures"], 1);
        assert_eq!(body["lastError"], "feed returned HTTP 502");

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }
}
