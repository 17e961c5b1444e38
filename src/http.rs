use crate::metrics::Metrics;
use crate::provider::Provider;
use crate::snapshot::{SnapshotOptions, SnapshotRequest};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header::CONTENT_TYPE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

#[derive(Clone)]
pub struct HttpAppState {
    pub metrics: Arc<Metrics>,
    pub provider: Arc<dyn Provider>,
    pub options: Arc<SnapshotOptions>,
}

pub fn build_router(
    metrics: Arc<Metrics>,
    provider: Arc<dyn Provider>,
    options: SnapshotOptions,
) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_handler))
        .route("/api/host", get(host_handler))
        .route("/api/cpu", get(cpu_handler))
        .route("/api/load", get(load_handler))
        .route("/api/memory", get(memory_handler))
        .route("/api/disk", get(disk_handler))
        .route("/api/process/:pid", get(process_handler))
        .with_state(HttpAppState {
            metrics,
            provider,
            options: Arc::new(options),
        })
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics_handler(State(state): State<HttpAppState>) -> Response {
    state.metrics.inc_scrape_count();
    match state.metrics.encode_metrics() {
        Ok(encoded) => {
            let mut response = Response::new(Body::from(encoded));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("ошибка кодирования метрик: {err}"),
        )
            .into_response(),
    }
}

async fn host_handler(State(state): State<HttpAppState>) -> Response {
    snapshot_response(state, SnapshotRequest::Host).await
}

async fn cpu_handler(State(state): State<HttpAppState>) -> Response {
    snapshot_response(state, SnapshotRequest::Cpu).await
}

async fn load_handler(State(state): State<HttpAppState>) -> Response {
    snapshot_response(state, SnapshotRequest::Load).await
}

async fn memory_handler(State(state): State<HttpAppState>) -> Response {
    snapshot_response(state, SnapshotRequest::Memory).await
}

async fn disk_handler(State(state): State<HttpAppState>) -> Response {
    snapshot_response(state, SnapshotRequest::Disk).await
}

async fn process_handler(
    State(state): State<HttpAppState>,
    Path(pid): Path<u32>,
) -> Response {
    snapshot_response(state, SnapshotRequest::Process(pid)).await
}

/// Builders block (the CPU one sleeps through its sampling window), so they
/// run on the blocking pool.
async fn snapshot_response(state: HttpAppState, request: SnapshotRequest) -> Response {
    let started = Instant::now();
    let provider = state.provider.clone();
    let options = state.options.clone();
    let built = tokio::task::spawn_blocking(move || request.build(provider.as_ref(), &options)).await;

    match built {
        Ok(bytes) => {
            state.metrics.observe_snapshot(request.kind(), started.elapsed());
            let mut response = Response::new(Body::from(bytes));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            error!(kind = request.kind(), error = %err, "задача сборки снимка завершилась аварийно");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("ошибка сборки снимка: {err}"),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{FakeProcess, FakeProvider};
    use crate::provider::{LoadAvg, VirtualMemory};
    use axum::body::to_bytes;
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(provider: FakeProvider) -> (Router, Arc<Metrics>) {
        let metrics = Metrics::new().expect("инициализация метрик");
        let options = SnapshotOptions {
            cpu_sample_window: Duration::ZERO,
            ..SnapshotOptions::default()
        };
        (
            build_router(metrics.clone(), Arc::new(provider), options),
            metrics,
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Option<HeaderValue>, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, content_type, value)
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let (app, _) = app(FakeProvider::default());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), b"ok");
    }

    #[tokio::test]
    async fn memory_snapshot_is_served_as_json() {
        let provider = FakeProvider {
            memory: Ok(VirtualMemory {
                total: 2048,
                available: 1024,
                used: 1024,
                used_percent: 50.0,
            }),
            ..FakeProvider::default()
        };
        let (app, metrics) = app(provider);

        let (status, content_type, value) = get_json(app, "/api/memory").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), "application/json");
        assert_eq!(value["total"], "2.0 KB");
        assert_eq!(value["usedPercent"], 50);
        assert_eq!(
            metrics
                .hostsnap_snapshot_requests_total
                .with_label_values(&["memory"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn load_and_disk_routes() {
        let provider = FakeProvider {
            load: Ok(LoadAvg {
                load1: 0.25,
                load5: 0.5,
                load15: 1.0,
            }),
            ..FakeProvider::default()
        };
        let (app, _) = app(provider);

        let (_, _, load) = get_json(app.clone(), "/api/load").await;
        assert_eq!(load["load15"], "1.00");

        let (status, _, disks) = get_json(app, "/api/disk").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(disks, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn process_route_takes_pid_from_path() {
        let provider = FakeProvider::default().with_process(42, FakeProcess::new("sshd", 1));
        let (app, _) = app(provider);

        let (status, _, value) = get_json(app.clone(), "/api/process/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["pid"], 42);
        assert_eq!(value["name"], "sshd");
        assert_eq!(value["isExists"], true);

        let (status, _, value) = get_json(app.clone(), "/api/process/43").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["name"], "");
        assert_eq!(value["isExists"], false);

        let (status, _, _) = get_json(app, "/api/process/not-a-pid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_lists_snapshot_counters() {
        let (app, _) = app(FakeProvider::default());
        let _ = get_json(app.clone(), "/api/cpu").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("hostsnap_snapshot_requests_total{kind=\"cpu\"} 1"));
        assert!(text.contains("hostsnap_uptime_seconds"));
    }
}
