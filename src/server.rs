use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::notifications::{
    notification_router, parse_records, BatchEntry, LogTransport, MailTransport,
    NotificationService,
};
use crate::telemetry::{self, LogSink};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchRequest {
    csv: String,
    #[serde(default)]
    dry_run: bool,
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(NotificationService::new(
        &config.notifications,
        Arc::new(LogTransport),
    ));

    let app = build_app(service, state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        staff_recipients = config.notifications.staff_recipients.len(),
        "job application notifier ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_app<T>(service: Arc<NotificationService<T>>, state: AppState) -> Router
where
    T: MailTransport + 'static,
{
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .route(
            "/api/v1/notifications/batch",
            post(batch_endpoint::<T>).with_state(service.clone()),
        )
        .merge(notification_router(service))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn batch_endpoint<T>(
    State(service): State<Arc<NotificationService<T>>>,
    Json(request): Json<BatchRequest>,
) -> Result<(StatusCode, Json<Vec<BatchEntry>>), AppError>
where
    T: MailTransport + 'static,
{
    let records = parse_records(Cursor::new(request.csv.into_bytes()))?;
    let entries = service.process_batch(&records, request.dry_run);
    let status = if entries.iter().any(BatchEntry::failed) {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    Ok((status, Json(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;
    use crate::notifications::InMemoryTransport;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn app(transport: Arc<InMemoryTransport>, ready: bool) -> Router {
        let config = NotificationConfig {
            admin_base_url: "https://jobs.example.com/admin/applications".to_string(),
            staff_recipients: vec!["hr@example.com".to_string()],
            send_confirmation: false,
        };
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        build_app(Arc::new(NotificationService::new(&config, transport)), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn batch_request(payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/notifications/batch")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = app(Arc::new(InMemoryTransport::default()), false)
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(Arc::new(InMemoryTransport::default()), true)
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn batch_dry_run_renders_without_sending() {
        let transport = Arc::new(InMemoryTransport::default());
        let csv = "application_id,applicant_display_name,job_opening_title,first_name,last_name,email,cover_letter\n\
                   7,Jane Doe,Backend Engineer,Jane,Doe,jane@example.com,Hello\n";
        let response = app(transport.clone(), true)
            .oneshot(batch_request(json!({ "csv": csv, "dry_run": true })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let entries = body.as_array().expect("array of entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["subject"], "New application for Backend Engineer");
        assert!(entries[0]["body"]
            .as_str()
            .expect("body string")
            .contains("https://jobs.example.com/admin/applications/7/"));
        assert!(entries[0].get("dispatch").is_none());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn batch_dispatches_when_not_dry_run() {
        let transport = Arc::new(InMemoryTransport::default());
        let csv = "applicant_display_name,job_opening_title,email\n\
                   Jane Doe,Backend Engineer,jane@example.com\n\
                   John Roe,Designer,john@example.com\n";
        let response = app(transport.clone(), true)
            .oneshot(batch_request(json!({ "csv": csv })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[1]["dispatch"]["staff_alerts"], 1);
        assert_eq!(transport.sent().len(), 2);
    }

    #[derive(Default)]
    struct DownTransport;

    impl MailTransport for DownTransport {
        fn send(
            &self,
            _message: &crate::notifications::EmailMessage,
        ) -> Result<(), crate::notifications::TransportError> {
            Err(crate::notifications::TransportError::Unavailable(
                "relay offline".to_string(),
            ))
        }
    }

    #[tokio::test]
    async fn batch_with_delivery_failures_is_multi_status() {
        let config = NotificationConfig {
            admin_base_url: "https://jobs.example.com/admin/applications".to_string(),
            staff_recipients: vec!["hr@example.com".to_string()],
            send_confirmation: false,
        };
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = build_app(
            Arc::new(NotificationService::new(&config, Arc::new(DownTransport))),
            state,
        );

        let csv = "application_id,job_opening_title,email\n\
                   9,Designer,jane@example.com\n";
        let response = router
            .oneshot(batch_request(json!({ "csv": csv })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::MULTI_STATUS);
        let body = body_json(response).await;
        assert_eq!(body[0]["application_id"], "9");
        assert_eq!(body[0]["error"], "mail transport unavailable: relay offline");
        assert!(body[0].get("dispatch").is_none());
    }

    #[tokio::test]
    async fn malformed_batch_csv_is_a_bad_request() {
        let csv = "applicant_display_name,email\n\"unterminated,jane@example.com\n";
        let response = app(Arc::new(InMemoryTransport::default()), true)
            .oneshot(batch_request(json!({ "csv": csv })))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error string")
            .starts_with("import error"));
    }
}
