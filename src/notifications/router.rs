use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AdminLink, JobApplicationRecord};
use super::service::{NotificationError, NotificationService};
use super::transport::MailTransport;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub record: JobApplicationRecord,
    #[serde(default)]
    pub admin_link: Option<AdminLink>,
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub record: JobApplicationRecord,
}

/// Router builder exposing preview and dispatch endpoints.
pub fn notification_router<T>(service: Arc<NotificationService<T>>) -> Router
where
    T: MailTransport + 'static,
{
    Router::new()
        .route("/api/v1/notifications", post(notify_handler::<T>))
        .route("/api/v1/notifications/preview", post(preview_handler::<T>))
        .with_state(service)
}

pub(crate) async fn preview_handler<T>(
    State(service): State<Arc<NotificationService<T>>>,
    axum::Json(request): axum::Json<PreviewRequest>,
) -> Response
where
    T: MailTransport + 'static,
{
    let message = service.preview(&request.record, request.admin_link);
    let payload = json!({
        "subject": message.subject,
        "body": message.body,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn notify_handler<T>(
    State(service): State<Arc<NotificationService<T>>>,
    axum::Json(request): axum::Json<NotifyRequest>,
) -> Response
where
    T: MailTransport + 'static,
{
    match service.notify(&request.record) {
        Ok(report) => (StatusCode::ACCEPTED, axum::Json(report)).into_response(),
        Err(NotificationError::Transport(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
