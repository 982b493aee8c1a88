use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::admin_link::AdminLinkBuilder;
use super::domain::{AdminLink, ApplicationId, EmailMessage, JobApplicationRecord, NotificationKind};
use super::render::NotificationRenderer;
use super::transport::{MailTransport, TransportError};
use crate::config::NotificationConfig;

/// Service composing the renderer, admin link builder, and mail transport.
pub struct NotificationService<T> {
    renderer: NotificationRenderer,
    links: AdminLinkBuilder,
    staff_recipients: Vec<String>,
    send_confirmation: bool,
    transport: Arc<T>,
}

/// Summary of what `notify` handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub staff_alerts: usize,
    pub confirmation_sent: bool,
}

impl<T> NotificationService<T>
where
    T: MailTransport + 'static,
{
    pub fn new(config: &NotificationConfig, transport: Arc<T>) -> Self {
        Self {
            renderer: NotificationRenderer,
            links: AdminLinkBuilder::new(config.admin_base_url.clone()),
            staff_recipients: config.staff_recipients.clone(),
            send_confirmation: config.send_confirmation,
            transport,
        }
    }

    pub fn links(&self) -> &AdminLinkBuilder {
        &self.links
    }

    /// Render the staff alert body, building the admin link when none is given.
    pub fn preview(&self, record: &JobApplicationRecord, admin_link: Option<AdminLink>) -> EmailMessage {
        let admin_link = admin_link.unwrap_or_else(|| self.links.link_for_record(record));
        EmailMessage {
            kind: NotificationKind::StaffAlert,
            to: self.staff_recipients.clone(),
            subject: self.renderer.staff_subject(record),
            body: self.renderer.render(record, &admin_link),
        }
    }

    /// One alert per configured staff recipient.
    pub fn staff_messages(&self, record: &JobApplicationRecord) -> Vec<EmailMessage> {
        let admin_link = self.links.link_for_record(record);
        let subject = self.renderer.staff_subject(record);
        let body = self.renderer.render(record, &admin_link);

        self.staff_recipients
            .iter()
            .map(|recipient| EmailMessage {
                kind: NotificationKind::StaffAlert,
                to: vec![recipient.clone()],
                subject: subject.clone(),
                body: body.clone(),
            })
            .collect()
    }

    pub fn confirmation_message(&self, record: &JobApplicationRecord) -> Option<EmailMessage> {
        let address = record.email.trim();
        if !self.send_confirmation || address.is_empty() {
            return None;
        }

        Some(EmailMessage {
            kind: NotificationKind::ApplicantConfirmation,
            to: vec![address.to_string()],
            subject: self.renderer.confirmation_subject(record),
            body: self.renderer.render_confirmation(record),
        })
    }

    /// Render and send every message for a new application.
    pub fn notify(&self, record: &JobApplicationRecord) -> Result<DispatchReport, NotificationError> {
        let staff = self.staff_messages(record);
        if staff.is_empty() {
            warn!(
                job = %record.job_opening_title,
                "no staff recipients configured; skipping staff alert"
            );
        }

        for message in &staff {
            debug!(to = ?message.to, "sending staff alert");
            self.transport.send(message)?;
        }

        let confirmation = self.confirmation_message(record);
        if let Some(message) = &confirmation {
            self.transport.send(message)?;
        }

        let report = DispatchReport {
            application_id: record.application_id.clone(),
            staff_alerts: staff.len(),
            confirmation_sent: confirmation.is_some(),
        };

        info!(
            application = ?report.application_id,
            staff_alerts = report.staff_alerts,
            confirmation_sent = report.confirmation_sent,
            "application notifications dispatched"
        );

        Ok(report)
    }

    /// Preview every record, dispatching as well unless `dry_run` is set.
    /// A transport failure is recorded on that entry and the batch continues.
    pub fn process_batch(&self, records: &[JobApplicationRecord], dry_run: bool) -> Vec<BatchEntry> {
        let mut entries = Vec::with_capacity(records.len());
        let mut failed = 0usize;

        for record in records {
            let preview = self.preview(record, None);
            let (dispatch, error) = if dry_run {
                (None, None)
            } else {
                match self.notify(record) {
                    Ok(report) => (Some(report), None),
                    Err(err) => {
                        warn!(
                            application = ?record.application_id,
                            error = %err,
                            "batch dispatch failed"
                        );
                        failed += 1;
                        (None, Some(err.to_string()))
                    }
                }
            };

            entries.push(BatchEntry {
                application_id: record.application_id.clone(),
                subject: preview.subject,
                body: preview.body,
                dispatch,
                error,
            });
        }

        info!(records = entries.len(), failed, dry_run, "batch processed");
        entries
    }
}

/// Per-record result of `process_batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<ApplicationId>,
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Error raised by the notification service.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
}
