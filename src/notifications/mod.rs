//! New job-application notifications: rendering, admin links, and dispatch.

pub mod admin_link;
pub mod domain;
pub mod import;
pub mod render;
pub mod router;
pub mod service;
pub mod transport;

pub use admin_link::AdminLinkBuilder;
pub use domain::{AdminLink, ApplicationId, EmailMessage, JobApplicationRecord, NotificationKind};
pub use import::parse_records;
pub use render::{
    ApplicantConfirmationTemplate, NotificationRenderer, StaffAlertTemplate,
    COVER_LETTER_DELIMITER,
};
pub use router::notification_router;
pub use service::{BatchEntry, DispatchReport, NotificationError, NotificationService};
pub use transport::{InMemoryTransport, LogTransport, MailTransport, TransportError};
