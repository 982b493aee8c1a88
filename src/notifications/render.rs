//! Plain-text bodies for new-application emails.
//!
//! Both templates are pure `Display` implementations over borrowed data.
//! Absent values render as empty text.

use std::fmt::{self, Display};

use super::domain::{AdminLink, JobApplicationRecord};

/// Line written before and after the cover letter.
pub const COVER_LETTER_DELIMITER: &str = "=====";

/// Staff-facing alert announcing a new application.
pub struct StaffAlertTemplate<'a> {
    pub record: &'a JobApplicationRecord,
    pub admin_link: &'a AdminLink,
}

impl<'a> Display for StaffAlertTemplate<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        writeln!(
            f,
            "{} has just applied for {}.",
            record.applicant_display_name, record.job_opening_title
        )?;
        writeln!(f, "{}", self.admin_link)?;
        writeln!(f)?;
        writeln!(f, "{} ({})", record.addressed_name(), record.email)?;
        writeln!(f)?;
        writeln!(f, "{COVER_LETTER_DELIMITER}")?;
        writeln!(f, "{}", strip_line_ending(&record.cover_letter))?;
        writeln!(f, "{COVER_LETTER_DELIMITER}")
    }
}

/// Drops one trailing line ending so the closing delimiter sits under the text.
fn strip_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// Applicant-facing acknowledgement of receipt.
pub struct ApplicantConfirmationTemplate<'a> {
    pub record: &'a JobApplicationRecord,
}

impl<'a> Display for ApplicantConfirmationTemplate<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        let received_on = record
            .submitted_at
            .map(|at| format!(" on {}", at.format("%Y-%m-%d")))
            .unwrap_or_default();

        writeln!(f, "{},", record.addressed_name())?;
        writeln!(f)?;
        writeln!(
            f,
            "thank you for applying for {}.",
            record.job_opening_title
        )?;
        writeln!(
            f,
            "We received your application{received_on} and will get back to you."
        )
    }
}

/// Entry point used by the service, CLI, and HTTP handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationRenderer;

impl NotificationRenderer {
    pub fn render(&self, record: &JobApplicationRecord, admin_link: &AdminLink) -> String {
        StaffAlertTemplate { record, admin_link }.to_string()
    }

    pub fn render_confirmation(&self, record: &JobApplicationRecord) -> String {
        ApplicantConfirmationTemplate { record }.to_string()
    }

    pub fn staff_subject(&self, record: &JobApplicationRecord) -> String {
        format!("New application for {}", record.job_opening_title)
    }

    pub fn confirmation_subject(&self, record: &JobApplicationRecord) -> String {
        format!("Your application for {}", record.job_opening_title)
    }
}
