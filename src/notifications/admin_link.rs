use super::domain::{AdminLink, ApplicationId, JobApplicationRecord};

/// Builds admin change-view URLs from a configured base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminLinkBuilder {
    base_url: String,
}

impl AdminLinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn link_for(&self, id: &ApplicationId) -> AdminLink {
        AdminLink(format!("{}/{}/", self.base_url, id.0.trim()))
    }

    /// Records without an id point at the application list instead.
    pub fn link_for_record(&self, record: &JobApplicationRecord) -> AdminLink {
        match record
            .application_id
            .as_ref()
            .filter(|id| !id.0.trim().is_empty())
        {
            Some(id) => self.link_for(id),
            None => AdminLink(format!("{}/", self.base_url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_on_base_are_collapsed() {
        let builder = AdminLinkBuilder::new("https://example.com/admin/jobs/jobapplication///");
        let link = builder.link_for(&ApplicationId("42".to_string()));
        assert_eq!(link.as_str(), "https://example.com/admin/jobs/jobapplication/42/");
    }

    #[test]
    fn record_without_id_links_to_list() {
        let builder = AdminLinkBuilder::new("https://example.com/admin/apps");
        let record = JobApplicationRecord {
            application_id: Some(ApplicationId("  ".to_string())),
            applicant_display_name: String::new(),
            job_opening_title: String::new(),
            salutation: None,
            first_name: String::new(),
            last_name: String::new(),
            email: "someone@example.com".to_string(),
            cover_letter: String::new(),
            submitted_at: None,
        };
        assert_eq!(
            builder.link_for_record(&record).as_str(),
            "https://example.com/admin/apps/"
        );
    }
}
