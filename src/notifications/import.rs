use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::domain::{ApplicationId, JobApplicationRecord};

/// Read application records from a CSV export with a header row.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<JobApplicationRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<ApplicationRow>() {
        records.push(row?.into_record());
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    application_id: Option<String>,
    #[serde(default)]
    applicant_display_name: String,
    #[serde(default)]
    job_opening_title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    salutation: Option<String>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    cover_letter: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    submitted_at: Option<String>,
}

impl ApplicationRow {
    fn into_record(self) -> JobApplicationRecord {
        let submitted_at = self.submitted_at.as_deref().and_then(parse_timestamp);
        let mut record = JobApplicationRecord {
            application_id: self.application_id.map(ApplicationId),
            applicant_display_name: self.applicant_display_name,
            job_opening_title: self.job_opening_title,
            salutation: self.salutation,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            cover_letter: self.cover_letter,
            submitted_at,
        };

        if record.applicant_display_name.is_empty() {
            record.applicant_display_name = record.full_name();
        }

        record
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
