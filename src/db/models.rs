use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A closed set of string values accepted on the wire.
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.as_str() == value)
    }

    /// Renders the set as `[A,B,C]`
    fn listing() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(Choice::as_str).collect();
        format!("[{}]", names.join(","))
    }
}

/// Kind of engagement a job represents
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    OnDemand,
    Shift,
    Scheduled,
}

impl Choice for JobType {
    const ALL: &'static [Self] = &[JobType::OnDemand, JobType::Shift, JobType::Scheduled];

    fn as_str(&self) -> &'static str {
        match self {
            JobType::OnDemand => "ON_DEMAND",
            JobType::Shift => "SHIFT",
            JobType::Scheduled => "SCHEDULED",
        }
    }
}

/// Lifecycle status of a job
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Available,
    Assigned,
    Completed,
}

impl Choice for JobStatus {
    const ALL: &'static [Self] = &[JobStatus::Available, JobStatus::Assigned, JobStatus::Completed];

    fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Available => "AVAILABLE",
            JobStatus::Assigned => "ASSIGNED",
            JobStatus::Completed => "COMPLETED",
        }
    }
}

/// Validated input for creating a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub job_type: JobType,
    pub price_in_pence: i64,
    pub contact_email: Option<String>,
    pub status: JobStatus,
}

/// Validated partial update. Only the mutable fields of a job appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPatch {
    pub status: JobStatus,
    pub contact_email: Option<String>,
}

/// A persisted job posting
///
/// `id` is the external lookup key. Storage-internal keys never appear on
/// this type; each repository keeps its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: Uuid,
    pub job_type: JobType,
    pub price_in_pence: i64,
    pub contact_email: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Builds a fresh job with a new id, stamped with `now`
    pub fn create(input: NewJob, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: input.job_type,
            price_in_pence: input.price_in_pence,
            contact_email: input.contact_email,
            status: input.status,
            created_at: now,
            updated_at: None,
        }
    }

    /// Overwrites status, and contact email when given, then bumps `updated_at`
    pub fn apply_patch(&mut self, patch: JobPatch, now: DateTime<Utc>) {
        self.status = patch.status;
        if let Some(email) = patch.contact_email {
            self.contact_email = Some(email);
        }
        self.updated_at = Some(now);
    }
}

/// Current time at the precision timestamps are stored with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job() -> NewJob {
        NewJob {
            job_type: JobType::Shift,
            price_in_pence: 500,
            contact_email: Some("old@example.com".to_string()),
            status: JobStatus::Available,
        }
    }

    #[test]
    fn test_choice_listing_and_parse() {
        assert_eq!(JobType::listing(), "[ON_DEMAND,SHIFT,SCHEDULED]");
        assert_eq!(JobStatus::listing(), "[AVAILABLE,ASSIGNED,COMPLETED]");
        assert_eq!(JobType::parse("ON_DEMAND"), Some(JobType::OnDemand));
        assert_eq!(JobStatus::parse("available"), None);
    }

    #[test]
    fn test_create_assigns_identity_and_no_update_stamp() {
        let at = now();
        let first = Job::create(new_job(), at);
        let second = Job::create(new_job(), at);

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, at);
        assert!(first.updated_at.is_none());
    }

    #[test]
    fn test_apply_patch_keeps_write_once_fields() {
        let created = now();
        let mut job = Job::create(new_job(), created);
        let later = created + chrono::Duration::seconds(5);

        job.apply_patch(
            JobPatch {
                status: JobStatus::Assigned,
                contact_email: None,
            },
            later,
        );

        assert_eq!(job.status, JobStatus::Assigned);
        assert_eq!(job.contact_email.as_deref(), Some("old@example.com"));
        assert_eq!(job.job_type, JobType::Shift);
        assert_eq!(job.price_in_pence, 500);
        assert_eq!(job.created_at, created);
        assert_eq!(job.updated_at, Some(later));
    }

    #[test]
    fn test_timestamp_text_round_trips_at_millisecond_precision() {
        let at = now();
        let text = format_timestamp(&at);

        assert!(text.ends_with('Z'));
        assert_eq!(text.len(), "2026-10-18T09:30:00.123Z".len());
        assert_eq!(parse_timestamp(&text).unwrap(), at);
    }
}
