use serde_json::{Map, Value};

use crate::api::validation::{amount_field, choice_field, email_field, Violations};
use crate::db::models::{JobPatch, JobStatus, JobType, NewJob};

/// Body of `POST /jobs` as received. Fields stay untyped until validated so
/// every rule can report its own message. Unknown fields are dropped.
#[derive(Debug, Default)]
pub struct CreateJobPayload {
    pub job_type: Option<Value>,
    pub price_in_pence: Option<Value>,
    pub contact_email: Option<Value>,
    pub status: Option<Value>,
}

impl From<Map<String, Value>> for CreateJobPayload {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            job_type: body.remove("type"),
            price_in_pence: body.remove("priceInPence"),
            contact_email: body.remove("contactEmail"),
            status: body.remove("status"),
        }
    }
}

impl CreateJobPayload {
    pub fn validate(self, violations: &mut Violations) -> Option<NewJob> {
        let job_type = violations.check(choice_field::<JobType>("type", self.job_type));
        let price_in_pence = violations.check(amount_field("priceInPence", self.price_in_pence));
        let contact_email = violations.check(email_field("contactEmail", self.contact_email));
        let status = violations.check(choice_field::<JobStatus>("status", self.status));

        Some(NewJob {
            job_type: job_type?,
            price_in_pence: price_in_pence?,
            contact_email: contact_email?,
            status: status?,
        })
    }
}

/// Body of `PATCH /jobs/{id}`. `type` and `priceInPence` are write-once and
/// are dropped along with any other unknown field.
#[derive(Debug, Default)]
pub struct PatchJobPayload {
    pub contact_email: Option<Value>,
    pub status: Option<Value>,
}

impl From<Map<String, Value>> for PatchJobPayload {
    fn from(mut body: Map<String, Value>) -> Self {
        Self {
            contact_email: body.remove("contactEmail"),
            status: body.remove("status"),
        }
    }
}

impl PatchJobPayload {
    pub fn validate(self, violations: &mut Violations) -> Option<JobPatch> {
        let contact_email = violations.check(email_field("contactEmail", self.contact_email));
        let status = violations.check(choice_field::<JobStatus>("status", self.status));

        Some(JobPatch {
            status: status?,
            contact_email: contact_email?,
        })
    }
}
