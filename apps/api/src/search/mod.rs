// Job search: filter model, predicate construction, ordering and request sequencing.
// The store sees only `JobQuery`; ordering beyond created_at happens here.

pub mod filter;
pub mod ordering;
pub mod predicate;
pub mod query;
pub mod sequence;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    use crate::models::job::{JobPosting, JobType};

    pub fn posting(
        title: &str,
        company: &str,
        job_type: JobType,
        created_at: DateTime<Utc>,
    ) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: company.to_string(),
            location: "Berlin".to_string(),
            job_type,
            salary_min: None,
            salary_max: None,
            salary_currency: "USD".to_string(),
            description: String::new(),
            requirements: None,
            benefits: None,
            experience_level: None,
            company_size: None,
            posted_by: Uuid::new_v4(),
            is_active: true,
            created_at,
            updated_at: created_at,
            expires_at: created_at + Duration::days(30),
        }
    }
}
