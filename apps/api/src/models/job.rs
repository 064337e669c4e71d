use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;

/// Days a posting stays listed when the recruiter does not pick an expiry.
pub const DEFAULT_LISTING_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Remote,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
        JobType::Remote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Remote => "remote",
        }
    }
}

impl FromStr for JobType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("job_type", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("experience_level", s))
    }
}

/// Headcount bucket of the hiring company.
/// startup = 1-50, small = 51-200, medium = 201-1000, large = 1000+.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Large,
}

impl CompanySize {
    pub const ALL: [CompanySize; 4] = [
        CompanySize::Startup,
        CompanySize::Small,
        CompanySize::Medium,
        CompanySize::Large,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Startup => "startup",
            CompanySize::Small => "small",
            CompanySize::Medium => "medium",
            CompanySize::Large => "large",
        }
    }
}

impl FromStr for CompanySize {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("company_size", s))
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub description: String,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub company_size: Option<CompanySize>,
    pub posted_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Recruiter-supplied fields of a new posting. Ownership, activity flag and
/// timestamps are stamped by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default = "default_currency")]
    pub salary_currency: String,
    pub description: String,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub company_size: Option<CompanySize>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl NewJobPosting {
    /// Materializes the row the store will hold for this payload.
    pub fn into_posting(self, posted_by: Uuid, now: DateTime<Utc>) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            title: self.title,
            company: self.company,
            location: self.location,
            job_type: self.job_type,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency: self.salary_currency,
            description: self.description,
            requirements: self.requirements,
            benefits: self.benefits,
            experience_level: self.experience_level,
            company_size: self.company_size,
            posted_by,
            is_active: true,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(DEFAULT_LISTING_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_round_trips_wire_names() {
        for jt in JobType::ALL {
            assert_eq!(jt.as_str().parse::<JobType>().unwrap(), jt);
        }
        assert_eq!(
            serde_json::to_string(&JobType::FullTime).unwrap(),
            "\"full-time\""
        );
    }

    #[test]
    fn test_unknown_job_type_rejected() {
        let err = "freelance".parse::<JobType>().unwrap_err();
        assert_eq!(err.field, "job_type");
        assert_eq!(err.value, "freelance");
    }

    #[test]
    fn test_new_posting_defaults() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let new: NewJobPosting = serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "company": "Acme",
            "location": "Berlin",
            "job_type": "full-time",
            "description": "Build APIs",
            "salary_min": null,
            "salary_max": null,
            "requirements": null,
            "benefits": null,
            "experience_level": "mid",
            "company_size": null
        }))
        .unwrap();
        let posting = new.into_posting(owner, now);
        assert!(posting.is_active);
        assert_eq!(posting.posted_by, owner);
        assert_eq!(posting.salary_currency, "USD");
        assert_eq!(posting.expires_at - posting.created_at, Duration::days(30));
    }
}
