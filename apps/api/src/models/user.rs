use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Jobseeker,
    Recruiter,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Jobseeker => "jobseeker",
            UserType::Recruiter => "recruiter",
        }
    }
}

impl FromStr for UserType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobseeker" => Ok(UserType::Jobseeker),
            "recruiter" => Ok(UserType::Recruiter),
            other => Err(UnknownVariant::new("user_type", other)),
        }
    }
}

/// Profile row keyed by the identifier the auth provider issued.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
}
