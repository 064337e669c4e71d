//! Predicate clauses sent to the data store.
//!
//! A query is a conjunction of `Predicate`s. Every store backend must give a
//! clause the same meaning, including for missing column values: a comparison
//! against a NULL column is false, so a posting without `salary_max` never
//! satisfies an active `salary_max <= n` clause.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::job::{CompanySize, ExperienceLevel, JobPosting, JobType};
use crate::search::filter::{FilterConfig, QuickFilter, HIGH_SALARY_THRESHOLD};

/// Title keywords of the "tech" quick filter.
pub const TECH_TITLE_KEYWORDS: [&str; 4] = ["developer", "engineer", "programmer", "tech"];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    IsActive,
    Title,
    Company,
    Description,
    Location,
    JobType,
    ExperienceLevel,
    CompanySize,
    SalaryMin,
    SalaryMax,
    CreatedAt,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::IsActive => "is_active",
            Column::Title => "title",
            Column::Company => "company",
            Column::Description => "description",
            Column::Location => "location",
            Column::JobType => "job_type",
            Column::ExperienceLevel => "experience_level",
            Column::CompanySize => "company_size",
            Column::SalaryMin => "salary_min",
            Column::SalaryMax => "salary_max",
            Column::CreatedAt => "created_at",
        }
    }

    /// Reads the column off a posting. `None` stands for SQL NULL.
    pub fn read(&self, job: &JobPosting) -> Option<Value> {
        match self {
            Column::IsActive => Some(Value::Bool(job.is_active)),
            Column::Title => Some(Value::Text(job.title.clone())),
            Column::Company => Some(Value::Text(job.company.clone())),
            Column::Description => Some(Value::Text(job.description.clone())),
            Column::Location => Some(Value::Text(job.location.clone())),
            Column::JobType => Some(Value::from(job.job_type)),
            Column::ExperienceLevel => job.experience_level.map(Value::from),
            Column::CompanySize => job.company_size.map(Value::from),
            Column::SalaryMin => job.salary_min.map(Value::Int),
            Column::SalaryMax => job.salary_max.map(Value::Int),
            Column::CreatedAt => Some(Value::Timestamp(job.created_at)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Text(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Ordering between values of the same kind; mixed kinds never compare.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<JobType> for Value {
    fn from(v: JobType) -> Self {
        Value::Text(v.as_str().to_string())
    }
}

impl From<ExperienceLevel> for Value {
    fn from(v: ExperienceLevel) -> Self {
        Value::Text(v.as_str().to_string())
    }
}

impl From<CompanySize> for Value {
    fn from(v: CompanySize) -> Self {
        Value::Text(v.as_str().to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { column: Column, value: Value },
    /// Case-insensitive substring match. `needle` is raw user text, not a pattern.
    Contains { column: Column, needle: String },
    Gte { column: Column, value: Value },
    Lte { column: Column, value: Value },
    Or { any: Vec<Predicate> },
}

impl Predicate {
    pub fn equals(column: Column, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            column,
            value: value.into(),
        }
    }

    pub fn contains(column: Column, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            column,
            needle: needle.into(),
        }
    }

    pub fn gte(column: Column, value: impl Into<Value>) -> Self {
        Predicate::Gte {
            column,
            value: value.into(),
        }
    }

    pub fn lte(column: Column, value: impl Into<Value>) -> Self {
        Predicate::Lte {
            column,
            value: value.into(),
        }
    }

    pub fn or(any: Vec<Predicate>) -> Self {
        Predicate::Or { any }
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        match self {
            Predicate::Eq { column, value } => column.read(job).is_some_and(|v| &v == value),
            Predicate::Contains { column, needle } => match column.read(job) {
                Some(Value::Text(text)) => contains_ignore_case(&text, needle),
                _ => false,
            },
            Predicate::Gte { column, value } => column
                .read(job)
                .and_then(|v| v.compare(value))
                .is_some_and(|o| o != Ordering::Less),
            Predicate::Lte { column, value } => column
                .read(job)
                .and_then(|v| v.compare(value))
                .is_some_and(|o| o != Ordering::Greater),
            Predicate::Or { any } => any.iter().any(|p| p.matches(job)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Translates a filter into the conjunction of clauses the store must satisfy.
/// `now` anchors the "date posted" window.
pub fn build_predicates(filter: &FilterConfig, now: DateTime<Utc>) -> Vec<Predicate> {
    let mut predicates = vec![Predicate::equals(Column::IsActive, true)];

    if let Some(term) = filter.search_term() {
        predicates.push(Predicate::or(vec![
            Predicate::contains(Column::Title, term),
            Predicate::contains(Column::Company, term),
            Predicate::contains(Column::Description, term),
        ]));
    }

    if let Some(job_type) = filter.job_type {
        predicates.push(Predicate::equals(Column::JobType, job_type));
    }

    if let Some(location) = filter.location() {
        predicates.push(Predicate::contains(Column::Location, location));
    }

    if let Some(level) = filter.experience_level {
        predicates.push(Predicate::equals(Column::ExperienceLevel, level));
    }

    if let Some(min) = filter.salary_range.active_min() {
        predicates.push(Predicate::gte(Column::SalaryMin, min));
    }

    if let Some(max) = filter.salary_range.active_max() {
        predicates.push(Predicate::lte(Column::SalaryMax, max));
    }

    if let Some(bucket) = filter.date_posted {
        predicates.push(Predicate::gte(Column::CreatedAt, bucket.cutoff(now)));
    }

    if let Some(size) = filter.company_size {
        predicates.push(Predicate::equals(Column::CompanySize, size));
    }

    predicates.extend(filter.quick_filters.iter().map(|q| quick_filter_predicate(*q)));

    predicates
}

pub fn quick_filter_predicate(quick: QuickFilter) -> Predicate {
    match quick {
        QuickFilter::Remote => Predicate::or(vec![
            Predicate::equals(Column::JobType, JobType::Remote),
            Predicate::contains(Column::Location, "remote"),
        ]),
        QuickFilter::EntryLevel => {
            Predicate::equals(Column::ExperienceLevel, ExperienceLevel::Entry)
        }
        QuickFilter::HighSalary => Predicate::gte(Column::SalaryMin, HIGH_SALARY_THRESHOLD),
        QuickFilter::FullTime => Predicate::equals(Column::JobType, JobType::FullTime),
        QuickFilter::Startup => Predicate::equals(Column::CompanySize, CompanySize::Startup),
        QuickFilter::Tech => Predicate::or(
            TECH_TITLE_KEYWORDS
                .iter()
                .map(|kw| Predicate::contains(Column::Title, *kw))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter::DatePosted;
    use crate::search::test_support::posting;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_default_filter_only_requires_active() {
        let predicates = build_predicates(&FilterConfig::default(), now());
        assert_eq!(predicates, vec![Predicate::equals(Column::IsActive, true)]);
    }

    #[test]
    fn test_default_salary_bounds_add_no_clause() {
        let filter = FilterConfig::new().with_salary_range(0, 200_000);
        assert_eq!(build_predicates(&filter, now()).len(), 1);
    }

    #[test]
    fn test_search_term_is_three_way_or() {
        let filter = FilterConfig::new().with_search_term("rust");
        let predicates = build_predicates(&filter, now());
        assert_eq!(predicates.len(), 2);
        match &predicates[1] {
            Predicate::Or { any } => assert_eq!(any.len(), 3),
            other => panic!("expected OR clause, got {other:?}"),
        }
    }

    #[test]
    fn test_salary_bounds_inside_slider() {
        let filter = FilterConfig::new().with_salary_range(60_000, 150_000);
        let predicates = build_predicates(&filter, now());
        assert!(predicates.contains(&Predicate::gte(Column::SalaryMin, 60_000i64)));
        assert!(predicates.contains(&Predicate::lte(Column::SalaryMax, 150_000i64)));
    }

    #[test]
    fn test_missing_salary_fails_active_bound() {
        let mut job = posting("Designer", "Acme", JobType::FullTime, now());
        job.salary_max = None;
        assert!(!Predicate::lte(Column::SalaryMax, 150_000i64).matches(&job));
        job.salary_max = Some(120_000);
        assert!(Predicate::lte(Column::SalaryMax, 150_000i64).matches(&job));
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let job = posting("Senior RUST Developer", "Acme", JobType::FullTime, now());
        assert!(Predicate::contains(Column::Title, "rust").matches(&job));
        assert!(!Predicate::contains(Column::Title, "golang").matches(&job));
    }

    #[test]
    fn test_remote_quick_filter_matches_type_or_location() {
        let remote_type = posting("Writer", "Acme", JobType::Remote, now());
        let mut remote_location = posting("Writer", "Acme", JobType::Contract, now());
        remote_location.location = "Remote (EU)".to_string();
        let onsite = posting("Writer", "Acme", JobType::Contract, now());

        let p = quick_filter_predicate(QuickFilter::Remote);
        assert!(p.matches(&remote_type));
        assert!(p.matches(&remote_location));
        assert!(!p.matches(&onsite));
    }

    #[test]
    fn test_startup_quick_filter_uses_company_size() {
        let mut job = posting("Founding Engineer", "Tiny", JobType::FullTime, now());
        let p = quick_filter_predicate(QuickFilter::Startup);
        assert!(!p.matches(&job));
        job.company_size = Some(CompanySize::Startup);
        assert!(p.matches(&job));
    }

    #[test]
    fn test_date_bucket_cutoff() {
        let filter = FilterConfig::new().with_date_posted(DatePosted::Last24Hours);
        let predicates = build_predicates(&filter, now());
        let fresh = posting("A", "B", JobType::FullTime, now() - Duration::hours(10));
        let stale = posting("A", "B", JobType::FullTime, now() - Duration::hours(30));
        assert!(predicates.iter().all(|p| p.matches(&fresh)));
        assert!(!predicates.iter().all(|p| p.matches(&stale)));
    }

    #[test]
    fn test_inactive_posting_never_matches() {
        let mut job = posting("A", "B", JobType::FullTime, now());
        job.is_active = false;
        let predicates = build_predicates(&FilterConfig::default(), now());
        assert!(!predicates.iter().all(|p| p.matches(&job)));
    }

    fn passes(filter: &FilterConfig, job: &JobPosting) -> bool {
        build_predicates(filter, now()).iter().all(|p| p.matches(job))
    }

    #[test]
    fn test_location_is_case_insensitive_substring() {
        let filter = FilterConfig::new().with_location("francisco");
        let mut job = posting("Engineer", "Acme", JobType::FullTime, now());
        job.location = "San Francisco, CA".to_string();
        assert!(passes(&filter, &job));

        job.location = "Berlin".to_string();
        assert!(!passes(&filter, &job));
    }

    #[test]
    fn test_experience_level_exact_match() {
        let filter = FilterConfig::new().with_experience_level(ExperienceLevel::Senior);
        let mut job = posting("Engineer", "Acme", JobType::FullTime, now());
        assert!(!passes(&filter, &job));

        job.experience_level = Some(ExperienceLevel::Mid);
        assert!(!passes(&filter, &job));

        job.experience_level = Some(ExperienceLevel::Senior);
        assert!(passes(&filter, &job));
    }

    #[test]
    fn test_company_size_exact_match() {
        let filter = FilterConfig::new().with_company_size(CompanySize::Large);
        let mut job = posting("Engineer", "Acme", JobType::FullTime, now());
        assert!(!passes(&filter, &job));

        job.company_size = Some(CompanySize::Medium);
        assert!(!passes(&filter, &job));

        job.company_size = Some(CompanySize::Large);
        assert!(passes(&filter, &job));
    }

    #[test]
    fn test_entry_level_quick_filter() {
        let filter = FilterConfig::new().with_quick_filter(QuickFilter::EntryLevel);
        let mut job = posting("Engineer", "Acme", JobType::FullTime, now());
        assert!(!passes(&filter, &job));

        job.experience_level = Some(ExperienceLevel::Mid);
        assert!(!passes(&filter, &job));

        job.experience_level = Some(ExperienceLevel::Entry);
        assert!(passes(&filter, &job));
    }

    #[test]
    fn test_high_salary_quick_filter_boundary() {
        let filter = FilterConfig::new().with_quick_filter(QuickFilter::HighSalary);
        let mut job = posting("Engineer", "Acme", JobType::FullTime, now());
        assert!(!passes(&filter, &job));

        job.salary_min = Some(HIGH_SALARY_THRESHOLD - 1);
        assert!(!passes(&filter, &job));

        job.salary_min = Some(HIGH_SALARY_THRESHOLD);
        assert!(passes(&filter, &job));
    }
}
