#![allow(dead_code)]

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::{CompanySize, ExperienceLevel, JobType};
use crate::models::UnknownVariant;

/// Lower bound of the salary slider. A minimum at the floor is not a filter.
pub const SALARY_FLOOR: i64 = 0;
/// Upper bound of the salary slider. A maximum at the ceiling is not a filter.
pub const SALARY_CEILING: i64 = 200_000;
/// `salary_min` threshold of the "high-salary" quick filter.
pub const HIGH_SALARY_THRESHOLD: i64 = 100_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
}

impl Default for SalaryRange {
    fn default() -> Self {
        Self {
            min: SALARY_FLOOR,
            max: SALARY_CEILING,
        }
    }
}

impl SalaryRange {
    /// The minimum that should become a predicate, if any.
    pub fn active_min(&self) -> Option<i64> {
        (self.min > SALARY_FLOOR).then_some(self.min)
    }

    /// The maximum that should become a predicate, if any.
    pub fn active_max(&self) -> Option<i64> {
        (self.max < SALARY_CEILING).then_some(self.max)
    }
}

/// "Posted within" bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatePosted {
    #[serde(rename = "24h")]
    Last24Hours,
    #[serde(rename = "3d")]
    Last3Days,
    #[serde(rename = "1w")]
    LastWeek,
    #[serde(rename = "1m")]
    LastMonth,
}

impl DatePosted {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatePosted::Last24Hours => "24h",
            DatePosted::Last3Days => "3d",
            DatePosted::LastWeek => "1w",
            DatePosted::LastMonth => "1m",
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            DatePosted::Last24Hours => Duration::hours(24),
            DatePosted::Last3Days => Duration::days(3),
            DatePosted::LastWeek => Duration::days(7),
            DatePosted::LastMonth => Duration::days(30),
        }
    }

    /// Oldest `created_at` that still falls inside the bucket.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window()
    }
}

impl FromStr for DatePosted {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(DatePosted::Last24Hours),
            "3d" => Ok(DatePosted::Last3Days),
            "1w" => Ok(DatePosted::LastWeek),
            "1m" => Ok(DatePosted::LastMonth),
            other => Err(UnknownVariant::new("date_posted", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Salary,
    Company,
    Relevance,
}

impl FromStr for SortBy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortBy::Date),
            "salary" => Ok(SortBy::Salary),
            "company" => Ok(SortBy::Company),
            "relevance" => Ok(SortBy::Relevance),
            other => Err(UnknownVariant::new("sort_by", other)),
        }
    }
}

/// Named toggles that each add one fixed predicate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QuickFilter {
    Remote,
    EntryLevel,
    HighSalary,
    FullTime,
    Startup,
    Tech,
}

impl QuickFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuickFilter::Remote => "remote",
            QuickFilter::EntryLevel => "entry-level",
            QuickFilter::HighSalary => "high-salary",
            QuickFilter::FullTime => "full-time",
            QuickFilter::Startup => "startup",
            QuickFilter::Tech => "tech",
        }
    }
}

impl FromStr for QuickFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(QuickFilter::Remote),
            "entry-level" => Ok(QuickFilter::EntryLevel),
            "high-salary" => Ok(QuickFilter::HighSalary),
            "full-time" => Ok(QuickFilter::FullTime),
            "startup" => Ok(QuickFilter::Startup),
            "tech" => Ok(QuickFilter::Tech),
            other => Err(UnknownVariant::new("quick_filter", other)),
        }
    }
}

/// Everything the job search UI lets a user pick. Immutable once built;
/// a change of filter means a new value and a new query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub search_term: Option<String>,
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub salary_range: SalaryRange,
    pub date_posted: Option<DatePosted>,
    pub company_size: Option<CompanySize>,
    pub sort_by: SortBy,
    pub quick_filters: BTreeSet<QuickFilter>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_job_type(mut self, job_type: JobType) -> Self {
        self.job_type = Some(job_type);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_experience_level(mut self, level: ExperienceLevel) -> Self {
        self.experience_level = Some(level);
        self
    }

    pub fn with_salary_range(mut self, min: i64, max: i64) -> Self {
        self.salary_range = SalaryRange { min, max };
        self
    }

    pub fn with_date_posted(mut self, bucket: DatePosted) -> Self {
        self.date_posted = Some(bucket);
        self
    }

    pub fn with_company_size(mut self, size: CompanySize) -> Self {
        self.company_size = Some(size);
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_quick_filter(mut self, quick: QuickFilter) -> Self {
        self.quick_filters.insert(quick);
        self
    }

    /// The free-text term, or `None` when it is absent or only whitespace.
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search_term.as_deref())
    }

    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    /// Rejects values no UI control should be able to produce.
    pub fn validate(&self) -> Result<(), String> {
        let SalaryRange { min, max } = self.salary_range;
        if min < 0 {
            return Err(format!("salary minimum cannot be negative (got {min})"));
        }
        if max < 0 {
            return Err(format!("salary maximum cannot be negative (got {max})"));
        }
        // A maximum at the ceiling means "no upper bound", so only a set
        // maximum can conflict with the minimum.
        if self.salary_range.active_max().is_some_and(|max| min > max) {
            return Err(format!(
                "salary minimum {min} is greater than salary maximum {max}"
            ));
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_salary_range_is_inactive() {
        let range = SalaryRange::default();
        assert_eq!(range.active_min(), None);
        assert_eq!(range.active_max(), None);
    }

    #[test]
    fn test_salary_bounds_activate_inside_slider() {
        let range = SalaryRange {
            min: 50_000,
            max: 120_000,
        };
        assert_eq!(range.active_min(), Some(50_000));
        assert_eq!(range.active_max(), Some(120_000));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let filter = FilterConfig::new().with_salary_range(150_000, 90_000);
        let err = filter.validate().unwrap_err();
        assert!(err.contains("greater than"), "{err}");
    }

    #[test]
    fn test_minimum_above_ceiling_without_maximum_is_valid() {
        let filter = FilterConfig::new().with_salary_range(250_000, SALARY_CEILING);
        assert!(filter.validate().is_ok());
        assert_eq!(filter.salary_range.active_min(), Some(250_000));
        assert_eq!(filter.salary_range.active_max(), None);
    }

    #[test]
    fn test_negative_minimum_is_rejected() {
        assert!(FilterConfig::new()
            .with_salary_range(-1, 10)
            .validate()
            .is_err());
    }

    #[test]
    fn test_blank_search_term_is_ignored() {
        let filter = FilterConfig::new().with_search_term("   ");
        assert_eq!(filter.search_term(), None);
        let filter = FilterConfig::new().with_search_term(" rust ");
        assert_eq!(filter.search_term(), Some("rust"));
    }

    #[test]
    fn test_date_cutoffs() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        assert_eq!(
            DatePosted::Last24Hours.cutoff(now),
            Utc.with_ymd_and_hms(2024, 6, 29, 12, 0, 0).unwrap()
        );
        assert_eq!(
            DatePosted::LastWeek.cutoff(now),
            Utc.with_ymd_and_hms(2024, 6, 23, 12, 0, 0).unwrap()
        );
        assert_eq!(
            DatePosted::LastMonth.cutoff(now),
            Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_quick_filter_wire_names() {
        let parsed: BTreeSet<QuickFilter> =
            serde_json::from_str(r#"["entry-level","high-salary","tech"]"#).unwrap();
        assert!(parsed.contains(&QuickFilter::EntryLevel));
        assert!(parsed.contains(&QuickFilter::HighSalary));
        assert_eq!("startup".parse::<QuickFilter>().unwrap(), QuickFilter::Startup);
    }

    #[test]
    fn test_filter_config_deserializes_with_defaults() {
        let filter: FilterConfig = serde_json::from_str(r#"{"sort_by":"salary"}"#).unwrap();
        assert_eq!(filter.sort_by, SortBy::Salary);
        assert_eq!(filter.salary_range, SalaryRange::default());
        assert!(filter.quick_filters.is_empty());
    }
}
