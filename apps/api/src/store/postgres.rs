use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationWithJob, JobSummary};
use crate::models::job::{JobPosting, NewJobPosting};
use crate::models::user::UserProfile;
use crate::models::UnknownVariant;
use crate::search::predicate::{Predicate, Value};
use crate::search::query::JobQuery;
use crate::store::{DataStore, NewApplication, StoreError};

const JOB_COLUMNS: &str = "id, title, company, location, job_type, salary_min, salary_max, \
     salary_currency, description, requirements, benefits, experience_level, company_size, \
     posted_by, is_active, created_at, updated_at, expires_at";

const APPLICATION_COLUMNS: &str =
    "id, job_id, applicant_id, status, cover_letter, resume_url, applied_at";

const PROFILE_COLUMNS: &str = "id, email, user_type, first_name, last_name, company, created_at";

// ────────────────────────────────────────────────────────────────────────────
// Row types (text columns decoded into domain enums on the way out)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct JobPostingRow {
    id: Uuid,
    title: String,
    company: String,
    location: String,
    job_type: String,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
    salary_currency: String,
    description: String,
    requirements: Option<String>,
    benefits: Option<String>,
    experience_level: Option<String>,
    company_size: Option<String>,
    posted_by: Uuid,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<JobPostingRow> for JobPosting {
    type Error = StoreError;

    fn try_from(row: JobPostingRow) -> Result<Self, Self::Error> {
        Ok(JobPosting {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            job_type: decode(&row.job_type)?,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            salary_currency: row.salary_currency,
            description: row.description,
            requirements: row.requirements,
            benefits: row.benefits,
            experience_level: decode_opt(row.experience_level.as_deref())?,
            company_size: decode_opt(row.company_size.as_deref())?,
            posted_by: row.posted_by,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    applicant_id: Uuid,
    status: String,
    cover_letter: Option<String>,
    resume_url: Option<String>,
    applied_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            applicant_id: row.applicant_id,
            status: decode(&row.status)?,
            cover_letter: row.cover_letter,
            resume_url: row.resume_url,
            applied_at: row.applied_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationJobRow {
    #[sqlx(flatten)]
    application: ApplicationRow,
    job_title: String,
    job_company: String,
    job_location: String,
    job_type: String,
}

impl TryFrom<ApplicationJobRow> for ApplicationWithJob {
    type Error = StoreError;

    fn try_from(row: ApplicationJobRow) -> Result<Self, Self::Error> {
        let job_id = row.application.job_id;
        Ok(ApplicationWithJob {
            application: row.application.try_into()?,
            job: JobSummary {
                id: job_id,
                title: row.job_title,
                company: row.job_company,
                location: row.job_location,
                job_type: decode(&row.job_type)?,
            },
        })
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    user_type: String,
    first_name: String,
    last_name: String,
    company: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: row.id,
            email: row.email,
            user_type: decode(&row.user_type)?,
            first_name: row.first_name,
            last_name: row.last_name,
            company: row.company,
            created_at: row.created_at,
        })
    }
}

fn decode<T: FromStr<Err = UnknownVariant>>(text: &str) -> Result<T, StoreError> {
    text.parse()
        .map_err(|e: UnknownVariant| StoreError::InvalidRow(e.to_string()))
}

fn decode_opt<T: FromStr<Err = UnknownVariant>>(
    text: Option<&str>,
) -> Result<Option<T>, StoreError> {
    text.map(decode::<T>).transpose()
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Maps constraint violations to their domain meaning.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("23505") => return StoreError::Conflict(db.message().to_string()),
            Some("23503") => return StoreError::NotFound(db.message().to_string()),
            _ => {}
        }
    }
    StoreError::Database(e)
}

// ────────────────────────────────────────────────────────────────────────────
// SQL rendering
// ────────────────────────────────────────────────────────────────────────────

/// Escapes LIKE metacharacters so user text only ever matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &Value) {
    match value {
        Value::Bool(v) => qb.push_bind(*v),
        Value::Text(v) => qb.push_bind(v.clone()),
        Value::Int(v) => qb.push_bind(*v),
        Value::Timestamp(v) => qb.push_bind(*v),
    };
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Eq { column, value } => {
            qb.push(column.as_str()).push(" = ");
            push_value(qb, value);
        }
        Predicate::Contains { column, needle } => {
            qb.push(column.as_str()).push(" ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(needle)));
        }
        Predicate::Gte { column, value } => {
            qb.push(column.as_str()).push(" >= ");
            push_value(qb, value);
        }
        Predicate::Lte { column, value } => {
            qb.push(column.as_str()).push(" <= ");
            push_value(qb, value);
        }
        Predicate::Or { any } => {
            qb.push("(");
            for (i, inner) in any.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                push_predicate(qb, inner);
            }
            qb.push(")");
        }
    }
}

/// Renders a `JobQuery` as a parameterized SELECT over `job_postings`.
pub fn build_select(query: &JobQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM job_postings"));
    for (i, predicate) in query.predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(&mut qb, predicate);
    }
    qb.push(" ORDER BY ")
        .push(query.order_by.column.as_str())
        .push(if query.order_by.descending {
            " DESC"
        } else {
            " ASC"
        })
        // Equal timestamps still come back in one fixed order.
        .push(", id");
    qb
}

// ────────────────────────────────────────────────────────────────────────────
// PgStore
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for PgStore {
    async fn select_jobs(&self, query: &JobQuery) -> Result<Vec<JobPosting>, StoreError> {
        let mut qb = build_select(query);
        debug!(sql = qb.sql(), "Selecting job postings");
        let rows: Vec<JobPostingRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        decode_all(rows)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_postings WHERE id = $1");
        let row: Option<JobPostingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobPosting::try_from).transpose()
    }

    async fn insert_job(
        &self,
        posted_by: Uuid,
        job: NewJobPosting,
    ) -> Result<JobPosting, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO job_postings
                (id, title, company, location, job_type, salary_min, salary_max,
                 salary_currency, description, requirements, benefits,
                 experience_level, company_size, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {JOB_COLUMNS}
            "#
        );
        let row: JobPostingRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.location)
            .bind(job.job_type.as_str())
            .bind(job.salary_min)
            .bind(job.salary_max)
            .bind(&job.salary_currency)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.benefits)
            .bind(job.experience_level.map(|l| l.as_str()))
            .bind(job.company_size.map(|s| s.as_str()))
            .bind(posted_by)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        row.try_into()
    }

    async fn jobs_posted_by(&self, owner: Uuid) -> Result<Vec<JobPosting>, StoreError> {
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM job_postings WHERE posted_by = $1 ORDER BY created_at DESC, id"
        );
        let rows: Vec<JobPostingRow> = sqlx::query_as(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        decode_all(rows)
    }

    async fn deactivate_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        // Logical delete: the row stays for the owner's history.
        let sql = format!(
            "UPDATE job_postings SET is_active = FALSE, updated_at = now() \
             WHERE id = $1 RETURNING {JOB_COLUMNS}"
        );
        let row: Option<JobPostingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobPosting::try_from).transpose()
    }

    async fn insert_application(&self, new: NewApplication) -> Result<Application, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO applications (id, job_id, applicant_id, cover_letter, resume_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );
        let row: ApplicationRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(new.job_id)
            .bind(new.applicant_id)
            .bind(&new.cover_letter)
            .bind(&new.resume_url)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        row.try_into()
    }

    async fn applications_for(
        &self,
        applicant: Uuid,
    ) -> Result<Vec<ApplicationWithJob>, StoreError> {
        let rows: Vec<ApplicationJobRow> = sqlx::query_as(
            r#"
            SELECT a.id, a.job_id, a.applicant_id, a.status, a.cover_letter,
                   a.resume_url, a.applied_at,
                   j.title AS job_title, j.company AS job_company,
                   j.location AS job_location, j.job_type
            FROM applications a
            JOIN job_postings j ON j.id = a.job_id
            WHERE a.applicant_id = $1
            ORDER BY a.applied_at DESC
            "#,
        )
        .bind(applicant)
        .fetch_all(&self.pool)
        .await?;
        decode_all(rows)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserProfile::try_from).transpose()
    }

    async fn insert_profile(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, user_type, first_name, last_name, company)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(profile.id)
            .bind(&profile.email)
            .bind(profile.user_type.as_str())
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.company)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::filter::{FilterConfig, QuickFilter};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn where_clause(filter: &FilterConfig) -> String {
        let qb = build_select(&JobQuery::from_filter(filter, now()));
        let sql = qb.sql();
        let start = sql.find(" WHERE ").expect("WHERE clause");
        sql[start..].to_string()
    }

    #[test]
    fn test_default_filter_sql() {
        assert_eq!(
            where_clause(&FilterConfig::default()),
            " WHERE is_active = $1 ORDER BY created_at DESC, id"
        );
    }

    #[test]
    fn test_search_term_sql_is_grouped_or() {
        let filter = FilterConfig::new().with_search_term("rust");
        assert_eq!(
            where_clause(&filter),
            " WHERE is_active = $1 AND (title ILIKE $2 OR company ILIKE $3 OR description ILIKE $4) \
             ORDER BY created_at DESC, id"
        );
    }

    #[test]
    fn test_quick_filters_sql() {
        let filter = FilterConfig::new()
            .with_quick_filter(QuickFilter::Remote)
            .with_quick_filter(QuickFilter::HighSalary);
        assert_eq!(
            where_clause(&filter),
            " WHERE is_active = $1 AND (job_type = $2 OR location ILIKE $3) \
             AND salary_min >= $4 ORDER BY created_at DESC, id"
        );
    }

    #[test]
    fn test_salary_and_date_sql() {
        let filter = FilterConfig::new()
            .with_salary_range(50_000, 150_000)
            .with_date_posted(crate::search::filter::DatePosted::LastWeek);
        assert_eq!(
            where_clause(&filter),
            " WHERE is_active = $1 AND salary_min >= $2 AND salary_max <= $3 \
             AND created_at >= $4 ORDER BY created_at DESC, id"
        );
    }

    #[test]
    fn test_order_by_breaks_ties_on_id() {
        let mut query = JobQuery::from_filter(&FilterConfig::default(), now());
        query.order_by.descending = false;
        assert!(build_select(&query).sql().ends_with(" ORDER BY created_at ASC, id"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off\\"), "100\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_decode_rejects_unknown_text() {
        let err = decode::<crate::models::job::JobType>("gig").unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow(_)));
    }
}
