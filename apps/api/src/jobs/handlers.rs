//! Axum route handlers for job postings.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::jobs::validation::validate_new_job;
use crate::models::job::{JobPosting, NewJobPosting};
use crate::models::user::UserType;
use crate::models::UnknownVariant;
use crate::profiles::require_role;
use crate::search::filter::{
    FilterConfig, QuickFilter, SalaryRange, SALARY_CEILING, SALARY_FLOOR,
};
use crate::search::query::search_jobs;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Query string of the search endpoint. Empty values mean "no filter".
/// `quick` is a comma-separated list of quick filter names.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub date_posted: Option<String>,
    pub company_size: Option<String>,
    pub sort_by: Option<String>,
    pub quick: Option<String>,
    /// Caller's request sequence number, echoed back untouched.
    pub seq: Option<u64>,
}

impl SearchParams {
    pub fn to_filter(&self) -> Result<FilterConfig, UnknownVariant> {
        Ok(FilterConfig {
            search_term: self.search.clone(),
            job_type: parse_opt(self.job_type.as_deref())?,
            location: self.location.clone(),
            experience_level: parse_opt(self.experience_level.as_deref())?,
            salary_range: SalaryRange {
                min: self.salary_min.unwrap_or(SALARY_FLOOR),
                max: self.salary_max.unwrap_or(SALARY_CEILING),
            },
            date_posted: parse_opt(self.date_posted.as_deref())?,
            company_size: parse_opt(self.company_size.as_deref())?,
            sort_by: parse_opt(self.sort_by.as_deref())?.unwrap_or_default(),
            quick_filters: self
                .quick
                .as_deref()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::parse::<QuickFilter>)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn parse_opt<T: FromStr<Err = UnknownVariant>>(
    value: Option<&str>,
) -> Result<Option<T>, UnknownVariant> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub seq: Option<u64>,
    pub count: usize,
    pub jobs: Vec<JobPosting>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
///
/// Public search over active postings. Clients that fire one request per
/// filter change should send `seq` and drop responses older than the latest.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let filter = params
        .to_filter()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let jobs = search_jobs(state.store.as_ref(), &filter, Utc::now()).await?;
    Ok(Json(SearchResponse {
        seq: params.seq,
        count: jobs.len(),
        jobs,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .filter(|j| j.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(job): Json<NewJobPosting>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    require_role(&state, &user, UserType::Recruiter).await?;
    validate_new_job(&job).map_err(|problems| AppError::Validation(problems.join("; ")))?;

    let posting = state.store.insert_job(user.id(), job).await?;
    info!(job_id = %posting.id, posted_by = %posting.posted_by, "Job posting created");
    Ok((StatusCode::CREATED, Json(posting)))
}

/// GET /api/v1/jobs/mine
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let jobs = state.store.jobs_posted_by(user.id()).await?;
    Ok(Json(jobs))
}

/// PATCH /api/v1/jobs/:id/deactivate
///
/// Logical delete. Only the posting's owner may do this.
pub async fn handle_deactivate_job(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    if job.posted_by != user.id() {
        return Err(AppError::Forbidden(
            "Only the recruiter who posted this job can deactivate it".to_string(),
        ));
    }

    let job = state
        .store
        .deactivate_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    info!(job_id = %job.id, "Job posting deactivated");
    Ok(Json(job))
}
