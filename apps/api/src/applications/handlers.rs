use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationWithJob};
use crate::models::user::UserType;
use crate::profiles::require_role;
use crate::state::AppState;
use crate::store::NewApplication;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApplyRequest {
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

/// POST /api/v1/jobs/:id/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(job_id): Path<Uuid>,
    Json(req): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    require_role(&state, &user, UserType::Jobseeker).await?;

    let job = state
        .store
        .get_job(job_id)
        .await?
        .filter(|j| j.is_active)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

    let application = state
        .store
        .insert_application(NewApplication {
            job_id: job.id,
            applicant_id: user.id(),
            cover_letter: req.cover_letter.filter(|c| !c.trim().is_empty()),
            resume_url: req.resume_url.filter(|u| !u.trim().is_empty()),
        })
        .await?;

    info!(job_id = %job.id, applicant = %user.id(), "Application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

/// GET /api/v1/applications
pub async fn handle_my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ApplicationWithJob>>, AppError> {
    let applications = state.store.applications_for(user.id()).await?;
    Ok(Json(applications))
}
