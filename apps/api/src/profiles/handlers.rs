use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompleteProfileRequest {
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
}

/// Only recruiters carry a company on their profile.
fn recruiter_company(user_type: UserType, company: Option<String>) -> Option<String> {
    match user_type {
        UserType::Recruiter => company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        UserType::Jobseeker => None,
    }
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .store
        .get_profile(user.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not completed".to_string()))?;
    Ok(Json(profile))
}

/// POST /api/v1/profile
///
/// Creates the profile row for a freshly signed-up identity. The role is
/// fixed from then on.
pub async fn handle_complete_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CompleteProfileRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "first_name and last_name cannot be empty".to_string(),
        ));
    }
    let email = user
        .0
        .email
        .clone()
        .ok_or_else(|| AppError::Validation("Account has no email address".to_string()))?;

    let profile = state
        .store
        .insert_profile(UserProfile {
            id: user.id(),
            email,
            user_type: req.user_type,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            company: recruiter_company(req.user_type, req.company),
            created_at: Utc::now(),
        })
        .await?;

    info!(user_id = %profile.id, user_type = profile.user_type.as_str(), "Profile completed");
    Ok((StatusCode::CREATED, Json(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobseeker_company_dropped() {
        assert_eq!(
            recruiter_company(UserType::Jobseeker, Some("Acme".to_string())),
            None
        );
    }

    #[test]
    fn test_recruiter_company_trimmed() {
        assert_eq!(
            recruiter_company(UserType::Recruiter, Some("  Acme ".to_string())),
            Some("Acme".to_string())
        );
        assert_eq!(recruiter_company(UserType::Recruiter, Some("  ".to_string())), None);
    }
}
