pub mod handlers;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserType};
use crate::state::AppState;

/// Loads the caller's profile and checks it has the given role.
pub async fn require_role(
    state: &AppState,
    user: &CurrentUser,
    role: UserType,
) -> Result<UserProfile, AppError> {
    let profile = state.store.get_profile(user.id()).await?.ok_or_else(|| {
        AppError::Forbidden("Complete your profile before continuing".to_string())
    })?;
    if profile.user_type != role {
        return Err(AppError::Forbidden(format!(
            "Only {} accounts can do this",
            role.as_str()
        )));
    }
    Ok(profile)
}
