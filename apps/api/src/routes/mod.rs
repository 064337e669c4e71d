pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_search_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/mine", get(jobs::handle_my_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:id/deactivate",
            patch(jobs::handle_deactivate_job),
        )
        // Applications
        .route("/api/v1/jobs/:id/apply", post(applications::handle_apply))
        .route(
            "/api/v1/applications",
            get(applications::handle_my_applications),
        )
        // Profile
        .route(
            "/api/v1/profile",
            get(profiles::handle_get_profile).post(profiles::handle_complete_profile),
        )
        .with_state(state)
}
