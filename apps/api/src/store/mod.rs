//! Data store seam. Every persistent read or write goes through `DataStore`.
//!
//! `PgStore` talks to PostgreSQL; `MemoryStore` holds a snapshot in memory and
//! evaluates the same predicates, for local runs and tests.
//!
//! `AppState` holds an `Arc<dyn DataStore>`, picked at startup via config.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationWithJob};
use crate::models::job::{JobPosting, NewJobPosting};
use crate::models::user::UserProfile;
use crate::search::query::JobQuery;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Fields of an application supplied by the applicant.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
}

#[async_trait]
pub trait DataStore: Send + Sync {
    /// Active postings matching every predicate, in the query's order.
    async fn select_jobs(&self, query: &JobQuery) -> Result<Vec<JobPosting>, StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;

    async fn insert_job(
        &self,
        posted_by: Uuid,
        job: NewJobPosting,
    ) -> Result<JobPosting, StoreError>;

    /// Every posting owned by `owner`, active or not, newest first.
    async fn jobs_posted_by(&self, owner: Uuid) -> Result<Vec<JobPosting>, StoreError>;

    /// Sets `is_active = false`. Returns `None` when no such posting exists.
    async fn deactivate_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;

    async fn insert_application(&self, new: NewApplication) -> Result<Application, StoreError>;

    /// Applications by `applicant` joined with their postings, newest first.
    async fn applications_for(
        &self,
        applicant: Uuid,
    ) -> Result<Vec<ApplicationWithJob>, StoreError>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    async fn insert_profile(&self, profile: UserProfile) -> Result<UserProfile, StoreError>;
}
