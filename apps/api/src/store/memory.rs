#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus, ApplicationWithJob, JobSummary};
use crate::models::job::{JobPosting, NewJobPosting};
use crate::models::user::UserProfile;
use crate::search::query::JobQuery;
use crate::store::{DataStore, NewApplication, StoreError};

#[derive(Default)]
struct Tables {
    jobs: Vec<JobPosting>,
    applications: Vec<Application>,
    profiles: Vec<UserProfile>,
}

/// In-process store. Applies the same predicate semantics and uniqueness
/// rules as the PostgreSQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    select_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: Vec<JobPosting>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                jobs,
                ..Tables::default()
            }),
            ..Self::default()
        }
    }

    /// While set, every call fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `select_jobs` calls seen so far.
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

fn newest_first(jobs: &mut [JobPosting]) {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select_jobs(&self, query: &JobQuery) -> Result<Vec<JobPosting>, StoreError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let tables = self.tables.read().await;
        let mut rows: Vec<JobPosting> = tables
            .jobs
            .iter()
            .filter(|job| query.matches(job))
            .cloned()
            .collect();

        let column = query.order_by.column;
        rows.sort_by(|a, b| {
            let ord = match (column.read(a), column.read(b)) {
                (Some(x), Some(y)) => x.compare(&y).unwrap_or(std::cmp::Ordering::Equal),
                _ => std::cmp::Ordering::Equal,
            };
            let ord = if query.order_by.descending {
                ord.reverse()
            } else {
                ord
            };
            ord.then_with(|| a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn insert_job(
        &self,
        posted_by: Uuid,
        job: NewJobPosting,
    ) -> Result<JobPosting, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.profiles.iter().any(|p| p.id == posted_by) {
            return Err(StoreError::NotFound(format!("user {posted_by}")));
        }
        let posting = job.into_posting(posted_by, Utc::now());
        tables.jobs.push(posting.clone());
        Ok(posting)
    }

    async fn jobs_posted_by(&self, owner: Uuid) -> Result<Vec<JobPosting>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<JobPosting> = tables
            .jobs
            .iter()
            .filter(|j| j.posted_by == owner)
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows)
    }

    async fn deactivate_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        Ok(tables.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            job.is_active = false;
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn insert_application(&self, new: NewApplication) -> Result<Application, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.jobs.iter().any(|j| j.id == new.job_id) {
            return Err(StoreError::NotFound(format!("job {}", new.job_id)));
        }
        if tables
            .applications
            .iter()
            .any(|a| a.job_id == new.job_id && a.applicant_id == new.applicant_id)
        {
            return Err(StoreError::Conflict(
                "already applied to this job".to_string(),
            ));
        }
        let application = Application {
            id: Uuid::new_v4(),
            job_id: new.job_id,
            applicant_id: new.applicant_id,
            status: ApplicationStatus::Pending,
            cover_letter: new.cover_letter,
            resume_url: new.resume_url,
            applied_at: Utc::now(),
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    async fn applications_for(
        &self,
        applicant: Uuid,
    ) -> Result<Vec<ApplicationWithJob>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        let mut rows: Vec<ApplicationWithJob> = tables
            .applications
            .iter()
            .filter(|a| a.applicant_id == applicant)
            .filter_map(|a| {
                let job = tables.jobs.iter().find(|j| j.id == a.job_id)?;
                Some(ApplicationWithJob {
                    application: a.clone(),
                    job: JobSummary {
                        id: job.id,
                        title: job.title.clone(),
                        company: job.company.clone(),
                        location: job.location.clone(),
                        job_type: job.job_type,
                    },
                })
            })
            .collect();
        rows.sort_by(|a, b| b.application.applied_at.cmp(&a.application.applied_at));
        Ok(rows)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_profile(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables
            .profiles
            .iter()
            .any(|p| p.id == profile.id || p.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(StoreError::Conflict("profile already exists".to_string()));
        }
        tables.profiles.push(profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobType;
    use crate::models::user::UserType;
    use crate::search::filter::FilterConfig;
    use crate::search::test_support::posting;
    use chrono::Duration;

    fn profile(id: Uuid, user_type: UserType) -> UserProfile {
        UserProfile {
            id,
            email: format!("{id}@example.com"),
            user_type,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            company: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_select_orders_newest_first_and_skips_inactive() {
        let now = Utc::now();
        let mut closed = posting("closed", "A", JobType::FullTime, now);
        closed.is_active = false;
        let store = MemoryStore::with_jobs(vec![
            posting("older", "A", JobType::FullTime, now - Duration::days(3)),
            closed,
            posting("newer", "A", JobType::FullTime, now - Duration::days(1)),
        ]);
        let query = JobQuery::from_filter(&FilterConfig::default(), now);
        let rows = store.select_jobs(&query).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn test_duplicate_application_conflicts() {
        let now = Utc::now();
        let job = posting("Engineer", "Acme", JobType::FullTime, now);
        let job_id = job.id;
        let store = MemoryStore::with_jobs(vec![job]);
        let applicant = Uuid::new_v4();
        let new = NewApplication {
            job_id,
            applicant_id: applicant,
            cover_letter: Some("Hello".to_string()),
            resume_url: None,
        };
        let first = store.insert_application(new.clone()).await.unwrap();
        assert_eq!(first.status, ApplicationStatus::Pending);
        let err = store.insert_application(new).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_deactivate_keeps_row_for_owner() {
        let owner = Uuid::new_v4();
        let mut job = posting("Engineer", "Acme", JobType::FullTime, Utc::now());
        job.posted_by = owner;
        let id = job.id;
        let store = MemoryStore::with_jobs(vec![job]);
        let updated = store.deactivate_job(id).await.unwrap().unwrap();
        assert!(!updated.is_active);
        assert_eq!(store.jobs_posted_by(owner).await.unwrap().len(), 1);
        assert!(store.deactivate_job(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_insert_is_unique() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        store
            .insert_profile(profile(id, UserType::Recruiter))
            .await
            .unwrap();
        let err = store
            .insert_profile(profile(id, UserType::Jobseeker))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_applications_join_job_summary() {
        let job = posting("Engineer", "Acme", JobType::Contract, Utc::now());
        let job_id = job.id;
        let store = MemoryStore::with_jobs(vec![job]);
        let applicant = Uuid::new_v4();
        store
            .insert_application(NewApplication {
                job_id,
                applicant_id: applicant,
                cover_letter: None,
                resume_url: None,
            })
            .await
            .unwrap();
        let rows = store.applications_for(applicant).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].job.title, "Engineer");
        assert_eq!(rows[0].job.job_type, JobType::Contract);
    }
}
