use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::job::JobPosting;
use crate::search::filter::FilterConfig;
use crate::search::ordering::sort_postings;
use crate::search::predicate::{build_predicates, Column, Predicate};
use crate::store::{DataStore, StoreError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid filter: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Single-column ordering pushed down to the store.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub descending: bool,
}

/// What the store is asked for: active postings matching every predicate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobQuery {
    pub predicates: Vec<Predicate>,
    pub order_by: OrderBy,
}

impl JobQuery {
    pub fn from_filter(filter: &FilterConfig, now: DateTime<Utc>) -> Self {
        Self {
            predicates: build_predicates(filter, now),
            order_by: OrderBy {
                column: Column::CreatedAt,
                descending: true,
            },
        }
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        self.predicates.iter().all(|p| p.matches(job))
    }
}

/// Runs one search: validate, query the store once, order the rows.
///
/// An empty result is success. A store failure is returned as-is with no
/// partial rows and no retry.
pub async fn search_jobs(
    store: &dyn DataStore,
    filter: &FilterConfig,
    now: DateTime<Utc>,
) -> Result<Vec<JobPosting>, SearchError> {
    filter.validate().map_err(SearchError::Validation)?;

    let query = JobQuery::from_filter(filter, now);
    debug!(
        predicates = query.predicates.len(),
        sort_by = ?filter.sort_by,
        "Dispatching job search"
    );

    let mut postings = store.select_jobs(&query).await?;

    sort_postings(&mut postings, filter.sort_by, filter.search_term());
    debug!(results = postings.len(), "Job search complete");
    Ok(postings)
}
