//! Stale-response protection for callers that fire one search per filter
//! change. Each dispatch gets a ticket from a monotonically increasing
//! counter; only the completion carrying the latest ticket is applied.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::job::JobPosting;
use crate::search::filter::FilterConfig;
use crate::search::query::SearchError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug)]
pub enum Completion {
    /// Results replaced the current result set.
    Applied,
    /// A newer search was dispatched; the results were dropped.
    Stale,
    /// The latest search failed. The result set is now empty.
    Failed(SearchError),
}

/// Caller-owned search state: the current filter and the current results.
#[derive(Debug, Default)]
pub struct SearchSession {
    filter: FilterConfig,
    results: Vec<JobPosting>,
    latest_dispatched: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn results(&self) -> &[JobPosting] {
        &self.results
    }

    pub fn latest(&self) -> Ticket {
        Ticket(self.latest_dispatched)
    }

    /// Records `filter` as current and returns the ticket its search must carry.
    pub fn dispatch(&mut self, filter: FilterConfig) -> Ticket {
        self.latest_dispatched += 1;
        self.filter = filter;
        Ticket(self.latest_dispatched)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest_dispatched
    }

    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<Vec<JobPosting>, SearchError>,
    ) -> Completion {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.0,
                latest = self.latest_dispatched,
                "Discarding stale search response"
            );
            return Completion::Stale;
        }
        match outcome {
            Ok(results) => {
                self.results = results;
                Completion::Applied
            }
            Err(e) => {
                self.results.clear();
                Completion::Failed(e)
            }
        }
    }
}
