use std::cmp::{Ordering, Reverse};

use crate::models::job::JobPosting;
use crate::search::filter::SortBy;
use crate::search::predicate::contains_ignore_case;

/// Orders the rows the store returned. All orderings are stable, so rows that
/// compare equal keep the store's order (newest first).
pub fn sort_postings(postings: &mut [JobPosting], sort_by: SortBy, search_term: Option<&str>) {
    match sort_by {
        SortBy::Date => postings.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Salary => postings.sort_by_key(|p| Reverse(p.salary_max.unwrap_or(0))),
        SortBy::Company => postings.sort_by(|a, b| collate(&a.company, &b.company)),
        SortBy::Relevance => {
            // Without a term every score is zero; keep the store order.
            if let Some(term) = search_term {
                postings.sort_by_cached_key(|p| Reverse(relevance_score(p, term)));
            }
        }
    }
}

/// 2 points for a title hit, 1 for a company hit.
pub fn relevance_score(posting: &JobPosting, term: &str) -> u8 {
    let title = if contains_ignore_case(&posting.title, term) { 2 } else { 0 };
    let company = if contains_ignore_case(&posting.company, term) { 1 } else { 0 };
    title + company
}

/// Case-folded comparison with a byte-order tie-break, so "acme" and "Acme"
/// sit together but still have a total order.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
