// Job postings: search, detail, recruiter create/list/deactivate.

pub mod handlers;
pub mod validation;
