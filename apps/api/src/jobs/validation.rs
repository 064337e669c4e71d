use crate::models::job::NewJobPosting;

/// Checks a recruiter's posting before it reaches the store.
/// Collects every problem rather than stopping at the first.
pub fn validate_new_job(job: &NewJobPosting) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    for (field, value) in [
        ("title", &job.title),
        ("company", &job.company),
        ("location", &job.location),
        ("description", &job.description),
    ] {
        if value.trim().is_empty() {
            problems.push(format!("{field} cannot be empty"));
        }
    }

    if job.salary_currency.trim().len() != 3 {
        problems.push(format!(
            "salary_currency must be a 3-letter code, got '{}'",
            job.salary_currency
        ));
    }

    if job.salary_min.is_some_and(|v| v < 0) || job.salary_max.is_some_and(|v| v < 0) {
        problems.push("salaries cannot be negative".to_string());
    }

    if let (Some(min), Some(max)) = (job.salary_min, job.salary_max) {
        if min > max {
            problems.push(format!(
                "salary_min {min} is greater than salary_max {max}"
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobType;

    fn job() -> NewJobPosting {
        NewJobPosting {
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            job_type: JobType::Remote,
            salary_min: Some(90_000),
            salary_max: Some(120_000),
            salary_currency: "USD".to_string(),
            description: "Build the search API".to_string(),
            requirements: None,
            benefits: None,
            experience_level: None,
            company_size: None,
        }
    }

    #[test]
    fn test_valid_posting_passes() {
        assert!(validate_new_job(&job()).is_ok());
    }

    #[test]
    fn test_blank_fields_all_reported() {
        let mut j = job();
        j.title = "  ".to_string();
        j.description = String::new();
        let problems = validate_new_job(&j).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("title"));
    }

    #[test]
    fn test_inverted_salary_rejected() {
        let mut j = job();
        j.salary_min = Some(150_000);
        let problems = validate_new_job(&j).unwrap_err();
        assert!(problems[0].contains("greater than"));
    }

    #[test]
    fn test_open_ended_salary_allowed() {
        let mut j = job();
        j.salary_max = None;
        assert!(validate_new_job(&j).is_ok());
    }

    #[test]
    fn test_bad_currency_rejected() {
        let mut j = job();
        j.salary_currency = "DOLLARS".to_string();
        assert!(validate_new_job(&j).is_err());
    }
}
