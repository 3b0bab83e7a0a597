use std::collections::BTreeSet;

use super::domain::{CompanyId, CompanyInput, JobInput};

/// Rejections raised before anything reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("field '{field}' is required")]
    MissingField { field: &'static str },
    #[error("at least one requirement must be listed")]
    NoRequirements,
    #[error("salary must be a positive number (found {found})")]
    InvalidSalary { found: f64 },
    #[error("positions must be at least 1 (found {found})")]
    InvalidPositions { found: u32 },
    #[error("malformed request body: {0}")]
    Malformed(String),
}

/// Trimmed, checked job fields ready to be stamped with ids and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JobDraft {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) requirements: BTreeSet<String>,
    pub(crate) salary: f64,
    pub(crate) experience_years: u32,
    pub(crate) location: String,
    pub(crate) job_type: String,
    pub(crate) positions: u32,
    pub(crate) company_id: CompanyId,
}

pub(crate) fn validate_job(input: JobInput) -> Result<JobDraft, ValidationError> {
    let title = required("title", input.title)?;
    let description = required("description", input.description)?;
    let location = required("location", input.location)?;
    let job_type = required("job_type", input.job_type)?;
    let company_id = CompanyId(required("company_id", input.company_id.0)?);

    let requirements = input.requirements.entries();
    if requirements.is_empty() {
        return Err(ValidationError::NoRequirements);
    }

    if !input.salary.is_finite() || input.salary <= 0.0 {
        return Err(ValidationError::InvalidSalary {
            found: input.salary,
        });
    }

    if input.positions < 1 {
        return Err(ValidationError::InvalidPositions {
            found: input.positions,
        });
    }

    Ok(JobDraft {
        title,
        description,
        requirements,
        salary: input.salary,
        experience_years: input.experience_years,
        location,
        job_type,
        positions: input.positions,
        company_id,
    })
}

pub(crate) fn validate_company(input: CompanyInput) -> Result<CompanyInput, ValidationError> {
    Ok(CompanyInput {
        name: required("name", input.name)?,
        description: optional(input.description),
        website: optional(input.website),
        location: optional(input.location),
    })
}

/// Case-insensitive substring match against any of the haystacks. A blank keyword
/// matches everything.
pub(crate) fn matches_keyword<'a>(
    keyword: Option<&str>,
    haystacks: impl IntoIterator<Item = &'a str>,
) -> bool {
    let needle = match keyword.map(str::trim) {
        Some(needle) if !needle.is_empty() => needle.to_lowercase(),
        _ => return true,
    };

    haystacks
        .into_iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_string())
        .filter(|inner| !inner.is_empty())
}
