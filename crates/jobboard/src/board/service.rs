use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::authorization::{authorize_owner, require_role, AuthorizationError};
use super::domain::{
    Application, ApplicationId, ApplicationStatus, Caller, Company, CompanyId, CompanyInput,
    DeleteMode, DeletionReceipt, Job, JobDetail, JobId, JobInput, Role, StatusDecision, UserId,
};
use super::identity::AuthenticationError;
use super::repository::{BoardRepository, CompanyDirectory, ConflictError, RepositoryError};
use super::validation::{matches_keyword, validate_company, validate_job, ValidationError};

/// Service composing the job catalog, the application ledger and the company directory.
pub struct JobBoardService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static COMPANY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_company_id() -> CompanyId {
    let id = COMPANY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CompanyId(format!("co-{id:06}"))
}

impl<R, D> JobBoardService<R, D>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>) -> Self {
        Self {
            repository,
            directory,
        }
    }

    pub fn register_company(
        &self,
        caller: &Caller,
        input: CompanyInput,
    ) -> Result<Company, BoardError> {
        require_role(caller, Role::Recruiter)?;
        let input = validate_company(input)?;

        let company = Company {
            id: next_company_id(),
            name: input.name,
            description: input.description,
            website: input.website,
            location: input.location,
            owner_id: caller.user_id.clone(),
            created_at: Utc::now(),
        };

        let stored = self.directory.register(company)?;
        info!(company_id = %stored.id, owner = %stored.owner_id, "company registered");
        Ok(stored)
    }

    pub fn get_company(&self, id: &CompanyId) -> Result<Company, BoardError> {
        self.directory
            .get_company(id)?
            .ok_or_else(|| BoardError::not_found("company", id))
    }

    pub fn companies_for(&self, caller: &Caller) -> Result<Vec<Company>, BoardError> {
        require_role(caller, Role::Recruiter)?;
        Ok(self.directory.companies_owned_by(&caller.user_id)?)
    }

    /// Validate and persist a new posting owned by the calling recruiter.
    pub fn post_job(&self, caller: &Caller, input: JobInput) -> Result<Job, BoardError> {
        require_role(caller, Role::Recruiter)?;
        let draft = validate_job(input)?;
        self.get_company(&draft.company_id)?;

        let job = Job {
            id: next_job_id(),
            title: draft.title,
            description: draft.description,
            requirements: draft.requirements,
            salary: draft.salary,
            experience_years: draft.experience_years,
            location: draft.location,
            job_type: draft.job_type,
            positions: draft.positions,
            company_id: draft.company_id,
            recruiter_id: caller.user_id.clone(),
            created_at: Utc::now(),
        };

        let stored = self.repository.insert_job(job)?;
        info!(job_id = %stored.id, recruiter = %stored.recruiter_id, "job posted");
        Ok(stored)
    }

    /// Every job, newest first, optionally filtered by a keyword over title and description.
    pub fn list_jobs(&self, keyword: Option<&str>) -> Result<Vec<Job>, BoardError> {
        let jobs = self.repository.list_jobs(None)?;
        Ok(jobs
            .into_iter()
            .filter(|job| {
                matches_keyword(keyword, [job.title.as_str(), job.description.as_str()])
            })
            .collect())
    }

    /// Jobs posted by the caller; the keyword matches title or company name.
    pub fn list_jobs_by_recruiter(
        &self,
        caller: &Caller,
        keyword: Option<&str>,
    ) -> Result<Vec<Job>, BoardError> {
        require_role(caller, Role::Recruiter)?;
        let jobs = self.repository.list_jobs(Some(&caller.user_id))?;

        let mut company_names: HashMap<CompanyId, String> = HashMap::new();
        let mut matching = Vec::with_capacity(jobs.len());
        for job in jobs {
            if !company_names.contains_key(&job.company_id) {
                let name = self
                    .directory
                    .get_company(&job.company_id)?
                    .map(|company| company.name)
                    .unwrap_or_default();
                company_names.insert(job.company_id.clone(), name);
            }
            let company_name = company_names
                .get(&job.company_id)
                .map(String::as_str)
                .unwrap_or_default();
            if matches_keyword(keyword, [job.title.as_str(), company_name]) {
                matching.push(job);
            }
        }
        Ok(matching)
    }

    pub fn get_job(&self, id: &JobId) -> Result<Job, BoardError> {
        self.repository
            .fetch_job(id)?
            .ok_or_else(|| BoardError::not_found("job", id))
    }

    /// Job as rendered on the detail page for a signed-in caller.
    pub fn job_detail(&self, id: &JobId, caller: &Caller) -> Result<JobDetail, BoardError> {
        let job = self.get_job(id)?;
        let company_name = self
            .directory
            .get_company(&job.company_id)?
            .map(|company| company.name);
        let applicant_count = self.repository.applications_for_job(id)?.len();
        let has_applied = self.has_applied(&caller.user_id, id)?;

        Ok(JobDetail {
            job,
            company_name,
            applicant_count,
            has_applied,
        })
    }

    /// Remove a job owned by `caller`. Without `force`, a job that still has applications
    /// is left untouched; with `force`, its applications are removed alongside it.
    pub fn delete_job(
        &self,
        id: &JobId,
        caller: &UserId,
        force: bool,
    ) -> Result<DeletionReceipt, BoardError> {
        let job = self.get_job(id)?;
        authorize_owner(caller, &job.recruiter_id).map_err(|err| {
            warn!(job_id = %id, caller = %caller, "job deletion refused");
            err
        })?;

        let mode = DeleteMode::from_force_flag(force);
        let receipt = self
            .repository
            .delete_job(id, mode)
            .map_err(|err| match err {
                RepositoryError::NotFound => BoardError::not_found("job", id),
                other => other.into(),
            })?;

        info!(
            job_id = %id,
            mode = ?receipt.mode,
            removed_applications = receipt.removed_applications,
            "job deleted"
        );
        Ok(receipt)
    }

    /// Record that the calling applicant applied to `job_id`.
    pub fn apply(&self, caller: &Caller, job_id: &JobId) -> Result<Application, BoardError> {
        require_role(caller, Role::Student)?;
        self.get_job(job_id)?;

        let application = Application {
            id: next_application_id(),
            job_id: job_id.clone(),
            applicant_id: caller.user_id.clone(),
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };

        let stored = self
            .repository
            .insert_application(application)
            .map_err(|err| match err {
                RepositoryError::NotFound => BoardError::not_found("job", job_id),
                other => other.into(),
            })?;

        info!(
            application_id = %stored.id,
            job_id = %stored.job_id,
            applicant = %stored.applicant_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Applications for a job, oldest first. Only the posting recruiter may look.
    pub fn list_applicants(
        &self,
        job_id: &JobId,
        caller: &UserId,
    ) -> Result<Vec<Application>, BoardError> {
        let job = self.get_job(job_id)?;
        authorize_owner(caller, &job.recruiter_id)?;
        Ok(self.repository.applications_for_job(job_id)?)
    }

    /// Decide a pending application. The owning recruiter is re-read from the job on
    /// every call.
    pub fn set_status(
        &self,
        application_id: &ApplicationId,
        caller: &UserId,
        decision: StatusDecision,
    ) -> Result<Application, BoardError> {
        let application = self
            .repository
            .fetch_application(application_id)?
            .ok_or_else(|| BoardError::not_found("application", application_id))?;
        let job = self.get_job(&application.job_id)?;
        authorize_owner(caller, &job.recruiter_id)?;

        let updated = self
            .repository
            .transition_status(application_id, decision)
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    BoardError::not_found("application", application_id)
                }
                other => other.into(),
            })?;

        info!(
            application_id = %updated.id,
            job_id = %updated.job_id,
            status = %updated.status,
            "application decided"
        );
        Ok(updated)
    }

    pub fn has_applied(&self, applicant: &UserId, job_id: &JobId) -> Result<bool, BoardError> {
        let found = self.repository.find_application(applicant, job_id)?;
        debug!(
            applicant = %applicant,
            job_id = %job_id,
            applied = found.is_some(),
            "application lookup"
        );
        Ok(found.is_some())
    }

    /// Applications submitted by the calling applicant, newest first.
    pub fn applications_for(&self, caller: &Caller) -> Result<Vec<Application>, BoardError> {
        require_role(caller, Role::Student)?;
        Ok(self.repository.applications_by_applicant(&caller.user_id)?)
    }
}

/// Stable error kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Error raised by the job board service.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    /// The detail stays in logs; the caller only sees that storage failed.
    #[error("storage unavailable")]
    Unavailable(String),
}

impl BoardError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        BoardError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::Validation(_) => ErrorKind::Validation,
            BoardError::Authentication(AuthenticationError::Unavailable) => ErrorKind::Internal,
            BoardError::Authentication(_) => ErrorKind::Authentication,
            BoardError::Authorization(_) => ErrorKind::Authorization,
            BoardError::NotFound { .. } => ErrorKind::NotFound,
            BoardError::Conflict(_) => ErrorKind::Conflict,
            BoardError::Unavailable(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepositoryError> for BoardError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict(conflict) => BoardError::Conflict(conflict),
            RepositoryError::NotFound => BoardError::not_found("record", "unknown"),
            RepositoryError::Unavailable(detail) => BoardError::Unavailable(detail),
        }
    }
}
