use super::domain::{
    Application, ApplicationId, ApplicationStatus, Company, CompanyId, DeleteMode,
    DeletionReceipt, Job, JobId, StatusDecision, UserId,
};

/// Storage abstraction for jobs and applications.
///
/// Every method is a single atomic step against the store. Implementations must hold
/// whatever lock or transaction is needed so that the check-then-write operations
/// (`insert_application`, `transition_status`, `delete_job`) cannot interleave with
/// each other for the same job or application.
pub trait BoardRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Jobs newest first, optionally restricted to one recruiter.
    fn list_jobs(&self, recruiter: Option<&UserId>) -> Result<Vec<Job>, RepositoryError>;
    /// Removes the job according to `mode`. `NotFound` when the job is gone,
    /// `Conflict(ApplicationsOutstanding)` when a guarded delete finds applications.
    fn delete_job(&self, id: &JobId, mode: DeleteMode) -> Result<DeletionReceipt, RepositoryError>;

    /// Fails with `Conflict(DuplicateApplication)` when the applicant already applied and
    /// `NotFound` when the referenced job no longer exists.
    fn insert_application(&self, application: Application)
        -> Result<Application, RepositoryError>;
    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;
    fn find_application(
        &self,
        applicant: &UserId,
        job: &JobId,
    ) -> Result<Option<Application>, RepositoryError>;
    /// Applications for one job, oldest first.
    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError>;
    /// Applications submitted by one applicant, newest first.
    fn applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, RepositoryError>;
    /// Compare-and-set from `pending` to the decided status.
    fn transition_status(
        &self,
        id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<Application, RepositoryError>;
}

/// Lookup and registration of companies referenced by jobs.
pub trait CompanyDirectory: Send + Sync {
    /// Fails with `Conflict(DuplicateCompany)` when the name is taken (case-insensitive).
    fn register(&self, company: Company) -> Result<Company, RepositoryError>;
    fn get_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn companies_owned_by(&self, owner: &UserId) -> Result<Vec<Company>, RepositoryError>;
}

/// Invariant violations detected by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("applicant '{applicant}' already applied to job '{job}'")]
    DuplicateApplication { applicant: UserId, job: JobId },
    #[error("application is already {status}; decisions are final")]
    AlreadyDecided { status: ApplicationStatus },
    #[error("job still has {pending} pending and {decided} decided application(s); use force to delete")]
    ApplicationsOutstanding { pending: usize, decided: usize },
    #[error("company '{name}' is already registered")]
    DuplicateCompany { name: String },
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
