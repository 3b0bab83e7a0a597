//! Mutex-backed store used by the service binary, the demo and the tests.
//!
//! One lock guards all tables so that the uniqueness check in `insert_application`, the
//! compare-and-set in `transition_status`, and the guard plus cascade in `delete_job`
//! each run as a single critical section.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Company, CompanyId, DeleteMode,
    DeletionReceipt, Job, JobId, StatusDecision, UserId,
};
use super::repository::{BoardRepository, CompanyDirectory, ConflictError, RepositoryError};

#[derive(Default)]
struct BoardTables {
    next_sequence: u64,
    jobs: HashMap<JobId, (u64, Job)>,
    applications: HashMap<ApplicationId, (u64, Application)>,
    by_applicant_and_job: HashMap<(UserId, JobId), ApplicationId>,
}

impl BoardTables {
    fn sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn applications_of(&self, job: &JobId) -> Vec<&(u64, Application)> {
        self.applications
            .values()
            .filter(|(_, application)| &application.job_id == job)
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryBoardStore {
    tables: Mutex<BoardTables>,
}

impl InMemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BoardTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("board store lock poisoned".to_string()))
    }
}

impl BoardRepository for InMemoryBoardStore {
    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut tables = self.lock()?;
        if tables.jobs.contains_key(&job.id) {
            return Err(RepositoryError::Unavailable(format!(
                "job id '{}' reused",
                job.id
            )));
        }
        let sequence = tables.sequence();
        tables.jobs.insert(job.id.clone(), (sequence, job.clone()));
        Ok(job)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.jobs.get(id).map(|(_, job)| job.clone()))
    }

    fn list_jobs(&self, recruiter: Option<&UserId>) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.lock()?;
        let mut jobs: Vec<&(u64, Job)> = tables
            .jobs
            .values()
            .filter(|(_, job)| recruiter.map_or(true, |owner| job.is_owned_by(owner)))
            .collect();
        jobs.sort_by(|(left_seq, left), (right_seq, right)| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right_seq.cmp(left_seq))
        });
        Ok(jobs.into_iter().map(|(_, job)| job.clone()).collect())
    }

    fn delete_job(&self, id: &JobId, mode: DeleteMode) -> Result<DeletionReceipt, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.jobs.contains_key(id) {
            return Err(RepositoryError::NotFound);
        }

        let dependents: Vec<(ApplicationId, ApplicationStatus)> = tables
            .applications_of(id)
            .into_iter()
            .map(|(_, application)| (application.id.clone(), application.status))
            .collect();

        if mode == DeleteMode::Guarded && !dependents.is_empty() {
            let decided = dependents
                .iter()
                .filter(|(_, status)| status.is_terminal())
                .count();
            return Err(ConflictError::ApplicationsOutstanding {
                pending: dependents.len() - decided,
                decided,
            }
            .into());
        }

        for (application_id, _) in &dependents {
            if let Some((_, application)) = tables.applications.remove(application_id) {
                tables
                    .by_applicant_and_job
                    .remove(&(application.applicant_id, application.job_id));
            }
        }
        tables.jobs.remove(id);

        Ok(DeletionReceipt {
            job_id: id.clone(),
            mode,
            removed_applications: dependents.len(),
        })
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.jobs.contains_key(&application.job_id) {
            return Err(RepositoryError::NotFound);
        }

        let key = (
            application.applicant_id.clone(),
            application.job_id.clone(),
        );
        if tables.by_applicant_and_job.contains_key(&key) {
            return Err(ConflictError::DuplicateApplication {
                applicant: key.0,
                job: key.1,
            }
            .into());
        }

        let sequence = tables.sequence();
        tables
            .by_applicant_and_job
            .insert(key, application.id.clone());
        tables
            .applications
            .insert(application.id.clone(), (sequence, application.clone()));
        Ok(application)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .applications
            .get(id)
            .map(|(_, application)| application.clone()))
    }

    fn find_application(
        &self,
        applicant: &UserId,
        job: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        let tables = self.lock()?;
        let found = tables
            .by_applicant_and_job
            .get(&(applicant.clone(), job.clone()))
            .and_then(|id| tables.applications.get(id))
            .map(|(_, application)| application.clone());
        Ok(found)
    }

    fn applications_for_job(&self, job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.lock()?;
        let mut applications = tables.applications_of(job);
        applications.sort_by(|(left_seq, left), (right_seq, right)| {
            left.created_at
                .cmp(&right.created_at)
                .then(left_seq.cmp(right_seq))
        });
        Ok(applications
            .into_iter()
            .map(|(_, application)| application.clone())
            .collect())
    }

    fn applications_by_applicant(
        &self,
        applicant: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let tables = self.lock()?;
        let mut applications: Vec<&(u64, Application)> = tables
            .applications
            .values()
            .filter(|(_, application)| &application.applicant_id == applicant)
            .collect();
        applications.sort_by(|(left_seq, left), (right_seq, right)| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right_seq.cmp(left_seq))
        });
        Ok(applications
            .into_iter()
            .map(|(_, application)| application.clone())
            .collect())
    }

    fn transition_status(
        &self,
        id: &ApplicationId,
        decision: StatusDecision,
    ) -> Result<Application, RepositoryError> {
        let mut tables = self.lock()?;
        let (_, application) = tables
            .applications
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;

        let next = application
            .status
            .decide(decision)
            .ok_or(ConflictError::AlreadyDecided {
                status: application.status,
            })?;
        application.status = next;
        Ok(application.clone())
    }
}

#[derive(Default)]
pub struct InMemoryCompanyDirectory {
    companies: Mutex<HashMap<CompanyId, Company>>,
}

impl InMemoryCompanyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CompanyId, Company>>, RepositoryError> {
        self.companies.lock().map_err(|_| {
            RepositoryError::Unavailable("company directory lock poisoned".to_string())
        })
    }
}

impl CompanyDirectory for InMemoryCompanyDirectory {
    fn register(&self, company: Company) -> Result<Company, RepositoryError> {
        let mut companies = self.lock()?;
        let taken = companies
            .values()
            .any(|existing| existing.name.eq_ignore_ascii_case(&company.name));
        if taken {
            return Err(ConflictError::DuplicateCompany { name: company.name }.into());
        }
        companies.insert(company.id.clone(), company.clone());
        Ok(company)
    }

    fn get_company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn companies_owned_by(&self, owner: &UserId) -> Result<Vec<Company>, RepositoryError> {
        let companies = self.lock()?;
        let mut owned: Vec<Company> = companies
            .values()
            .filter(|company| &company.owner_id == owner)
            .cloned()
            .collect();
        owned.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then_with(|| right.id.cmp(&left.id))
        });
        Ok(owned)
    }
}
