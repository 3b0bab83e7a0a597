use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::board::domain::{
    Application, ApplicationId, Caller, Company, CompanyId, CompanyInput, DeleteMode,
    DeletionReceipt, Job, JobId, JobInput, RequirementsInput, StatusDecision, UserId,
};
use crate::board::identity::{AuthenticationError, IdentityProvider, SessionRegistry};
use crate::board::memory::{InMemoryBoardStore, InMemoryCompanyDirectory};
use crate::board::repository::{BoardRepository, RepositoryError};
use crate::board::router::board_router;
use crate::board::service::JobBoardService;

pub(super) type MemoryService = JobBoardService<InMemoryBoardStore, InMemoryCompanyDirectory>;

pub(super) const RECRUITER_TOKEN: &str = "tok-recruiter";
pub(super) const OTHER_RECRUITER_TOKEN: &str = "tok-other-recruiter";
pub(super) const STUDENT_TOKEN: &str = "tok-student";
pub(super) const OTHER_STUDENT_TOKEN: &str = "tok-other-student";

pub(super) fn recruiter() -> Caller {
    Caller::recruiter("recruiter-1")
}

pub(super) fn other_recruiter() -> Caller {
    Caller::recruiter("recruiter-2")
}

pub(super) fn student() -> Caller {
    Caller::student("student-1")
}

pub(super) fn other_student() -> Caller {
    Caller::student("student-2")
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryBoardStore>,
    Arc<InMemoryCompanyDirectory>,
) {
    let repository = Arc::new(InMemoryBoardStore::new());
    let directory = Arc::new(InMemoryCompanyDirectory::new());
    let service = JobBoardService::new(repository.clone(), directory.clone());
    (service, repository, directory)
}

pub(super) fn company_input(name: &str) -> CompanyInput {
    CompanyInput {
        name: name.to_string(),
        description: Some("Hiring platform".to_string()),
        website: None,
        location: Some("Pune".to_string()),
    }
}

pub(super) fn job_input(company_id: &CompanyId, title: &str) -> JobInput {
    JobInput {
        title: title.to_string(),
        description: "Design and run the job board API".to_string(),
        requirements: RequirementsInput::List(vec!["Rust".to_string(), "SQL".to_string()]),
        salary: 24.0,
        experience_years: 3,
        location: "Pune".to_string(),
        job_type: "Full Time".to_string(),
        positions: 2,
        company_id: company_id.clone(),
    }
}

/// Registers "Acme Hiring" for the default recruiter and posts one job against it.
pub(super) fn seeded_job(service: &MemoryService, title: &str) -> (Company, Job) {
    let company = service
        .register_company(&recruiter(), company_input("Acme Hiring"))
        .expect("company registers");
    let job = service
        .post_job(&recruiter(), job_input(&company.id, title))
        .expect("job posts");
    (company, job)
}

pub(super) fn identity() -> Arc<dyn IdentityProvider> {
    Arc::new(SessionRegistry::from_sessions([
        (RECRUITER_TOKEN.to_string(), recruiter()),
        (OTHER_RECRUITER_TOKEN.to_string(), other_recruiter()),
        (STUDENT_TOKEN.to_string(), student()),
        (OTHER_STUDENT_TOKEN.to_string(), other_student()),
    ]))
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    board_router(Arc::new(service), identity())
}

pub(super) fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose backing database is gone.
pub(super) struct UnavailableRepository;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl BoardRepository for UnavailableRepository {
    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn fetch_job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn list_jobs(&self, _recruiter: Option<&UserId>) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn delete_job(
        &self,
        _id: &JobId,
        _mode: DeleteMode,
    ) -> Result<DeletionReceipt, RepositoryError> {
        offline()
    }

    fn insert_application(
        &self,
        _application: Application,
    ) -> Result<Application, RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn find_application(
        &self,
        _applicant: &UserId,
        _job: &JobId,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn applications_for_job(&self, _job: &JobId) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn applications_by_applicant(
        &self,
        _applicant: &UserId,
    ) -> Result<Vec<Application>, RepositoryError> {
        offline()
    }

    fn transition_status(
        &self,
        _id: &ApplicationId,
        _decision: StatusDecision,
    ) -> Result<Application, RepositoryError> {
        offline()
    }
}

/// Identity provider whose session table cannot be read.
pub(super) struct UnavailableIdentity;

impl IdentityProvider for UnavailableIdentity {
    fn authenticate(&self, _token: &str) -> Result<Caller, AuthenticationError> {
        Err(AuthenticationError::Unavailable)
    }
}
