use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use super::domain::{
    Application, ApplicationId, Caller, Company, CompanyId, CompanyInput, DeletionReceipt, Job,
    JobDetail, JobId, JobInput, StatusDecision,
};
use super::identity::{AuthenticationError, IdentityProvider};
use super::repository::{BoardRepository, CompanyDirectory};
use super::service::{BoardError, ErrorKind, JobBoardService};
use super::validation::ValidationError;

/// Cookie the web client stores its session token in.
pub const DEFAULT_SESSION_COOKIE: &str = "token";

/// Shared handler state: the service plus the identity provider that resolves callers.
pub struct BoardState<R, D> {
    service: Arc<JobBoardService<R, D>>,
    identity: Arc<dyn IdentityProvider>,
    session_cookie: Arc<str>,
}

impl<R, D> Clone for BoardState<R, D> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            identity: self.identity.clone(),
            session_cookie: self.session_cookie.clone(),
        }
    }
}

impl<R, D> BoardState<R, D> {
    fn caller(&self, headers: &HeaderMap) -> Result<Caller, BoardError> {
        let jar = CookieJar::from_headers(headers);
        let token = jar
            .get(&self.session_cookie)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| bearer_token(headers))
            .ok_or(AuthenticationError::MissingToken)?;

        self.identity.authenticate(&token).map_err(|err| {
            match err {
                AuthenticationError::Unavailable => error!(%err, "identity lookup failed"),
                _ => warn!(%err, "authentication denied"),
            }
            BoardError::from(err)
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Router builder exposing the job, application and company endpoints.
pub fn board_router<R, D>(
    service: Arc<JobBoardService<R, D>>,
    identity: Arc<dyn IdentityProvider>,
) -> Router
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    board_router_with_cookie(service, identity, DEFAULT_SESSION_COOKIE)
}

pub fn board_router_with_cookie<R, D>(
    service: Arc<JobBoardService<R, D>>,
    identity: Arc<dyn IdentityProvider>,
    session_cookie: &str,
) -> Router
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let state = BoardState {
        service,
        identity,
        session_cookie: Arc::from(session_cookie),
    };

    Router::new()
        .route(
            "/jobs",
            post(post_job_handler::<R, D>).get(list_jobs_handler::<R, D>),
        )
        .route("/jobs/mine", get(my_jobs_handler::<R, D>))
        .route(
            "/jobs/:job_id",
            get(job_detail_handler::<R, D>).delete(delete_job_handler::<R, D>),
        )
        .route(
            "/applications/apply/:job_id",
            get(apply_handler::<R, D>),
        )
        .route("/applications/mine", get(my_applications_handler::<R, D>))
        .route(
            "/applications/jobs/:job_id",
            get(applicants_handler::<R, D>),
        )
        .route(
            "/applications/:application_id/status",
            patch(status_handler::<R, D>),
        )
        .route("/companies", post(register_company_handler::<R, D>))
        .route("/companies/mine", get(my_companies_handler::<R, D>))
        .route("/companies/:company_id", get(company_handler::<R, D>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeywordQuery {
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DeleteJobQuery {
    #[serde(default)]
    force: bool,
}

/// Optional `DELETE /jobs/{id}` body; the web client posts `{"force": true}`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DeleteJobRequest {
    #[serde(default)]
    force: bool,
}

impl DeleteJobRequest {
    fn from_body(body: &[u8]) -> Result<Self, BoardError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|err| ValidationError::Malformed(err.to_string()).into())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StatusUpdateRequest {
    status: StatusDecision,
}

fn malformed(rejection: JsonRejection) -> BoardError {
    ValidationError::Malformed(rejection.body_text()).into()
}

fn malformed_query(rejection: QueryRejection) -> BoardError {
    ValidationError::Malformed(rejection.body_text()).into()
}

pub(crate) async fn post_job_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    payload: Result<Json<JobInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let Json(input) = payload.map_err(malformed)?;
    let job = state.service.post_job(&caller, input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "job_id": job.id, "job": job })),
    ))
}

pub(crate) async fn list_jobs_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    query: Result<Query<KeywordQuery>, QueryRejection>,
) -> Result<Json<Vec<Job>>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    state.caller(&headers)?;
    let Query(query) = query.map_err(malformed_query)?;
    let jobs = state.service.list_jobs(query.keyword.as_deref())?;
    Ok(Json(jobs))
}

pub(crate) async fn my_jobs_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    query: Result<Query<KeywordQuery>, QueryRejection>,
) -> Result<Json<Vec<Job>>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let Query(query) = query.map_err(malformed_query)?;
    let jobs = state
        .service
        .list_jobs_by_recruiter(&caller, query.keyword.as_deref())?;
    Ok(Json(jobs))
}

pub(crate) async fn job_detail_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<JobDetail>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let detail = state.service.job_detail(&JobId(job_id), &caller)?;
    Ok(Json(detail))
}

pub(crate) async fn delete_job_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    query: Result<Query<DeleteJobQuery>, QueryRejection>,
    body: Bytes,
) -> Result<Json<DeletionReceipt>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let Query(query) = query.map_err(malformed_query)?;
    let request = DeleteJobRequest::from_body(&body)?;
    let force = query.force || request.force;
    let receipt = state
        .service
        .delete_job(&JobId(job_id), &caller.user_id, force)?;
    Ok(Json(receipt))
}

pub(crate) async fn apply_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let application = state.service.apply(&caller, &JobId(job_id))?;
    Ok(Json(json!({
        "application_id": application.id,
        "job_id": application.job_id,
        "status": application.status,
    })))
}

pub(crate) async fn my_applications_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Application>>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    Ok(Json(state.service.applications_for(&caller)?))
}

pub(crate) async fn applicants_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<Vec<Application>>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let applicants = state
        .service
        .list_applicants(&JobId(job_id), &caller.user_id)?;
    Ok(Json(applicants))
}

pub(crate) async fn status_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<Application>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let Json(request) = payload.map_err(malformed)?;
    let updated = state.service.set_status(
        &ApplicationId(application_id),
        &caller.user_id,
        request.status,
    )?;
    Ok(Json(updated))
}

pub(crate) async fn register_company_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    payload: Result<Json<CompanyInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Company>), BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    let Json(input) = payload.map_err(malformed)?;
    let company = state.service.register_company(&caller, input)?;
    Ok((StatusCode::CREATED, Json(company)))
}

pub(crate) async fn my_companies_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Company>>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    let caller = state.caller(&headers)?;
    Ok(Json(state.service.companies_for(&caller)?))
}

pub(crate) async fn company_handler<R, D>(
    State(state): State<BoardState<R, D>>,
    headers: HeaderMap,
    Path(company_id): Path<String>,
) -> Result<Json<Company>, BoardError>
where
    R: BoardRepository + 'static,
    D: CompanyDirectory + 'static,
{
    state.caller(&headers)?;
    Ok(Json(state.service.get_company(&CompanyId(company_id))?))
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if let BoardError::Unavailable(detail) = &self {
            error!(%detail, "board storage failure");
        }

        let payload = json!({
            "error": kind.label(),
            "message": self.to_string(),
        });
        (status_for(kind), Json(payload)).into_response()
    }
}
