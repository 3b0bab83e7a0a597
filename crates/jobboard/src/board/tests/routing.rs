use super::common::*;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::board::memory::InMemoryCompanyDirectory;
use crate::board::router::{board_router, board_router_with_cookie};
use crate::board::service::JobBoardService;

async fn send(router: &Router, request: Request<axum::body::Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    (status, read_json_body(response).await)
}

/// Router with one company owned by the default recruiter; returns the company id.
async fn router_with_company() -> (Router, String) {
    let (service, _, _) = build_service();
    let router = router_with_service(service);
    let (status, body) = send(
        &router,
        request(
            "POST",
            "/companies",
            Some(RECRUITER_TOKEN),
            Some(json!({ "companyName": "Acme Hiring", "location": "Pune" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let company_id = body["id"].as_str().expect("company id").to_string();
    (router, company_id)
}

fn job_body(company_id: &str) -> Value {
    json!({
        "title": "Backend Engineer",
        "description": "Own the hiring API",
        "requirements": "Rust, SQL, Rust",
        "salary": 18.5,
        "experienceLevel": 2,
        "location": "Remote",
        "jobType": "Full Time",
        "position": 3,
        "companyId": company_id,
    })
}

async fn post_job(router: &Router, company_id: &str) -> String {
    let (status, body) = send(
        router,
        request("POST", "/jobs", Some(RECRUITER_TOKEN), Some(job_body(company_id))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["job_id"].as_str().expect("job id").to_string()
}

#[tokio::test]
async fn post_job_returns_created_with_normalized_requirements() {
    let (router, company_id) = router_with_company().await;

    let (status, body) = send(
        &router,
        request("POST", "/jobs", Some(RECRUITER_TOKEN), Some(job_body(&company_id))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["job"]["requirements"], json!(["Rust", "SQL"]));
    assert_eq!(body["job"]["positions"], json!(3));
    assert_eq!(body["job"]["recruiter_id"], json!("recruiter-1"));
    assert_eq!(body["job_id"], body["job"]["id"]);
}

#[tokio::test]
async fn requests_without_a_known_session_are_unauthenticated() {
    let (router, _) = router_with_company().await;

    let (status, body) = send(&router, request("GET", "/jobs", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("authentication"));

    let (status, _) = send(&router, request("GET", "/jobs", Some("forged"), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_header_is_accepted_when_no_cookie_is_sent() {
    let (router, _) = router_with_company().await;

    let response = router
        .clone()
        .oneshot(
            Request::get("/jobs")
                .header(header::AUTHORIZATION, format!("Bearer {STUDENT_TOKEN}"))
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));
}

#[tokio::test]
async fn custom_cookie_name_is_honoured() {
    let (service, _, _) = build_service();
    let router = board_router_with_cookie(Arc::new(service), identity(), "session");

    let response = router
        .clone()
        .oneshot(
            Request::get("/jobs")
                .header(header::COOKIE, format!("session={STUDENT_TOKEN}"))
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = send(&router, request("GET", "/jobs", Some(STUDENT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_job_bodies_are_validation_errors() {
    let (router, company_id) = router_with_company().await;

    let mut zero_salary = job_body(&company_id);
    zero_salary["salary"] = json!(0);
    let (status, body) = send(
        &router,
        request("POST", "/jobs", Some(RECRUITER_TOKEN), Some(zero_salary)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation"));

    let mut missing_title = job_body(&company_id);
    missing_title
        .as_object_mut()
        .expect("object body")
        .remove("title");
    let (status, body) = send(
        &router,
        request("POST", "/jobs", Some(RECRUITER_TOKEN), Some(missing_title)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation"));

    let mut unknown_field = job_body(&company_id);
    unknown_field["bonus"] = json!(true);
    let (status, _) = send(
        &router,
        request("POST", "/jobs", Some(RECRUITER_TOKEN), Some(unknown_field)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn students_cannot_post_jobs() {
    let (router, company_id) = router_with_company().await;

    let (status, body) = send(
        &router,
        request("POST", "/jobs", Some(STUDENT_TOKEN), Some(job_body(&company_id))),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], json!("authorization"));
}

#[tokio::test]
async fn apply_twice_conflicts_and_detail_reflects_application() {
    let (router, company_id) = router_with_company().await;
    let job_id = post_job(&router, &company_id).await;
    let apply_uri = format!("/applications/apply/{job_id}");

    let (status, body) = send(&router, request("GET", &apply_uri, Some(STUDENT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("pending"));
    assert_eq!(body["job_id"], json!(job_id));

    let (status, body) = send(&router, request("GET", &apply_uri, Some(STUDENT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("conflict"));

    let (status, detail) = send(
        &router,
        request("GET", &format!("/jobs/{job_id}"), Some(STUDENT_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["applicant_count"], json!(1));
    assert_eq!(detail["has_applied"], json!(true));
    assert_eq!(detail["company_name"], json!("Acme Hiring"));

    let (status, mine) = send(
        &router,
        request("GET", "/applications/mine", Some(STUDENT_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn status_updates_are_owner_only_and_single_shot() {
    let (router, company_id) = router_with_company().await;
    let job_id = post_job(&router, &company_id).await;
    let (_, applied) = send(
        &router,
        request(
            "GET",
            &format!("/applications/apply/{job_id}"),
            Some(STUDENT_TOKEN),
            None,
        ),
    )
    .await;
    let status_uri = format!(
        "/applications/{}/status",
        applied["application_id"].as_str().expect("application id")
    );

    let (status, _) = send(
        &router,
        request(
            "GET",
            &format!("/applications/jobs/{job_id}"),
            Some(OTHER_RECRUITER_TOKEN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        request(
            "PATCH",
            &status_uri,
            Some(OTHER_RECRUITER_TOKEN),
            Some(json!({ "status": "accepted" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        request(
            "PATCH",
            &status_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "status": "pending" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        request(
            "PATCH",
            &status_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "status": "Accepted" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("accepted"));

    let (status, _) = send(
        &router,
        request(
            "PATCH",
            &status_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "status": "rejected" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, applicants) = send(
        &router,
        request(
            "GET",
            &format!("/applications/jobs/{job_id}"),
            Some(RECRUITER_TOKEN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(applicants[0]["status"], json!("accepted"));
}

#[tokio::test]
async fn delete_is_guarded_unless_forced() {
    let (router, company_id) = router_with_company().await;
    let job_id = post_job(&router, &company_id).await;
    let job_uri = format!("/jobs/{job_id}");
    send(
        &router,
        request(
            "GET",
            &format!("/applications/apply/{job_id}"),
            Some(STUDENT_TOKEN),
            None,
        ),
    )
    .await;

    let (status, _) = send(&router, request("DELETE", &job_uri, Some(RECRUITER_TOKEN), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &router,
        request(
            "DELETE",
            &format!("{job_uri}?force=true"),
            Some(OTHER_RECRUITER_TOKEN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, receipt) = send(
        &router,
        request(
            "DELETE",
            &format!("{job_uri}?force=true"),
            Some(RECRUITER_TOKEN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["removed_applications"], json!(1));
    assert_eq!(receipt["mode"], json!("forced"));

    let (status, body) = send(&router, request("GET", &job_uri, Some(STUDENT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
}

#[tokio::test]
async fn recruiter_listing_and_company_lookup() {
    let (router, company_id) = router_with_company().await;
    post_job(&router, &company_id).await;

    let (status, jobs) = send(
        &router,
        request("GET", "/jobs/mine?keyword=acme", Some(RECRUITER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().map(Vec::len), Some(1));

    let (status, jobs) = send(
        &router,
        request("GET", "/jobs/mine", Some(OTHER_RECRUITER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs, json!([]));

    let (status, company) = send(
        &router,
        request(
            "GET",
            &format!("/companies/{company_id}"),
            Some(STUDENT_TOKEN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(company["name"], json!("Acme Hiring"));

    let (status, _) = send(
        &router,
        request(
            "POST",
            "/companies",
            Some(OTHER_RECRUITER_TOKEN),
            Some(json!({ "name": "ACME HIRING" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn storage_outage_returns_internal_error_without_detail() {
    let service = JobBoardService::new(
        Arc::new(UnavailableRepository),
        Arc::new(InMemoryCompanyDirectory::new()),
    );
    let router = board_router(Arc::new(service), identity());

    let (status, body) = send(&router, request("GET", "/jobs", Some(STUDENT_TOKEN), None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("internal"));
    assert!(!body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("database offline"));
}

async fn job_with_one_application(router: &Router) -> String {
    let (_, company) = send(
        router,
        request(
            "POST",
            "/companies",
            Some(RECRUITER_TOKEN),
            Some(json!({ "name": "Initech" })),
        ),
    )
    .await;
    let job_id = post_job(router, company["id"].as_str().expect("company id")).await;
    let (status, _) = send(
        router,
        request(
            "GET",
            &format!("/applications/apply/{job_id}"),
            Some(STUDENT_TOKEN),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    job_id
}

#[tokio::test]
async fn force_flag_is_read_from_the_request_body() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);
    let job_id = job_with_one_application(&router).await;
    let job_uri = format!("/jobs/{job_id}");

    let (status, _) = send(
        &router,
        request(
            "DELETE",
            &job_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "force": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, receipt) = send(
        &router,
        request(
            "DELETE",
            &job_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "force": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["mode"], json!("forced"));
    assert_eq!(receipt["removed_applications"], json!(1));
}

#[tokio::test]
async fn malformed_delete_parameters_are_validation_errors() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);
    let job_id = job_with_one_application(&router).await;
    let job_uri = format!("/jobs/{job_id}");

    let (status, body) = send(
        &router,
        request("DELETE", &format!("{job_uri}?force=yes"), Some(RECRUITER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation"));

    let (status, body) = send(
        &router,
        request(
            "DELETE",
            &job_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "force": "yes" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("validation"));

    let (status, _) = send(
        &router,
        request(
            "DELETE",
            &job_uri,
            Some(RECRUITER_TOKEN),
            Some(json!({ "cascade": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, request("GET", &job_uri, Some(STUDENT_TOKEN), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn identity_outage_is_internal_not_unauthenticated() {
    let (service, _, _) = build_service();
    let router = board_router(Arc::new(service), Arc::new(UnavailableIdentity));

    let (status, body) = send(&router, request("GET", "/jobs", Some(STUDENT_TOKEN), None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("internal"));
}
