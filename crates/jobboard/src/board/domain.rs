use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for registered companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Identity of an authenticated user, as handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

macro_rules! display_id {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

display_id!(JobId, ApplicationId, CompanyId, UserId);

/// Role attached to every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Recruiter,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Recruiter => "recruiter",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" | "applicant" => Some(Role::Student),
            "recruiter" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Authenticated caller resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            role,
        }
    }

    pub fn recruiter(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Recruiter)
    }

    pub fn student(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Student)
    }
}

/// Company display metadata referenced by job postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Request body for registering a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyInput {
    #[serde(alias = "companyName")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A persisted job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: BTreeSet<String>,
    pub salary: f64,
    pub experience_years: u32,
    pub location: String,
    pub job_type: String,
    pub positions: u32,
    pub company_id: CompanyId,
    pub recruiter_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.recruiter_id == user
    }
}

/// Requirements arrive either as a JSON list or as the comma separated string the
/// web client posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementsInput {
    List(Vec<String>),
    Delimited(String),
}

impl RequirementsInput {
    pub fn entries(&self) -> BTreeSet<String> {
        let raw: Vec<&str> = match self {
            RequirementsInput::List(items) => items.iter().map(String::as_str).collect(),
            RequirementsInput::Delimited(text) => text.split(',').collect(),
        };

        raw.into_iter()
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Request body for posting a job. Field aliases accept the web client's camelCase names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobInput {
    pub title: String,
    pub description: String,
    pub requirements: RequirementsInput,
    pub salary: f64,
    #[serde(alias = "experience", alias = "experienceLevel")]
    pub experience_years: u32,
    pub location: String,
    #[serde(alias = "jobType")]
    pub job_type: String,
    #[serde(alias = "position")]
    pub positions: u32,
    #[serde(alias = "companyId")]
    pub company_id: CompanyId,
}

/// Lifecycle state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// Only `pending` has outgoing edges; both decisions are terminal.
    pub fn decide(self, decision: StatusDecision) -> Option<Self> {
        match self {
            ApplicationStatus::Pending => Some(decision.into()),
            ApplicationStatus::Accepted | ApplicationStatus::Rejected => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target of a recruiter decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusDecision {
    #[serde(alias = "Accepted")]
    Accepted,
    #[serde(alias = "Rejected")]
    Rejected,
}

impl From<StatusDecision> for ApplicationStatus {
    fn from(value: StatusDecision) -> Self {
        match value {
            StatusDecision::Accepted => ApplicationStatus::Accepted,
            StatusDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

/// "Applicant X applied to job Y".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: UserId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// How a job deletion treats applications that still reference the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Refuse while any application references the job.
    Guarded,
    /// Remove the job together with every application referencing it.
    Forced,
}

impl DeleteMode {
    pub fn from_force_flag(force: bool) -> Self {
        if force {
            DeleteMode::Forced
        } else {
            DeleteMode::Guarded
        }
    }
}

/// Outcome of a successful job deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReceipt {
    pub job_id: JobId,
    pub mode: DeleteMode,
    pub removed_applications: usize,
}

/// Job detail as shown to a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub applicant_count: usize,
    pub has_applied: bool,
}
