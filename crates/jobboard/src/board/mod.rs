//! Job catalog, application ledger, and the lifecycle rules that keep them consistent.

pub mod authorization;
pub mod domain;
pub mod identity;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
mod validation;

#[cfg(test)]
mod tests;

pub use authorization::{authorize_owner, require_role, AuthorizationError};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, Caller, Company, CompanyId, CompanyInput,
    DeleteMode, DeletionReceipt, Job, JobDetail, JobId, JobInput, RequirementsInput, Role,
    StatusDecision, UserId,
};
pub use identity::{AuthenticationError, IdentityProvider, SessionRegistry};
pub use memory::{InMemoryBoardStore, InMemoryCompanyDirectory};
pub use repository::{BoardRepository, CompanyDirectory, ConflictError, RepositoryError};
pub use router::{board_router, board_router_with_cookie, DEFAULT_SESSION_COOKIE};
pub use service::{BoardError, ErrorKind, JobBoardService};
pub use validation::ValidationError;
