use super::domain::{Caller, Role, UserId};

/// Identity resolved, permission missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("only the owning recruiter may perform this action")]
    NotOwner,
    #[error("this action requires the {required} role (caller is a {actual})")]
    WrongRole { required: Role, actual: Role },
}

/// The single ownership check shared by every job and application operation.
pub fn authorize_owner(caller: &UserId, owner: &UserId) -> Result<(), AuthorizationError> {
    if caller == owner {
        Ok(())
    } else {
        Err(AuthorizationError::NotOwner)
    }
}

pub fn require_role(caller: &Caller, required: Role) -> Result<(), AuthorizationError> {
    if caller.role == required {
        Ok(())
    } else {
        Err(AuthorizationError::WrongRole {
            required,
            actual: caller.role,
        })
    }
}
