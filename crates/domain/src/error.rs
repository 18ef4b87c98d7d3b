use crate::models::EntityId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Comment content cannot be empty")]
    EmptyContent,

    /// Required input absent; carries the user-facing message.
    #[error("{0}")]
    Missing(&'static str),

    #[error("Invalid relation '{0}', expected '<collection uid>:<id>'")]
    InvalidRelation(String),

    #[error("Parent comment {0} is not part of this thread")]
    UnknownParent(EntityId),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters.")]
    PasswordTooShort(usize),
}
