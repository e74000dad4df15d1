//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ClientName validation error
    #[error("ClientName cannot be empty")]
    ClientNameEmpty,

    /// ClientName too long error
    #[error("ClientName cannot exceed {max} characters (got {actual})")]
    ClientNameTooLong { max: usize, actual: usize },
}

/// Errors raised while resolving who is behind an incoming connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity cookie was not sent with the request
    #[error("identity cookie '{0}' is missing")]
    MissingCookie(String),

    /// The cookie was present but its value is not a usable name
    #[error("invalid client name: {0}")]
    InvalidName(#[from] ValueObjectError),
}
