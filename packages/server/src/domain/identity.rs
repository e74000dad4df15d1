//! Identity extraction capability.

use axum::http::HeaderMap;

use super::{error::IdentityError, value_object::ClientName};

/// Resolves the display name of the client behind an incoming request.
///
/// Injected into the server state so connection handling does not depend on
/// any particular credential mechanism.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityExtractor: Send + Sync {
    /// Extract the client name from the request headers.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable identity is present. This rejects the
    /// single connection attempt only.
    fn extract(&self, headers: &HeaderMap) -> Result<ClientName, IdentityError>;
}
