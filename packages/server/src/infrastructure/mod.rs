//! Infrastructure layer: wire format and identity extraction.

pub mod dto;
pub mod identity;

pub use identity::CookieIdentityExtractor;
