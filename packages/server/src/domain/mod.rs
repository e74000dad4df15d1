//! Domain layer for the broadcast hub.
//!
//! This module contains the values exchanged through the hub and the
//! capabilities it depends on, independent of transport and wire format.

pub mod entity;
pub mod error;
pub mod identity;
pub mod value_object;

pub use entity::Message;
pub use error::{IdentityError, ValueObjectError};
pub use identity::IdentityExtractor;
pub use value_object::{ClientName, ConnectionId, Timestamp};
