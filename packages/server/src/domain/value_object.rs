//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a client display name in bytes
pub const CLIENT_NAME_MAX_LEN: usize = 100;

/// Client display name value object.
///
/// The name is supplied by the identity extractor and stamped on every
/// message the client sends. Two connections may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientName(String);

impl ClientName {
    /// Create a new ClientName.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or longer than
    /// [`CLIENT_NAME_MAX_LEN`] bytes.
    pub fn new(name: String) -> Result<Self, ValueObjectError> {
        if name.is_empty() {
            return Err(ValueObjectError::ClientNameEmpty);
        }
        let len = name.len();
        if len > CLIENT_NAME_MAX_LEN {
            return Err(ValueObjectError::ClientNameTooLong {
                max: CLIENT_NAME_MAX_LEN,
                actual: len,
            });
        }
        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ClientName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ClientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection identifier value object.
///
/// Identifies one admitted connection for the lifetime of its membership.
/// Membership is keyed by this id rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unix timestamp in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(secs: i64) -> Self {
        Self(secs)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(agora_shared::time::get_unix_timestamp())
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_name_valid() {
        // テスト項目: 有効な名前で ClientName を作成できる
        // when (操作):
        let result = ClientName::new("alice".to_string());

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_client_name_empty() {
        // テスト項目: 空の名前はエラーになる
        let result = ClientName::new(String::new());

        assert_eq!(result, Err(ValueObjectError::ClientNameEmpty));
    }

    #[test]
    fn test_client_name_too_long() {
        // テスト項目: 上限を超える長さの名前はエラーになる
        // given (前提条件):
        let long_name = "a".repeat(CLIENT_NAME_MAX_LEN + 1);

        // when (操作):
        let result = ClientName::new(long_name);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::ClientNameTooLong {
                max: CLIENT_NAME_MAX_LEN,
                actual: CLIENT_NAME_MAX_LEN + 1,
            })
        );
    }

    #[test]
    fn test_client_name_max_length_boundary() {
        // テスト項目: 上限ちょうどの長さは許可される
        let name = "a".repeat(CLIENT_NAME_MAX_LEN);

        assert!(ClientName::new(name).is_ok());
    }

    #[test]
    fn test_connection_id_uniqueness() {
        // テスト項目: ConnectionId::generate() は毎回異なる ID を生成する
        let id1 = ConnectionId::generate();
        let id2 = ConnectionId::generate();

        assert_ne!(id1, id2);
    }
}
