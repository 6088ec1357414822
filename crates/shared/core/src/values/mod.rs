use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Balance value - raw token units held by the treasury
/// All percentage math on balances multiplies first and truncates on division
pub type Balance = u128;

/// Timestamp in UTC
///
/// Guard operations never read a wall clock; every decision is a function
/// of in-memory state plus a caller-supplied timestamp.
pub type Timestamp = DateTime<Utc>;

/// Unique identifier for a platform account
///
/// This provides a stable reference to an account that can be stored
/// in restriction sets and used as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create a new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
