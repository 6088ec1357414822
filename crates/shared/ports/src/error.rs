use palisade_core::Balance;
use thiserror::Error;

/// Domain-level errors for guard operations
///
/// A breach is not an error: it is a legitimate outcome carried by
/// `CheckOutcome`, and the caller acts on it by aborting its own operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0} is already active")]
    AlreadyActive(String),

    #[error("{0} is not active")]
    NotActive(String),

    #[error("High-risk pool exhausted: requested {requested}, remaining {remaining}")]
    PoolExhausted { requested: Balance, remaining: Balance },

    #[error("High-risk user allowance exceeded: requested {requested}, remaining {remaining}")]
    UserLimitExceeded { requested: Balance, remaining: Balance },
}

pub type GuardResult<T> = std::result::Result<T, GuardError>;
