use palisade_core::Balance;
use palisade_ports::GuardError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreasuryError {
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown bet: {0}")]
    UnknownBet(String),

    #[error("Account is restricted: {0}")]
    AccountRestricted(String),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        requested: Balance,
        available: Balance,
    },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error(
        "Solvency breach: the proposed balance falls below the monitored floor \
         (acting account restricted: {restricted})"
    )]
    BreachDetected { restricted: bool },

    #[error("Guard error: {0}")]
    Guard(#[from] GuardError),
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
