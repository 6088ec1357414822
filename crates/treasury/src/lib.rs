//! Palisade Treasury
//!
//! Balance bookkeeping for a pooled betting platform: per-account
//! balances, bet escrow and settlement, and liquidity-provider shares
//! backed by a common pool. Every operation that would move value out of
//! a monitored pool is cleared with the solvency guard before anything
//! commits.

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use application::Treasury;
pub use error::{Result, TreasuryError};
pub use infrastructure::time::{ManualClock, SystemClock};
pub use model::{Bet, BetId, BetOutcome};
