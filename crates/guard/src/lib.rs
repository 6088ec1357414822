//! Palisade Solvency Guard
//!
//! Watches aggregate treasury balances over sliding windows and trips a
//! circuit breaker on abnormally steep drops. Unlike per-account limits
//! (balance checks, bet caps), this guards the pooled treasury itself:
//!
//! - **Window Tracking**: per-category circular history of interval
//!   starting balances, advanced as time passes
//! - **Threshold Evaluation**: integer-percentage floor under the current
//!   period's starting balance
//! - **Breach Policy**: disable the breached window, engage degraded mode,
//!   restrict the acting account when the drop is disproportionate
//! - **Degraded-Mode Throttling**: epoch-scoped global and per-user
//!   withdrawal caps while the high-risk pool is active
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Circuit Breaker                        │
//! │                                                             │
//! │  Proposed Balance ──► WindowTracker ──► Allowed Floor       │
//! │                                                             │
//! │  Breach? ──► disable window, engage HighRiskPool,           │
//! │              RestrictionRegistry on severe drops            │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                        CheckOutcome
//!                              │
//!                              ▼
//!                      Treasury (ledger)
//! ```
//!
//! The ledger computes the balance a pending operation would leave behind
//! and asks the breaker before committing anything. The guard never reads
//! a clock and never performs I/O: the same call sequence always produces
//! the same decisions.

pub mod breaker;
pub mod pool;
pub mod restriction;
pub mod window;

// Re-export main types
pub use breaker::{CircuitBreaker, GuardConfig};
pub use pool::{HighRiskPool, HighRiskPoolConfig};
pub use restriction::RestrictionRegistry;
pub use window::{WindowConfig, WindowTracker};
