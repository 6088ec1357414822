//! Palisade Ports
//!
//! Port definitions (traits) for the Palisade treasury guard.
//! These define the boundaries between domain logic and infrastructure.

mod clock;
mod error;
mod guard;

pub use clock::Clock;
pub use error::{GuardError, GuardResult};
pub use guard::{
    CheckOutcome, GuardEvent, GuardEventKind, PoolStats, SolvencyGuard, WindowSnapshot,
};
