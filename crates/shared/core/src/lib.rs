//! Palisade Core Domain
//!
//! Pure domain types for the Palisade treasury guard.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod category;
pub mod values;

// Re-export commonly used types at crate root
pub use category::Category;
pub use values::{AccountId, Balance, Timestamp};
