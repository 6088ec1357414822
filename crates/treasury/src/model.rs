use palisade_core::{AccountId, Balance, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for an open bet
pub type BetId = Uuid;

/// A bet whose stake is escrowed until the game layer settles it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: BetId,
    pub account: AccountId,
    pub stake: Balance,
    pub placed_at: Timestamp,
}

/// Settlement outcome supplied by the game layer
///
/// Odds and payout computation happen upstream; the treasury only moves
/// the money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetOutcome {
    /// Gross amount credited to the bettor, paid from the liquidity pool
    Won { payout: Balance },
    /// The stake stays with the liquidity pool
    Lost,
}
