use chrono::Duration;
use palisade_core::{AccountId, Balance, Category, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GuardResult;

/// Decision returned to the ledger for a proposed balance transition
///
/// The ledger computes the balance a pending operation would leave behind,
/// asks the guard for a decision, and only commits its own mutation when
/// `permitted` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// May the ledger commit the operation?
    pub permitted: bool,
    /// Was the acting account restricted as part of this decision?
    pub restricted: bool,
}

impl CheckOutcome {
    /// No breach; the operation may proceed
    pub fn clear() -> Self {
        Self {
            permitted: true,
            restricted: false,
        }
    }

    /// Breach; the operation must be aborted
    pub fn breach(restricted: bool) -> Self {
        Self {
            permitted: false,
            restricted,
        }
    }
}

/// Read-only view of one category's monitoring window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub category: Category,
    pub window_secs: i64,
    pub shift_secs: i64,
    pub interval_count: usize,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub period_start_balance: Balance,
    pub threshold_pct: u8,
    pub last_updated_index: u16,
    /// Starting balance of each interval, indexed by wrapped interval number
    pub interval_history: Vec<Balance>,
}

/// Read-only view of the high-risk withdrawal pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub active: bool,
    pub pool_size: Balance,
    pub per_user_limit: Balance,
    pub total_withdrawn: Balance,
    pub epoch: u64,
}

/// Audit record emitted by the guard
///
/// Breaches and restrictions are not fatal, but they must be recorded for
/// later review; the host persists these through `recent_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardEvent {
    pub id: Uuid,
    /// Caller-supplied time of the triggering call
    pub timestamp: Timestamp,
    pub kind: GuardEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardEventKind {
    /// A proposed balance fell to or below the allowed floor
    BreachDetected {
        category: Category,
        account: AccountId,
        proposed: Balance,
        allowed_floor: Balance,
    },
    /// The breached window was cleared; monitoring stays off until an
    /// operator re-enables it
    WindowDisabled { category: Category },
    /// The acting account was barred from self-service operations
    AccountRestricted { account: AccountId },
    /// Degraded mode engaged; withdrawals are capped by the high-risk pool
    HighRiskModeActivated { epoch: u64 },
    /// A withdrawal was authorized against the high-risk pool
    HighRiskWithdrawal {
        account: AccountId,
        amount: Balance,
        epoch: u64,
    },
}

/// Port for the solvency guard consulted by the ledger
///
/// Every state-transition method takes the caller's timestamp where time
/// matters; the guard itself never reads a clock, which keeps the whole
/// subsystem deterministic and replayable.
pub trait SolvencyGuard: Send {
    /// Start monitoring a category
    ///
    /// `window_size` must be a whole multiple of `shift_size`, the shift
    /// must be positive and strictly smaller than the window, and the
    /// threshold percentage cannot exceed 100.
    fn enable_window(
        &mut self,
        category: Category,
        window_size: Duration,
        shift_size: Duration,
        starting_balance: Balance,
        threshold_pct: u8,
        now: Timestamp,
    ) -> GuardResult<()>;

    /// Stop monitoring a category and discard its window state
    fn disable_window(&mut self, category: Category) -> GuardResult<()>;

    /// Evaluate a proposed balance against the category's window
    ///
    /// Advances the window to `now` first, then classifies the proposed
    /// balance. On breach the window is disabled, degraded mode engages,
    /// and the acting account may be restricted.
    fn check_and_enforce(
        &mut self,
        category: Category,
        account: &AccountId,
        proposed_balance: Balance,
        now: Timestamp,
    ) -> CheckOutcome;

    /// Authorize a withdrawal against the high-risk pool
    ///
    /// Only meaningful while degraded mode is active; fails otherwise.
    fn withdraw_high_risk(
        &mut self,
        account: &AccountId,
        amount: Balance,
        now: Timestamp,
    ) -> GuardResult<()>;

    /// Manually engage degraded mode (opens a new epoch)
    fn enable_high_risk_mode(&mut self) -> GuardResult<()>;

    /// Clear degraded mode; accumulated totals are kept
    fn disable_high_risk_mode(&mut self) -> GuardResult<()>;

    /// Reconfigure the high-risk pool; only permitted while inactive
    fn configure_high_risk_pool(
        &mut self,
        pool_size: Balance,
        per_user_limit: Balance,
    ) -> GuardResult<()>;

    /// Set how far below the floor a breach must land to restrict the
    /// acting account
    fn set_restriction_severity(&mut self, pct: u8) -> GuardResult<()>;

    /// Bar an account from self-service operations
    fn restrict(&mut self, account: AccountId);

    /// Lift an account's restriction
    fn unrestrict(&mut self, account: &AccountId);

    /// Is this account barred from self-service operations?
    fn is_restricted(&self, account: &AccountId) -> bool;

    /// Current window state for a category, if monitoring is active
    fn window_snapshot(&self, category: Category) -> Option<WindowSnapshot>;

    /// Current high-risk pool state
    fn pool_stats(&self) -> PoolStats;

    /// All currently restricted accounts
    fn restricted_accounts(&self) -> Vec<AccountId>;

    /// Audit trail accumulated since the last drain
    fn recent_events(&self) -> &[GuardEvent];

    /// Take ownership of the audit trail, clearing it
    fn drain_events(&mut self) -> Vec<GuardEvent>;
}
