//! Circuit breaker
//!
//! Orchestrates the guard: feeds proposed balances into the window
//! tracker, evaluates the threshold floor, and on breach disables the
//! breached window, engages degraded mode and - when the drop is
//! disproportionately deep - restricts the acting account.

use chrono::Duration;
use log::error;
use palisade_core::{AccountId, Balance, Category, Timestamp};
use palisade_ports::{
    CheckOutcome, GuardError, GuardEvent, GuardEventKind, GuardResult, PoolStats, SolvencyGuard,
    WindowSnapshot,
};
use uuid::Uuid;

use crate::pool::{HighRiskPool, HighRiskPoolConfig};
use crate::restriction::RestrictionRegistry;
use crate::window::WindowTracker;

/// Configuration for the circuit breaker
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// A breach restricts the acting account when
    /// `proposed * 100 / floor < 100 - restriction_severity_pct`
    pub restriction_severity_pct: u8,
    /// High-risk pool defaults and minimums
    pub pool: HighRiskPoolConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            restriction_severity_pct: 5,
            pool: HighRiskPoolConfig::default(),
        }
    }
}

/// The solvency guard: window tracker, high-risk pool and restriction
/// registry behind one decision surface
pub struct CircuitBreaker {
    tracker: WindowTracker,
    pool: HighRiskPool,
    restrictions: RestrictionRegistry,
    restriction_severity_pct: u8,
    events: Vec<GuardEvent>,
}

impl CircuitBreaker {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            tracker: WindowTracker::new(),
            pool: HighRiskPool::new(config.pool),
            restrictions: RestrictionRegistry::new(),
            restriction_severity_pct: config.restriction_severity_pct,
            events: Vec::new(),
        }
    }

    /// Lowest balance the window tolerates, integer-truncated
    fn allowed_floor(start_balance: Balance, threshold_pct: u8) -> Balance {
        start_balance * (100 - Balance::from(threshold_pct)) / 100
    }

    /// Is a breach this deep likely malicious rather than a large but
    /// legitimate withdrawal?
    fn is_disproportionate(&self, proposed: Balance, floor: Balance) -> bool {
        floor == 0
            || proposed * 100 / floor < Balance::from(100 - self.restriction_severity_pct)
    }

    fn record(&mut self, timestamp: Timestamp, kind: GuardEventKind) {
        self.events.push(GuardEvent {
            id: Uuid::new_v4(),
            timestamp,
            kind,
        });
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl SolvencyGuard for CircuitBreaker {
    fn enable_window(
        &mut self,
        category: Category,
        window_size: Duration,
        shift_size: Duration,
        starting_balance: Balance,
        threshold_pct: u8,
        now: Timestamp,
    ) -> GuardResult<()> {
        self.tracker.enable(
            category,
            window_size,
            shift_size,
            starting_balance,
            threshold_pct,
            now,
        )
    }

    fn disable_window(&mut self, category: Category) -> GuardResult<()> {
        self.tracker.disable(category)
    }

    fn check_and_enforce(
        &mut self,
        category: Category,
        account: &AccountId,
        proposed_balance: Balance,
        now: Timestamp,
    ) -> CheckOutcome {
        self.tracker.update(category, proposed_balance, now);

        // a category without an active window is simply not monitored
        let (start_balance, threshold_pct) = match self.tracker.config(category) {
            Some(window) => (window.period_start_balance(), window.threshold_pct()),
            None => return CheckOutcome::clear(),
        };

        let floor = Self::allowed_floor(start_balance, threshold_pct);
        if proposed_balance > floor {
            return CheckOutcome::clear();
        }

        // Breach. The window baseline can no longer be trusted; monitoring
        // stays off until an operator re-enables it deliberately.
        let restricted = self.is_disproportionate(proposed_balance, floor);

        error!(
            "[GUARD] breach: category={category}, account={account}, \
             proposed={proposed_balance}, floor={floor}, restricted={restricted}"
        );

        self.record(
            now,
            GuardEventKind::BreachDetected {
                category,
                account: account.clone(),
                proposed: proposed_balance,
                allowed_floor: floor,
            },
        );

        // no re-entry when degraded mode is already active
        if self.pool.enable().is_ok() {
            self.record(
                now,
                GuardEventKind::HighRiskModeActivated {
                    epoch: self.pool.epoch(),
                },
            );
        }

        if restricted {
            self.restrictions.restrict(account.clone());
            self.record(
                now,
                GuardEventKind::AccountRestricted {
                    account: account.clone(),
                },
            );
        }

        if self.tracker.disable(category).is_ok() {
            self.record(now, GuardEventKind::WindowDisabled { category });
        }

        CheckOutcome::breach(restricted)
    }

    fn withdraw_high_risk(
        &mut self,
        account: &AccountId,
        amount: Balance,
        now: Timestamp,
    ) -> GuardResult<()> {
        self.pool.withdraw(account, amount)?;
        self.record(
            now,
            GuardEventKind::HighRiskWithdrawal {
                account: account.clone(),
                amount,
                epoch: self.pool.epoch(),
            },
        );
        Ok(())
    }

    fn enable_high_risk_mode(&mut self) -> GuardResult<()> {
        self.pool.enable()
    }

    fn disable_high_risk_mode(&mut self) -> GuardResult<()> {
        self.pool.disable()
    }

    fn configure_high_risk_pool(
        &mut self,
        pool_size: Balance,
        per_user_limit: Balance,
    ) -> GuardResult<()> {
        self.pool.configure(pool_size, per_user_limit)
    }

    fn set_restriction_severity(&mut self, pct: u8) -> GuardResult<()> {
        if pct > 100 {
            return Err(GuardError::InvalidConfiguration(
                "severity percentage cannot exceed 100".to_string(),
            ));
        }
        self.restriction_severity_pct = pct;
        Ok(())
    }

    fn restrict(&mut self, account: AccountId) {
        self.restrictions.restrict(account);
    }

    fn unrestrict(&mut self, account: &AccountId) {
        self.restrictions.unrestrict(account);
    }

    fn is_restricted(&self, account: &AccountId) -> bool {
        self.restrictions.is_restricted(account)
    }

    fn window_snapshot(&self, category: Category) -> Option<WindowSnapshot> {
        self.tracker.snapshot(category)
    }

    fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    fn restricted_accounts(&self) -> Vec<AccountId> {
        self.restrictions.accounts()
    }

    fn recent_events(&self) -> &[GuardEvent] {
        &self.events
    }

    fn drain_events(&mut self) -> Vec<GuardEvent> {
        std::mem::take(&mut self.events)
    }
}
