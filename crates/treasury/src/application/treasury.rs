//! Treasury application service
//!
//! Holds the books for the pooled betting platform: per-account balances,
//! the casino treasury total, the liquidity pool backing share tokens,
//! and open bet escrow. The solvency guard is an owned component; every
//! operation that would move value out of a monitored pool computes the
//! balance it would leave behind and clears it with the guard first.
//! Nothing commits on a denied check.

use log::{info, warn};
use palisade_core::{AccountId, Balance, Category};
use palisade_guard::{CircuitBreaker, GuardConfig};
use palisade_ports::{Clock, GuardEvent, PoolStats, SolvencyGuard, WindowSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::{Result, TreasuryError};
use crate::model::{Bet, BetId, BetOutcome};

struct TreasuryState {
    /// Per-account self-service balances
    accounts: HashMap<AccountId, Balance>,
    /// Total tokens held by the platform
    casino_balance: Balance,
    /// Capital backing liquidity-provider shares
    liquidity_balance: Balance,
    /// Outstanding liquidity shares
    share_supply: Balance,
    /// Per-account share holdings
    shares: HashMap<AccountId, Balance>,
    /// Bets awaiting settlement
    open_bets: HashMap<BetId, Bet>,
    /// Solvency guard
    guard: CircuitBreaker,
}

/// Main treasury service coordinating bookkeeping and the guard
///
/// Every operation runs under one lock spanning balances, windows, the
/// high-risk pool and restrictions: state transitions never interleave.
pub struct Treasury {
    state: Mutex<TreasuryState>,
    clock: Arc<dyn Clock>,
}

impl Treasury {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, GuardConfig::default())
    }

    pub fn with_config(clock: Arc<dyn Clock>, config: GuardConfig) -> Self {
        Self {
            state: Mutex::new(TreasuryState {
                accounts: HashMap::new(),
                casino_balance: 0,
                liquidity_balance: 0,
                share_supply: 0,
                shares: HashMap::new(),
                open_bets: HashMap::new(),
                guard: CircuitBreaker::new(config),
            }),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TreasuryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn category_balance(state: &TreasuryState, category: Category) -> Balance {
        match category {
            Category::LiquidityPool => state.liquidity_balance,
            Category::Casino => state.casino_balance,
        }
    }

    fn ensure_unrestricted(state: &TreasuryState, account: &AccountId) -> Result<()> {
        if state.guard.is_restricted(account) {
            return Err(TreasuryError::AccountRestricted(account.to_string()));
        }
        Ok(())
    }

    fn account_funds(state: &TreasuryState, account: &AccountId) -> Result<Balance> {
        state
            .accounts
            .get(account)
            .copied()
            .ok_or_else(|| TreasuryError::UnknownAccount(account.to_string()))
    }

    fn debit_account(
        state: &mut TreasuryState,
        account: &AccountId,
        amount: Balance,
    ) -> Result<()> {
        let available = Self::account_funds(state, account)?;
        if available < amount {
            return Err(TreasuryError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        state.accounts.insert(account.clone(), available - amount);
        Ok(())
    }

    // === Self-service operations ===

    /// Credit an account; opens the account on first deposit
    pub fn deposit(&self, account: &AccountId, amount: Balance) -> Result<Balance> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }

        let mut state = self.lock();
        Self::ensure_unrestricted(&state, account)?;

        let balance = state.accounts.entry(account.clone()).or_insert(0);
        *balance += amount;
        let balance = *balance;
        state.casino_balance += amount;

        info!("[TREASURY] deposit: account={account}, amount={amount}, balance={balance}");
        Ok(balance)
    }

    /// Move tokens out of the treasury
    ///
    /// The guard sees the casino balance this withdrawal would leave
    /// behind; a breach aborts the withdrawal with nothing committed.
    /// While degraded mode is active the amount must also clear the
    /// high-risk pool.
    pub fn withdraw(&self, account: &AccountId, amount: Balance) -> Result<Balance> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }

        let mut state = self.lock();
        Self::ensure_unrestricted(&state, account)?;

        let available = Self::account_funds(&state, account)?;
        if available < amount {
            return Err(TreasuryError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let now = self.clock.now();
        let proposed = state.casino_balance - amount;
        let outcome = state
            .guard
            .check_and_enforce(Category::Casino, account, proposed, now);
        if !outcome.permitted {
            warn!("[TREASURY] withdrawal aborted on breach: account={account}, amount={amount}");
            return Err(TreasuryError::BreachDetected {
                restricted: outcome.restricted,
            });
        }

        if state.guard.pool_stats().active {
            state.guard.withdraw_high_risk(account, amount, now)?;
        }

        state.accounts.insert(account.clone(), available - amount);
        state.casino_balance -= amount;

        info!(
            "[TREASURY] withdrawal: account={account}, amount={amount}, balance={}",
            available - amount
        );
        Ok(available - amount)
    }

    /// Escrow a stake for the game layer to settle later
    pub fn place_bet(&self, account: &AccountId, stake: Balance) -> Result<BetId> {
        if stake == 0 {
            return Err(TreasuryError::InvalidAmount);
        }

        let mut state = self.lock();
        Self::ensure_unrestricted(&state, account)?;
        Self::debit_account(&mut state, account, stake)?;

        let bet = Bet {
            id: Uuid::new_v4(),
            account: account.clone(),
            stake,
            placed_at: self.clock.now(),
        };
        let id = bet.id;
        state.open_bets.insert(id, bet);

        info!("[TREASURY] bet placed: account={account}, stake={stake}, bet={id}");
        Ok(id)
    }

    /// Mint liquidity shares against a deposit into the pool
    pub fn add_liquidity(&self, account: &AccountId, amount: Balance) -> Result<Balance> {
        if amount == 0 {
            return Err(TreasuryError::InvalidAmount);
        }

        let mut state = self.lock();
        Self::ensure_unrestricted(&state, account)?;
        Self::debit_account(&mut state, account, amount)?;

        let minted = if state.share_supply == 0 || state.liquidity_balance == 0 {
            amount
        } else {
            amount * state.share_supply / state.liquidity_balance
        };

        state.liquidity_balance += amount;
        state.share_supply += minted;
        *state.shares.entry(account.clone()).or_insert(0) += minted;

        info!("[TREASURY] liquidity added: account={account}, amount={amount}, shares={minted}");
        Ok(minted)
    }

    /// Burn liquidity shares for the pool tokens they represent
    ///
    /// The redemption is cleared with the liquidity-pool window before any
    /// share is burned.
    pub fn remove_liquidity(&self, account: &AccountId, shares: Balance) -> Result<Balance> {
        if shares == 0 {
            return Err(TreasuryError::InvalidAmount);
        }

        let mut state = self.lock();
        Self::ensure_unrestricted(&state, account)?;

        let held = state.shares.get(account).copied().unwrap_or(0);
        if held < shares {
            return Err(TreasuryError::InsufficientBalance {
                requested: shares,
                available: held,
            });
        }

        let amount = shares * state.liquidity_balance / state.share_supply;

        let now = self.clock.now();
        let proposed = state.liquidity_balance - amount;
        let outcome =
            state
                .guard
                .check_and_enforce(Category::LiquidityPool, account, proposed, now);
        if !outcome.permitted {
            warn!(
                "[TREASURY] liquidity removal aborted on breach: account={account}, shares={shares}"
            );
            return Err(TreasuryError::BreachDetected {
                restricted: outcome.restricted,
            });
        }

        state.shares.insert(account.clone(), held - shares);
        state.share_supply -= shares;
        state.liquidity_balance -= amount;
        *state.accounts.entry(account.clone()).or_insert(0) += amount;

        info!("[TREASURY] liquidity removed: account={account}, shares={shares}, amount={amount}");
        Ok(amount)
    }

    // === Platform operations ===

    /// Settle an open bet with the outcome the game layer produced
    ///
    /// Wins are paid from the liquidity pool and must clear its window;
    /// a breach leaves the bet open for the operator to escalate.
    pub fn settle_bet(&self, bet_id: BetId, outcome: BetOutcome) -> Result<()> {
        let mut state = self.lock();

        let bet = state
            .open_bets
            .get(&bet_id)
            .cloned()
            .ok_or_else(|| TreasuryError::UnknownBet(bet_id.to_string()))?;

        match outcome {
            BetOutcome::Lost => {
                state.liquidity_balance += bet.stake;
                state.open_bets.remove(&bet_id);
                info!(
                    "[TREASURY] bet lost: account={}, stake={}, bet={bet_id}",
                    bet.account, bet.stake
                );
            }
            BetOutcome::Won { payout } => {
                let pool_after_stake = state.liquidity_balance + bet.stake;
                if payout > pool_after_stake {
                    return Err(TreasuryError::InsufficientBalance {
                        requested: payout,
                        available: pool_after_stake,
                    });
                }

                let now = self.clock.now();
                let proposed = pool_after_stake - payout;
                let check = state.guard.check_and_enforce(
                    Category::LiquidityPool,
                    &bet.account,
                    proposed,
                    now,
                );
                if !check.permitted {
                    warn!(
                        "[TREASURY] payout aborted on breach: account={}, payout={payout}, bet={bet_id}",
                        bet.account
                    );
                    return Err(TreasuryError::BreachDetected {
                        restricted: check.restricted,
                    });
                }

                state.liquidity_balance = proposed;
                *state.accounts.entry(bet.account.clone()).or_insert(0) += payout;
                state.open_bets.remove(&bet_id);
                info!(
                    "[TREASURY] bet won: account={}, stake={}, payout={payout}, bet={bet_id}",
                    bet.account, bet.stake
                );
            }
        }

        Ok(())
    }

    // === Operator controls (delegated to the guard) ===

    /// Start monitoring a category, seeded with its current balance
    pub fn enable_window(
        &self,
        category: Category,
        window_size: chrono::Duration,
        shift_size: chrono::Duration,
        threshold_pct: u8,
    ) -> Result<()> {
        let mut state = self.lock();
        let starting_balance = Self::category_balance(&state, category);
        let now = self.clock.now();
        state.guard.enable_window(
            category,
            window_size,
            shift_size,
            starting_balance,
            threshold_pct,
            now,
        )?;
        Ok(())
    }

    pub fn disable_window(&self, category: Category) -> Result<()> {
        Ok(self.lock().guard.disable_window(category)?)
    }

    pub fn enable_high_risk_mode(&self) -> Result<()> {
        Ok(self.lock().guard.enable_high_risk_mode()?)
    }

    pub fn disable_high_risk_mode(&self) -> Result<()> {
        Ok(self.lock().guard.disable_high_risk_mode()?)
    }

    pub fn configure_high_risk_pool(
        &self,
        pool_size: Balance,
        per_user_limit: Balance,
    ) -> Result<()> {
        Ok(self
            .lock()
            .guard
            .configure_high_risk_pool(pool_size, per_user_limit)?)
    }

    pub fn set_restriction_severity(&self, pct: u8) -> Result<()> {
        Ok(self.lock().guard.set_restriction_severity(pct)?)
    }

    pub fn restrict(&self, account: AccountId) {
        self.lock().guard.restrict(account);
    }

    pub fn unrestrict(&self, account: &AccountId) {
        self.lock().guard.unrestrict(account);
    }

    // === Introspection ===

    pub fn is_restricted(&self, account: &AccountId) -> bool {
        self.lock().guard.is_restricted(account)
    }

    pub fn window_snapshot(&self, category: Category) -> Option<WindowSnapshot> {
        self.lock().guard.window_snapshot(category)
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.lock().guard.pool_stats()
    }

    /// Audit trail accumulated by the guard; cleared on read
    pub fn drain_guard_events(&self) -> Vec<GuardEvent> {
        self.lock().guard.drain_events()
    }

    pub fn account_balance(&self, account: &AccountId) -> Result<Balance> {
        Self::account_funds(&self.lock(), account)
    }

    pub fn share_balance(&self, account: &AccountId) -> Balance {
        self.lock().shares.get(account).copied().unwrap_or(0)
    }

    pub fn casino_balance(&self) -> Balance {
        self.lock().casino_balance
    }

    pub fn liquidity_balance(&self) -> Balance {
        self.lock().liquidity_balance
    }

    pub fn share_supply(&self) -> Balance {
        self.lock().share_supply
    }

    pub fn open_bet(&self, bet_id: BetId) -> Option<Bet> {
        self.lock().open_bets.get(&bet_id).cloned()
    }

    /// Timestamp source used to stamp guard calls
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
