//! Sliding-window balance tracker
//!
//! One window per monitored category. A window spans `window_size` of time
//! divided into `interval_count` shifts; as time passes it advances by
//! whole shifts, keeping the starting balance of each interval in a
//! circular history. When a window has gone unobserved for a full window's
//! worth of shifts it is rebuilt from the oldest recorded balance rather
//! than from whatever the caller proposes at resync time.

use chrono::Duration;
use log::{info, warn};
use palisade_core::{Balance, Category, Timestamp};
use palisade_ports::{GuardError, GuardResult, WindowSnapshot};
use std::collections::HashMap;

/// Monitoring state for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    window_size: Duration,
    shift_size: Duration,
    interval_count: usize,
    initial_start: Timestamp,
    initial_end: Timestamp,
    period_start: Timestamp,
    period_end: Timestamp,
    period_start_balance: Balance,
    threshold_pct: u8,
    /// Raw interval counter at the last recorded snapshot. The counter
    /// itself is unbounded; this stored copy is not. See `record_snapshot`.
    last_updated_index: u16,
    /// Starting balance of each interval, indexed by wrapped interval number
    interval_history: Vec<Balance>,
}

impl WindowConfig {
    fn new(
        window_size: Duration,
        shift_size: Duration,
        starting_balance: Balance,
        threshold_pct: u8,
        now: Timestamp,
    ) -> GuardResult<Self> {
        if shift_size <= Duration::zero() {
            return Err(GuardError::InvalidConfiguration(
                "shift size must be positive".to_string(),
            ));
        }
        if window_size <= shift_size {
            return Err(GuardError::InvalidConfiguration(
                "window size must exceed shift size".to_string(),
            ));
        }
        if window_size.num_seconds() % shift_size.num_seconds() != 0 {
            return Err(GuardError::InvalidConfiguration(
                "window size must be a whole multiple of shift size".to_string(),
            ));
        }
        if threshold_pct > 100 {
            return Err(GuardError::InvalidConfiguration(
                "threshold percentage cannot exceed 100".to_string(),
            ));
        }

        Ok(Self::seeded(
            window_size,
            shift_size,
            starting_balance,
            threshold_pct,
            now,
        ))
    }

    /// Build a window from parameters already known to be valid
    fn seeded(
        window_size: Duration,
        shift_size: Duration,
        starting_balance: Balance,
        threshold_pct: u8,
        now: Timestamp,
    ) -> Self {
        let interval_count = (window_size.num_seconds() / shift_size.num_seconds()) as usize;

        Self {
            window_size,
            shift_size,
            interval_count,
            initial_start: now,
            initial_end: now + window_size,
            period_start: now,
            period_end: now + window_size,
            period_start_balance: starting_balance,
            threshold_pct,
            last_updated_index: 0,
            interval_history: vec![starting_balance; interval_count],
        }
    }

    /// Advance the period forward by whole shifts
    ///
    /// The history slot at the new oldest index supplies the new period
    /// starting balance; every skipped slot is then backfilled with the
    /// caller's proposed balance. No true reading exists for intervals
    /// nobody observed, so the proposed value stands in for all of them.
    fn advance(&mut self, shifts: usize, proposed_balance: Balance) {
        self.period_start += self.shift_size * shifts as i32;
        self.period_end += self.shift_size * shifts as i32;

        let oldest = (self.last_updated_index as usize + shifts) % self.interval_count;
        self.period_start_balance = self.interval_history[oldest];

        for i in 1..=shifts {
            let slot = (self.last_updated_index as usize + i) % self.interval_count;
            self.interval_history[slot] = proposed_balance;
        }
    }

    /// Record the proposed balance as the current interval's snapshot
    ///
    /// The raw interval counter since the window's original start is
    /// unbounded, but the stored copy is `u16`: the comparison widens the
    /// stored value while the store truncates. Past 65 535 intervals the
    /// two sides disagree permanently and the per-interval write
    /// suppression stops holding.
    fn record_snapshot(&mut self, proposed_balance: Balance, now: Timestamp) {
        let shift_secs = self.shift_size.num_seconds();
        let raw_index = ((now - self.initial_start).num_seconds() / shift_secs).max(0) as u64;
        let normalized = raw_index as usize % self.interval_count;

        if raw_index != u64::from(self.last_updated_index) {
            self.interval_history[normalized] = proposed_balance;
            self.last_updated_index = raw_index as u16;
        }
    }

    /// Starting balance of the current period
    pub fn period_start_balance(&self) -> Balance {
        self.period_start_balance
    }

    /// Maximum proportional drop before a breach, in whole percent
    pub fn threshold_pct(&self) -> u8 {
        self.threshold_pct
    }

    /// Number of shifts making up the window
    pub fn interval_count(&self) -> usize {
        self.interval_count
    }

    /// Recorded interval starting balances, in slot order
    pub fn interval_history(&self) -> &[Balance] {
        &self.interval_history
    }

    fn snapshot(&self, category: Category) -> WindowSnapshot {
        WindowSnapshot {
            category,
            window_secs: self.window_size.num_seconds(),
            shift_secs: self.shift_size.num_seconds(),
            interval_count: self.interval_count,
            period_start: self.period_start,
            period_end: self.period_end,
            period_start_balance: self.period_start_balance,
            threshold_pct: self.threshold_pct,
            last_updated_index: self.last_updated_index,
            interval_history: self.interval_history.clone(),
        }
    }
}

/// Keyed table of monitoring windows, one per category
#[derive(Debug, Default)]
pub struct WindowTracker {
    windows: HashMap<Category, WindowConfig>,
}

impl WindowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start monitoring a category
    pub fn enable(
        &mut self,
        category: Category,
        window_size: Duration,
        shift_size: Duration,
        starting_balance: Balance,
        threshold_pct: u8,
        now: Timestamp,
    ) -> GuardResult<()> {
        if self.windows.contains_key(&category) {
            return Err(GuardError::AlreadyActive(format!("{category} window")));
        }

        let config = WindowConfig::new(window_size, shift_size, starting_balance, threshold_pct, now)?;
        info!(
            "[GUARD] window enabled: category={}, window={}s, shift={}s, starting_balance={}, threshold={}%",
            category,
            window_size.num_seconds(),
            shift_size.num_seconds(),
            starting_balance,
            threshold_pct
        );
        self.windows.insert(category, config);
        Ok(())
    }

    /// Stop monitoring a category and discard its window state
    pub fn disable(&mut self, category: Category) -> GuardResult<()> {
        if self.windows.remove(&category).is_none() {
            return Err(GuardError::NotActive(format!("{category} window")));
        }
        info!("[GUARD] window disabled: category={category}");
        Ok(())
    }

    /// Advance the category's window to `now` and record the proposed
    /// balance for the current interval
    ///
    /// Always invoked immediately before a threshold evaluation. A no-op
    /// when the category is not being monitored.
    pub fn update(&mut self, category: Category, proposed_balance: Balance, now: Timestamp) {
        let Some(config) = self.windows.get_mut(&category) else {
            return;
        };

        if now >= config.initial_end + config.shift_size {
            let shift_secs = config.shift_size.num_seconds();
            let shifts_needed = (now - config.period_end).num_seconds() / shift_secs;

            if shifts_needed >= config.interval_count as i64 {
                // the entire window elapsed unobserved; rebuild from the
                // oldest recorded balance, never from the proposed one
                let baseline = config.interval_history[0];
                warn!(
                    "[GUARD] {category} window stale for {shifts_needed} shifts, \
                     rebuilding from recorded baseline {baseline}"
                );
                *config = WindowConfig::seeded(
                    category.default_window(),
                    category.default_shift(),
                    baseline,
                    category.default_threshold_pct(),
                    now,
                );
                return;
            }

            if shifts_needed > 0 {
                config.advance(shifts_needed as usize, proposed_balance);
            }
        }

        config.record_snapshot(proposed_balance, now);
    }

    /// Is the category currently monitored?
    pub fn is_active(&self, category: Category) -> bool {
        self.windows.contains_key(&category)
    }

    /// Window state for a category, if active
    pub fn config(&self, category: Category) -> Option<&WindowConfig> {
        self.windows.get(&category)
    }

    /// Read-only snapshot for introspection
    pub fn snapshot(&self, category: Category) -> Option<WindowSnapshot> {
        self.windows.get(&category).map(|c| c.snapshot(category))
    }
}
