//! High-risk withdrawal pool
//!
//! While degraded mode is active every withdrawal must also fit inside a
//! global pool and a per-user allowance. Each activation opens a new
//! epoch; per-user counters from earlier epochs are invalidated wholesale
//! by the epoch bump and reset lazily on a user's first withdrawal of the
//! new epoch.

use log::{info, warn};
use palisade_core::{AccountId, Balance};
use palisade_ports::{GuardError, GuardResult, PoolStats};
use std::collections::HashMap;

/// Configuration for the high-risk pool
#[derive(Debug, Clone)]
pub struct HighRiskPoolConfig {
    /// Pool size restored when an activation follows recorded withdrawals
    pub default_pool_size: Balance,
    /// Per-user allowance restored alongside the pool size
    pub default_per_user_limit: Balance,
    /// Smallest configurable pool size
    pub min_pool_size: Balance,
    /// Smallest configurable per-user allowance
    pub min_per_user_limit: Balance,
}

impl Default for HighRiskPoolConfig {
    fn default() -> Self {
        Self {
            default_pool_size: 1_000_000,
            default_per_user_limit: 50_000,
            min_pool_size: 10_000,
            min_per_user_limit: 1_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct UserAllowance {
    last_epoch: u64,
    withdrawn: Balance,
}

/// Epoch-scoped withdrawal caps enforced while degraded mode is active
#[derive(Debug)]
pub struct HighRiskPool {
    config: HighRiskPoolConfig,
    active: bool,
    pool_size: Balance,
    per_user_limit: Balance,
    total_withdrawn: Balance,
    epoch: u64,
    users: HashMap<AccountId, UserAllowance>,
}

impl HighRiskPool {
    pub fn new(config: HighRiskPoolConfig) -> Self {
        let pool_size = config.default_pool_size;
        let per_user_limit = config.default_per_user_limit;

        Self {
            config,
            active: false,
            pool_size,
            per_user_limit,
            total_withdrawn: 0,
            epoch: 0,
            users: HashMap::new(),
        }
    }

    /// Engage degraded mode, opening a new epoch
    ///
    /// A pool that saw withdrawals since its last reset returns to the
    /// default sizing; an untouched operator configuration is preserved.
    pub fn enable(&mut self) -> GuardResult<()> {
        if self.active {
            return Err(GuardError::AlreadyActive("high-risk pool".to_string()));
        }

        self.epoch += 1;

        if self.total_withdrawn > 0 {
            self.pool_size = self.config.default_pool_size;
            self.per_user_limit = self.config.default_per_user_limit;
            self.total_withdrawn = 0;
        }

        self.active = true;
        info!(
            "[GUARD] high-risk pool active: epoch={}, pool_size={}, per_user_limit={}",
            self.epoch, self.pool_size, self.per_user_limit
        );
        Ok(())
    }

    /// Clear degraded mode; accumulated totals are kept for audit
    pub fn disable(&mut self) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::NotActive("high-risk pool".to_string()));
        }
        self.active = false;
        info!(
            "[GUARD] high-risk pool cleared: epoch={}, total_withdrawn={}",
            self.epoch, self.total_withdrawn
        );
        Ok(())
    }

    /// Resize the pool; only permitted while inactive
    pub fn configure(&mut self, pool_size: Balance, per_user_limit: Balance) -> GuardResult<()> {
        if self.active {
            return Err(GuardError::AlreadyActive("high-risk pool".to_string()));
        }
        if pool_size <= per_user_limit {
            return Err(GuardError::InvalidConfiguration(
                "pool size must exceed the per-user limit".to_string(),
            ));
        }
        if pool_size <= self.config.min_pool_size {
            return Err(GuardError::InvalidConfiguration(format!(
                "pool size must exceed the minimum of {}",
                self.config.min_pool_size
            )));
        }
        if per_user_limit <= self.config.min_per_user_limit {
            return Err(GuardError::InvalidConfiguration(format!(
                "per-user limit must exceed the minimum of {}",
                self.config.min_per_user_limit
            )));
        }

        self.pool_size = pool_size;
        self.per_user_limit = per_user_limit;
        self.total_withdrawn = 0;
        info!(
            "[GUARD] high-risk pool configured: pool_size={pool_size}, per_user_limit={per_user_limit}"
        );
        Ok(())
    }

    /// Authorize a withdrawal against the pool and the user's allowance
    ///
    /// Both totals commit together, or nothing does.
    pub fn withdraw(&mut self, user: &AccountId, amount: Balance) -> GuardResult<()> {
        if !self.active {
            return Err(GuardError::NotActive("high-risk pool".to_string()));
        }
        if self.pool_size < self.total_withdrawn + amount {
            return Err(GuardError::PoolExhausted {
                requested: amount,
                remaining: self.pool_size - self.total_withdrawn,
            });
        }

        let recorded = self.users.get(user).copied().unwrap_or_default();
        let already_withdrawn = if recorded.last_epoch < self.epoch {
            0
        } else {
            recorded.withdrawn
        };

        if already_withdrawn + amount > self.per_user_limit {
            return Err(GuardError::UserLimitExceeded {
                requested: amount,
                remaining: self.per_user_limit - already_withdrawn,
            });
        }

        self.users.insert(
            user.clone(),
            UserAllowance {
                last_epoch: self.epoch,
                withdrawn: already_withdrawn + amount,
            },
        );
        self.total_withdrawn += amount;

        warn!(
            "[GUARD] high-risk withdrawal: user={}, amount={}, pool used {}/{}",
            user, amount, self.total_withdrawn, self.pool_size
        );
        Ok(())
    }

    /// Is degraded mode active?
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current activation epoch
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Read-only view for introspection
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active,
            pool_size: self.pool_size,
            per_user_limit: self.per_user_limit,
            total_withdrawn: self.total_withdrawn,
            epoch: self.epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> HighRiskPool {
        HighRiskPool::new(HighRiskPoolConfig::default())
    }

    fn alice() -> AccountId {
        AccountId::new("alice")
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut pool = pool();

        assert!(matches!(
            pool.disable().unwrap_err(),
            GuardError::NotActive(_)
        ));

        pool.enable().unwrap();
        assert!(matches!(
            pool.enable().unwrap_err(),
            GuardError::AlreadyActive(_)
        ));

        pool.disable().unwrap();
        assert!(matches!(
            pool.disable().unwrap_err(),
            GuardError::NotActive(_)
        ));
    }

    #[test]
    fn test_configure_validation() {
        let mut pool = pool();

        // pool must exceed per-user limit
        assert!(matches!(
            pool.configure(50_000, 50_000).unwrap_err(),
            GuardError::InvalidConfiguration(_)
        ));

        // both must exceed the minimums
        assert!(matches!(
            pool.configure(10_000, 2_000).unwrap_err(),
            GuardError::InvalidConfiguration(_)
        ));
        assert!(matches!(
            pool.configure(100_000, 1_000).unwrap_err(),
            GuardError::InvalidConfiguration(_)
        ));

        pool.configure(100_000, 5_000).unwrap();
        assert_eq!(pool.stats().pool_size, 100_000);
        assert_eq!(pool.stats().per_user_limit, 5_000);

        // not while active
        pool.enable().unwrap();
        assert!(matches!(
            pool.configure(200_000, 5_000).unwrap_err(),
            GuardError::AlreadyActive(_)
        ));
    }

    #[test]
    fn test_withdraw_requires_active_mode() {
        let mut pool = pool();
        assert!(matches!(
            pool.withdraw(&alice(), 1_000).unwrap_err(),
            GuardError::NotActive(_)
        ));
    }

    #[test]
    fn test_per_user_limit_boundary() {
        let mut pool = pool();
        pool.enable().unwrap();

        // exactly the allowance is fine
        pool.withdraw(&alice(), 50_000).unwrap();

        // one more unit is not
        let err = pool.withdraw(&alice(), 1).unwrap_err();
        assert!(matches!(
            err,
            GuardError::UserLimitExceeded {
                requested: 1,
                remaining: 0
            }
        ));
    }

    #[test]
    fn test_epoch_cycle_resets_user_allowance() {
        let mut pool = pool();
        pool.enable().unwrap();

        pool.withdraw(&alice(), 50_000).unwrap();
        assert!(pool.withdraw(&alice(), 1).is_err());

        // a disable/enable cycle opens a new epoch
        pool.disable().unwrap();
        pool.enable().unwrap();

        pool.withdraw(&alice(), 50_000).unwrap();
        assert_eq!(pool.epoch(), 2);
    }

    #[test]
    fn test_pool_exhaustion() {
        let mut pool = pool();
        pool.configure(20_000, 15_000).unwrap();
        pool.enable().unwrap();

        pool.withdraw(&AccountId::new("a"), 15_000).unwrap();
        let err = pool.withdraw(&AccountId::new("b"), 10_000).unwrap_err();
        assert!(matches!(
            err,
            GuardError::PoolExhausted {
                requested: 10_000,
                remaining: 5_000
            }
        ));

        // a failed withdrawal must not consume anything
        pool.withdraw(&AccountId::new("b"), 5_000).unwrap();
    }

    #[test]
    fn test_enable_restores_defaults_only_after_withdrawals() {
        let mut pool = pool();
        pool.configure(100_000, 5_000).unwrap();

        // untouched configuration survives activation
        pool.enable().unwrap();
        assert_eq!(pool.stats().pool_size, 100_000);

        pool.withdraw(&alice(), 4_000).unwrap();
        pool.disable().unwrap();

        // the next activation discards the used configuration
        pool.enable().unwrap();
        let stats = pool.stats();
        assert_eq!(stats.pool_size, 1_000_000);
        assert_eq!(stats.per_user_limit, 50_000);
        assert_eq!(stats.total_withdrawn, 0);
    }

    #[test]
    fn test_disable_keeps_totals() {
        let mut pool = pool();
        pool.enable().unwrap();
        pool.withdraw(&alice(), 10_000).unwrap();

        pool.disable().unwrap();
        assert_eq!(pool.stats().total_withdrawn, 10_000);
    }
}
