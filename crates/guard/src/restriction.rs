//! Account restriction registry
//!
//! Accounts land here when a breach is steep enough to look deliberate.
//! Membership bars every self-service mutating operation until an
//! operator clears it.

use log::info;
use palisade_core::AccountId;
use std::collections::HashSet;

/// Set of accounts barred from self-service operations
#[derive(Debug, Default)]
pub struct RestrictionRegistry {
    restricted: HashSet<AccountId>,
}

impl RestrictionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bar an account; idempotent
    pub fn restrict(&mut self, account: AccountId) {
        if self.restricted.insert(account.clone()) {
            info!("[GUARD] account restricted: {account}");
        }
    }

    /// Lift a restriction; a no-op for unrestricted accounts
    pub fn unrestrict(&mut self, account: &AccountId) {
        if self.restricted.remove(account) {
            info!("[GUARD] account unrestricted: {account}");
        }
    }

    pub fn is_restricted(&self, account: &AccountId) -> bool {
        self.restricted.contains(account)
    }

    pub fn accounts(&self) -> Vec<AccountId> {
        self.restricted.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_semantics() {
        let mut registry = RestrictionRegistry::new();
        let account = AccountId::new("mallory");

        assert!(!registry.is_restricted(&account));

        registry.restrict(account.clone());
        registry.restrict(account.clone());
        assert!(registry.is_restricted(&account));
        assert_eq!(registry.accounts(), vec![account.clone()]);

        registry.unrestrict(&account);
        assert!(!registry.is_restricted(&account));
        assert!(registry.accounts().is_empty());

        // clearing again is harmless
        registry.unrestrict(&account);
    }
}
