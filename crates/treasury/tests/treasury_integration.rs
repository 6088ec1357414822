//! Treasury integration test
//!
//! Tests the full flow:
//! 1. Accounts fund the treasury and the liquidity pool
//! 2. Windows watch both monitored categories as time passes
//! 3. A drain attempt trips the breaker mid-window
//! 4. Degraded mode throttles everyone until the operator recovers

use chrono::{Duration, TimeZone, Utc};
use palisade_core::{AccountId, Category};
use palisade_treasury::infrastructure::time::ManualClock;
use palisade_treasury::{BetOutcome, Treasury, TreasuryError};
use std::sync::Arc;

fn setup() -> (Treasury, Arc<ManualClock>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    ));
    (Treasury::new(clock.clone()), clock)
}

#[test]
fn test_guarded_treasury_lifecycle() {
    let (treasury, clock) = setup();

    let lp = AccountId::new("lp");
    let bettor = AccountId::new("bettor");
    let attacker = AccountId::new("attacker");

    // === Fund the platform ===
    treasury.deposit(&lp, 500_000).unwrap();
    treasury.add_liquidity(&lp, 400_000).unwrap();
    treasury.deposit(&bettor, 50_000).unwrap();
    treasury.deposit(&attacker, 450_000).unwrap();
    assert_eq!(treasury.casino_balance(), 1_000_000);
    assert_eq!(treasury.liquidity_balance(), 400_000);

    // === Monitoring on both categories ===
    treasury
        .enable_window(Category::Casino, Duration::hours(8), Duration::hours(2), 40)
        .unwrap();
    treasury
        .enable_window(
            Category::LiquidityPool,
            Duration::hours(8),
            Duration::hours(2),
            20,
        )
        .unwrap();

    // === Ordinary traffic across intervals ===
    clock.advance(Duration::hours(2));
    treasury.withdraw(&bettor, 10_000).unwrap();

    clock.advance(Duration::hours(2));
    let bet = treasury.place_bet(&bettor, 20_000).unwrap();
    treasury
        .settle_bet(bet, BetOutcome::Won { payout: 35_000 })
        .unwrap();
    assert_eq!(treasury.liquidity_balance(), 385_000);

    // === Drain attempt: casino floor is 60% of 1_000_000 ===
    clock.advance(Duration::hours(1));
    let err = treasury.withdraw(&attacker, 440_000).unwrap_err();
    assert!(matches!(
        err,
        TreasuryError::BreachDetected { restricted: true }
    ));
    assert!(treasury.is_restricted(&attacker));
    assert_eq!(treasury.account_balance(&attacker).unwrap(), 450_000);
    assert!(treasury.window_snapshot(Category::Casino).is_none());

    // the liquidity-pool window keeps running independently
    assert!(treasury.window_snapshot(Category::LiquidityPool).is_some());

    // === Degraded mode: everyone is throttled ===
    let stats = treasury.pool_stats();
    assert!(stats.active);

    treasury.withdraw(&bettor, 30_000).unwrap();
    assert!(matches!(
        treasury.withdraw(&bettor, 25_000).unwrap_err(),
        TreasuryError::Guard(_)
    ));

    // === Operator recovery ===
    treasury.disable_high_risk_mode().unwrap();
    treasury
        .enable_window(Category::Casino, Duration::hours(8), Duration::hours(2), 40)
        .unwrap();

    let snap = treasury.window_snapshot(Category::Casino).unwrap();
    assert_eq!(snap.period_start_balance, treasury.casino_balance());

    // withdrawals clear normally again
    treasury.withdraw(&bettor, 5_000).unwrap();

    // === The audit trail survives for the host to persist ===
    let events = treasury.drain_guard_events();
    assert!(!events.is_empty());
}

#[test]
fn test_restriction_blocks_all_self_service() {
    let (treasury, _clock) = setup();
    let account = AccountId::new("suspect");

    treasury.deposit(&account, 10_000).unwrap();
    treasury.restrict(account.clone());

    assert!(matches!(
        treasury.deposit(&account, 1).unwrap_err(),
        TreasuryError::AccountRestricted(_)
    ));
    assert!(matches!(
        treasury.withdraw(&account, 1).unwrap_err(),
        TreasuryError::AccountRestricted(_)
    ));
    assert!(matches!(
        treasury.place_bet(&account, 1).unwrap_err(),
        TreasuryError::AccountRestricted(_)
    ));
    assert!(matches!(
        treasury.add_liquidity(&account, 1).unwrap_err(),
        TreasuryError::AccountRestricted(_)
    ));
    assert!(matches!(
        treasury.remove_liquidity(&account, 1).unwrap_err(),
        TreasuryError::AccountRestricted(_)
    ));

    treasury.unrestrict(&account);
    treasury.deposit(&account, 1).unwrap();
}

#[test]
fn test_stale_window_resyncs_from_recorded_baseline() {
    let (treasury, clock) = setup();
    let account = AccountId::new("user");

    treasury.deposit(&account, 100_000).unwrap();
    treasury
        .enable_window(Category::Casino, Duration::hours(8), Duration::hours(2), 40)
        .unwrap();

    // nothing touches the treasury for more than a full window
    clock.advance(Duration::hours(24));

    // the first withdrawal afterwards is judged against the recorded
    // baseline, not against the balance it proposes
    let err = treasury.withdraw(&account, 90_000).unwrap_err();
    assert!(matches!(err, TreasuryError::BreachDetected { .. }));

    let snap = treasury.window_snapshot(Category::Casino);
    assert!(snap.is_none());
}
