use chrono::Duration;
use serde::{Deserialize, Serialize};

/// What the guard monitors
///
/// Each variant is an aggregate balance with its own monitoring window.
/// The resync defaults below are used when a window has gone stale for a
/// full window's worth of time and is rebuilt automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Capital backing liquidity-provider share tokens
    LiquidityPool,
    /// Total treasury balance
    Casino,
}

impl Category {
    /// Both monitored categories
    pub const ALL: [Category; 2] = [Category::LiquidityPool, Category::Casino];

    /// Window duration used when a stale window is rebuilt
    pub fn default_window(&self) -> Duration {
        match self {
            Category::LiquidityPool => Duration::hours(8),
            Category::Casino => Duration::hours(8),
        }
    }

    /// Shift duration used when a stale window is rebuilt
    pub fn default_shift(&self) -> Duration {
        match self {
            Category::LiquidityPool => Duration::hours(2),
            Category::Casino => Duration::hours(2),
        }
    }

    /// Threshold percentage used when a stale window is rebuilt
    ///
    /// The liquidity pool backs share tokens and gets the tighter bound.
    pub fn default_threshold_pct(&self) -> u8 {
        match self {
            Category::LiquidityPool => 20,
            Category::Casino => 40,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::LiquidityPool => write!(f, "liquidity-pool"),
            Category::Casino => write!(f, "casino"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resync_defaults() {
        for category in Category::ALL {
            assert_eq!(category.default_window(), Duration::hours(8));
            assert_eq!(category.default_shift(), Duration::hours(2));
            assert_eq!(
                category.default_window().num_seconds() % category.default_shift().num_seconds(),
                0
            );
        }

        assert_eq!(Category::LiquidityPool.default_threshold_pct(), 20);
        assert_eq!(Category::Casino.default_threshold_pct(), 40);
    }

    #[test]
    fn test_display() {
        assert_eq!(Category::LiquidityPool.to_string(), "liquidity-pool");
        assert_eq!(Category::Casino.to_string(), "casino");
    }
}
