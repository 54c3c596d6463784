//! Target-ratio-with-band rebalancing decision.
//!
//! [`decide`] picks one of BUY / SELL / HOLD from the current allocation.
//! [`next_signal`] reports, for planning only, the prices one band away from
//! the current price and the quantity that would restore the target there.

use std::fmt;

pub const DEFAULT_TARGET_RATIO: f64 = 0.9;
pub const DEFAULT_BAND: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            "HOLD" => Ok(Action::Hold),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// What to do when the ledger reports a total value of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroValuePolicy {
    /// Treat the ratio as zero and recommend HOLD.
    #[default]
    Hold,
    /// Refuse to produce a signal.
    Reject,
}

impl std::str::FromStr for ZeroValuePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hold" => Ok(ZeroValuePolicy::Hold),
            "reject" => Ok(ZeroValuePolicy::Reject),
            other => Err(format!("expected 'hold' or 'reject', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalancePolicy {
    pub target_ratio: f64,
    pub band: f64,
    pub on_zero_total_value: ZeroValuePolicy,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            target_ratio: DEFAULT_TARGET_RATIO,
            band: DEFAULT_BAND,
            on_zero_total_value: ZeroValuePolicy::default(),
        }
    }
}

impl RebalancePolicy {
    pub fn lower_bound(&self) -> f64 {
        self.target_ratio - self.band
    }

    pub fn upper_bound(&self) -> f64 {
        self.target_ratio + self.band
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceDecision {
    pub price: f64,
    pub holdings: f64,
    pub cash: f64,
    pub total_value: f64,
    pub current_ratio: f64,
    pub action: Action,
    pub shares: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextSignal {
    pub next_buy_price: f64,
    pub next_buy_shares: u64,
    pub next_sell_price: f64,
    pub next_sell_shares: u64,
}

/// holdings * price / total_value, or 0 when total_value is not positive.
pub fn current_ratio(price: f64, holdings: f64, total_value: f64) -> f64 {
    if total_value > 0.0 {
        holdings * price / total_value
    } else {
        0.0
    }
}

pub fn decide(
    price: f64,
    holdings: f64,
    cash: f64,
    total_value: f64,
    policy: &RebalancePolicy,
) -> RebalanceDecision {
    let ratio = current_ratio(price, holdings, total_value);
    let target_value = policy.target_ratio * total_value;
    let held_value = holdings * price;

    let (action, shares) = if ratio < policy.lower_bound() && cash >= price {
        match whole_shares((target_value - held_value) / price) {
            0 => (Action::Hold, 0),
            n => (Action::Buy, n),
        }
    } else if ratio > policy.upper_bound() && holdings > 0.0 {
        match whole_shares((held_value - target_value) / price) {
            0 => (Action::Hold, 0),
            n => (Action::Sell, n),
        }
    } else {
        (Action::Hold, 0)
    };

    RebalanceDecision {
        price,
        holdings,
        cash,
        total_value,
        current_ratio: ratio,
        action,
        shares,
    }
}

/// Look-ahead trigger levels one band below and above `price`.
///
/// Cash is not consulted; quantities may exceed what is affordable.
pub fn next_signal(
    price: f64,
    holdings: f64,
    total_value: f64,
    policy: &RebalancePolicy,
) -> NextSignal {
    let target_value = policy.target_ratio * total_value;

    let next_buy_price = round2(price * (1.0 - policy.band));
    let next_buy_shares = if next_buy_price > 0.0 {
        whole_shares((target_value - holdings * next_buy_price) / next_buy_price)
    } else {
        0
    };

    let next_sell_price = round2(price * (1.0 + policy.band));
    let next_sell_shares = if next_sell_price > 0.0 {
        whole_shares((holdings * next_sell_price - target_value) / next_sell_price)
    } else {
        0
    };

    NextSignal {
        next_buy_price,
        next_buy_shares,
        next_sell_price,
        next_sell_shares,
    }
}

/// Floor to a whole share count; negative and non-finite inputs become 0.
fn whole_shares(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as u64
    } else {
        0
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
