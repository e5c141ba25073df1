//! Enumeration types for the IG API.
//!
//! Values serialize to the upper-snake-case strings IG expects on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bar resolution for historical prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    /// One second
    Second,
    /// One minute
    Minute,
    /// Two minutes
    #[serde(rename = "MINUTE_2")]
    Minute2,
    /// Three minutes
    #[serde(rename = "MINUTE_3")]
    Minute3,
    /// Five minutes
    #[serde(rename = "MINUTE_5")]
    Minute5,
    /// Ten minutes
    #[serde(rename = "MINUTE_10")]
    Minute10,
    /// Fifteen minutes
    #[serde(rename = "MINUTE_15")]
    Minute15,
    /// Thirty minutes
    #[serde(rename = "MINUTE_30")]
    Minute30,
    /// One hour
    Hour,
    /// Two hours
    #[serde(rename = "HOUR_2")]
    Hour2,
    /// Three hours
    #[serde(rename = "HOUR_3")]
    Hour3,
    /// Four hours
    #[serde(rename = "HOUR_4")]
    Hour4,
    /// One day
    Day,
    /// One week
    Week,
    /// One month
    Month,
}

impl Resolution {
    /// The path segment IG expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Second => "SECOND",
            Resolution::Minute => "MINUTE",
            Resolution::Minute2 => "MINUTE_2",
            Resolution::Minute3 => "MINUTE_3",
            Resolution::Minute5 => "MINUTE_5",
            Resolution::Minute10 => "MINUTE_10",
            Resolution::Minute15 => "MINUTE_15",
            Resolution::Minute30 => "MINUTE_30",
            Resolution::Hour => "HOUR",
            Resolution::Hour2 => "HOUR_2",
            Resolution::Hour3 => "HOUR_3",
            Resolution::Hour4 => "HOUR_4",
            Resolution::Day => "DAY",
            Resolution::Week => "WEEK",
            Resolution::Month => "MONTH",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which market detail fields to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketDetailsFilter {
    /// Full instrument, dealing rules and snapshot
    #[default]
    All,
    /// Snapshot only
    SnapshotOnly,
}

/// Deal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Buy
    Buy,
    /// Sell
    Sell,
}

impl Direction {
    /// The direction that closes a position opened in this direction.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }
}

/// Order type for opening or closing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Fill at `level` or better
    Limit,
    /// Fill at the current market price
    Market,
    /// Fill against a quote (`quoteId` and `level` required)
    Quote,
}

/// Time in force for position deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Fill what is possible, cancel the rest
    ExecuteAndEliminate,
    /// Fill completely or not at all
    FillOrKill,
}

/// Working order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingOrderType {
    /// Triggers when the market moves favourably to `level`
    Limit,
    /// Triggers when the market moves adversely to `level`
    Stop,
}

/// Time in force for working orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingOrderTimeInForce {
    /// Good till cancelled
    GoodTillCancelled,
    /// Good till `goodTillDate`
    GoodTillDate,
}

/// Filter for transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Every transaction
    #[default]
    All,
    /// Deal-related transactions
    AllDeal,
    /// Deposits
    Deposit,
    /// Withdrawals
    Withdrawal,
}

/// Expiry period of a sprint market position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintMarketExpiryPeriod {
    /// One minute
    OneMinute,
    /// Two minutes
    TwoMinutes,
    /// Five minutes
    FiveMinutes,
    /// Twenty minutes
    TwentyMinutes,
    /// Sixty minutes
    SixtyMinutes,
}

/// Final status of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStatus {
    /// The deal was executed or the order placed
    Accepted,
    /// The deal was refused; see the confirmation's `reason`
    Rejected,
    /// Status not known to this crate
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_wire_names() {
        assert_eq!(Resolution::Minute5.as_str(), "MINUTE_5");
        assert_eq!(
            serde_json::to_string(&Resolution::Hour4).unwrap(),
            "\"HOUR_4\""
        );
        assert_eq!(serde_json::to_string(&Resolution::Day).unwrap(), "\"DAY\"");
    }

    #[test]
    fn test_dealing_enums_wire_names() {
        assert_eq!(
            serde_json::to_string(&TimeInForce::ExecuteAndEliminate).unwrap(),
            "\"EXECUTE_AND_ELIMINATE\""
        );
        assert_eq!(
            serde_json::to_string(&WorkingOrderTimeInForce::GoodTillDate).unwrap(),
            "\"GOOD_TILL_DATE\""
        );
        assert_eq!(
            serde_json::to_string(&SprintMarketExpiryPeriod::FiveMinutes).unwrap(),
            "\"FIVE_MINUTES\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionType::AllDeal).unwrap(),
            "\"ALL_DEAL\""
        );
    }

    #[test]
    fn test_deal_status_unknown() {
        let status: DealStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(status, DealStatus::Unknown);
        assert_eq!(Direction::Buy.opposite(), Direction::Sell);
    }
}
