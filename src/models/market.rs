//! Market and price models.

use serde_json::Value;

use crate::table::{Table, TimeSeries};
use crate::Result;

/// Historical prices indexed by snapshot time.
pub type PriceHistory = TimeSeries;

/// Name of the price index.
pub const PRICE_INDEX_NAME: &str = "DateTime";

/// Columns of an empty navigation `nodes` table.
pub const NODE_COLUMNS: &[&str] = &["id", "name"];

/// Columns of an empty navigation `markets` table.
pub const MARKET_COLUMNS: &[&str] = &[
    "bid",
    "delayTime",
    "epic",
    "expiry",
    "high",
    "instrumentName",
    "instrumentType",
    "lotSize",
    "low",
    "marketStatus",
    "netChange",
    "offer",
    "otcTradeable",
    "percentageChange",
    "scalingFactor",
    "streamingPricesAvailable",
    "updateTime",
];

const PRICE_DROPPED_COLUMNS: &[&str] = &[
    "openPrice.lastTraded",
    "highPrice.lastTraded",
    "lowPrice.lastTraded",
    "closePrice.lastTraded",
];

const PRICE_RENAMES: &[(&str, &str)] = &[
    ("openPrice.ask", "open_ask"),
    ("openPrice.bid", "open_bid"),
    ("highPrice.ask", "high_ask"),
    ("highPrice.bid", "high_bid"),
    ("lowPrice.ask", "low_ask"),
    ("lowPrice.bid", "low_bid"),
    ("closePrice.ask", "close_ask"),
    ("closePrice.bid", "close_bid"),
    ("lastTradedVolume", "volume"),
];

/// Columns of an empty price history.
pub const PRICE_COLUMNS: &[&str] = &[
    "open_bid",
    "open_ask",
    "close_bid",
    "close_ask",
    "high_bid",
    "high_ask",
    "low_bid",
    "low_ask",
    "volume",
];

/// One level of the market navigation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketNavigation {
    /// Child nodes (`id`, `name`)
    pub nodes: Table,
    /// Markets listed directly under this node
    pub markets: Table,
}

impl MarketNavigation {
    /// Reshape a navigation response. A `null`, absent or empty `nodes`
    /// or `markets` becomes an empty table with the fixed schema.
    pub(crate) fn from_response(data: &Value) -> Result<Self> {
        Ok(Self {
            nodes: table_or_empty(data.get("nodes"), NODE_COLUMNS)?,
            markets: table_or_empty(data.get("markets"), MARKET_COLUMNS)?,
        })
    }
}

pub(crate) fn table_or_empty(value: Option<&Value>, schema: &[&str]) -> Result<Table> {
    match value.and_then(Value::as_array) {
        Some(records) if !records.is_empty() => Table::normalize(records),
        _ => Ok(Table::with_columns(schema.iter().copied())),
    }
}

/// Reshape a `prices` array: flatten, drop the `lastTraded` sub-fields,
/// rename to short column names, and index by `snapshotTime`.
pub(crate) fn price_history(prices: &[Value]) -> Result<PriceHistory> {
    if prices.is_empty() {
        return Ok(TimeSeries::empty(PRICE_INDEX_NAME, PRICE_COLUMNS.iter().copied()));
    }

    let mut table = Table::normalize(prices)?;
    table.drop_columns(PRICE_DROPPED_COLUMNS);
    table.rename_columns(PRICE_RENAMES);
    table.into_time_series("snapshotTime", PRICE_INDEX_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bar(time: &str, close_bid: f64) -> Value {
        json!({
            "snapshotTime": time,
            "openPrice": {"bid": 1.0, "ask": 1.1, "lastTraded": null},
            "closePrice": {"bid": close_bid, "ask": 1.3, "lastTraded": null},
            "highPrice": {"bid": 1.4, "ask": 1.5, "lastTraded": null},
            "lowPrice": {"bid": 0.9, "ask": 1.0, "lastTraded": null},
            "lastTradedVolume": 100
        })
    }

    #[test]
    fn test_price_history_reshape() {
        let series = price_history(&[
            bar("2024/01/05 10:00:00", 1.2),
            bar("2024/01/05 10:01:00", 1.25),
        ])
        .unwrap();

        assert_eq!(series.index_name(), "DateTime");
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.table().columns(),
            &[
                "open_bid", "open_ask", "close_bid", "close_ask", "high_bid", "high_ask",
                "low_bid", "low_ask", "volume"
            ]
        );
        assert_eq!(series.table().get(1, "close_bid"), Some(&json!(1.25)));
        assert!(!series.table().has_column("openPrice.lastTraded"));
    }

    #[test]
    fn test_empty_prices_keep_schema() {
        let series = price_history(&[]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.table().columns().len(), PRICE_COLUMNS.len());
    }

    #[test]
    fn test_navigation_null_substructures() {
        let nav = MarketNavigation::from_response(&json!({"nodes": null, "markets": null})).unwrap();
        assert!(nav.nodes.is_empty());
        assert_eq!(nav.nodes.columns(), NODE_COLUMNS);
        assert!(nav.markets.is_empty());
        assert_eq!(nav.markets.columns(), MARKET_COLUMNS);
    }

    #[test]
    fn test_navigation_populated() {
        let nav = MarketNavigation::from_response(&json!({
            "nodes": [{"id": "195235", "name": "Indices"}],
            "markets": null
        }))
        .unwrap();
        assert_eq!(nav.nodes.len(), 1);
        assert_eq!(nav.nodes.get(0, "name"), Some(&json!("Indices")));
        assert_eq!(nav.markets.columns(), MARKET_COLUMNS);
    }

    #[test]
    fn test_navigation_empty_lists_keep_schema() {
        let nav = MarketNavigation::from_response(&json!({"nodes": [], "markets": []})).unwrap();
        assert!(nav.nodes.is_empty());
        assert_eq!(nav.nodes.columns(), NODE_COLUMNS);
        assert!(nav.markets.is_empty());
        assert_eq!(nav.markets.columns(), MARKET_COLUMNS);
    }
}
