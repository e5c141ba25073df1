//! # ig-rest
//!
//! An async Rust client for the IG trading REST API.
//!
//! The client logs in once, keeps the `CST` and `X-SECURITY-TOKEN`
//! tokens on a shared [`Session`], and reshapes IG's JSON responses into
//! [`Table`]s and [`TimeSeries`] for analysis.
//!
//! ## Features
//!
//! - **Authentication**: login, account switching and logout
//! - **Market Data**: historical prices, navigation tree, market details and search
//! - **Accounts**: account list, preferences, activity and transaction history
//! - **Watchlists**: create, inspect, edit and delete watchlists
//! - **Dealing**: positions, working orders and sprint markets, each write
//!   followed by its deal confirmation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ig_rest::{Credentials, Epic, IgClient};
//! use ig_rest::models::Resolution;
//!
//! #[tokio::main]
//! async fn main() -> ig_rest::Result<()> {
//!     let credentials = Credentials::new("identifier", "password", "api-key", "demo");
//!     let client = IgClient::login(credentials).await?;
//!
//!     let accounts = client.accounts().list().await?;
//!     println!("Found {} accounts", accounts.len());
//!
//!     let prices = client
//!         .market_data()
//!         .prices_by_points(&Epic::new("CS.D.GBPUSD.TODAY.IP"), Resolution::Day, 10)
//!         .await?;
//!     println!("{:?}", prices.table().column("close_bid"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Dealing
//!
//! ```rust,no_run
//! use ig_rest::{Credentials, IgClient};
//! use ig_rest::models::{ClosePositionRequest, Direction, OpenPositionRequest, OrderType};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() -> ig_rest::Result<()> {
//!     let client = IgClient::login(Credentials::from_env()?).await?;
//!
//!     let open = OpenPositionRequest::builder()
//!         .epic("CS.D.GBPUSD.TODAY.IP")
//!         .expiry("DFB")
//!         .direction(Direction::Buy)
//!         .size(dec!(1))
//!         .order_type(OrderType::Market)
//!         .currency_code("GBP")
//!         .build()?;
//!
//!     let confirmation = client.dealing().open_position(&open).await?.into_accepted()?;
//!
//!     if let Some(deal_id) = confirmation.deal_id {
//!         let close = ClosePositionRequest::by_deal_id(deal_id, Direction::Sell, dec!(1), OrderType::Market);
//!         client.dealing().close_position(&close).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod table;

// Re-export primary types at crate root for convenience
pub use error::{Error, Result};
pub use models::{
    AccountNumber, ApiVersion, DealId, DealReference, Environment, Epic, NodeId, WatchlistId,
};
pub use client::{ClientConfig, Credentials, IgClient, ParamEncoding};
pub use auth::Session;
pub use table::{Table, TimeSeries};

/// Prelude module for convenient imports.
///
/// ```rust
/// use ig_rest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::models::{
        // Primitives
        AccountNumber, ApiVersion, DealId, DealReference, Environment, Epic, NodeId, WatchlistId,
        // Enums
        Direction, MarketDetailsFilter, OrderType, Resolution, TimeInForce, TransactionType,
        WorkingOrderTimeInForce, WorkingOrderType,
        // Market models
        MarketNavigation, PriceHistory,
        // Account models
        AccountPreferences, CreatedWatchlist, StatusResponse,
        // Dealing models
        ClosePositionRequest, CreateWorkingOrderRequest, DealConfirmation, DealOutcome,
        OpenPositionRequest, PositionTables, UpdatePositionRequest, UpdateWorkingOrderRequest,
        WorkingOrderTables,
    };
    pub use crate::api::{HistoryQuery, TransactionHistoryQuery};
    pub use crate::client::{ClientConfig, Credentials, IgClient};
    pub use crate::auth::Session;
    pub use crate::table::{Table, TimeSeries};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epic_creation() {
        let epic = Epic::new("CS.D.GBPUSD.TODAY.IP");
        assert_eq!(epic.as_str(), "CS.D.GBPUSD.TODAY.IP");
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(
            Environment::Live.api_base_url(),
            "https://api.ig.com/gateway/deal"
        );
        assert_eq!(
            Environment::Demo.api_base_url(),
            "https://demo-api.ig.com/gateway/deal"
        );
    }

    #[test]
    fn test_api_version_validation() {
        assert!(ApiVersion::new(2).is_ok());
        assert!(ApiVersion::new(0).is_err());
    }
}
