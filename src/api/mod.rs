//! API service modules for IG REST endpoints.
//!
//! Each service covers one resource area and is obtained from
//! [`IgClient`](crate::IgClient).

mod accounts;
mod dealing;
mod market_data;
mod watchlists;

pub use accounts::{AccountsService, HistoryQuery, TransactionHistoryQuery};
pub use dealing::DealingService;
pub use market_data::{MarketDataService, MAX_EPICS_PER_REQUEST};
pub use watchlists::WatchlistsService;
