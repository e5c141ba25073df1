//! Account, preference and watchlist models.

use serde::{Deserialize, Serialize};

use super::primitives::WatchlistId;

/// Renames applied to the flattened `/accounts` table.
pub(crate) const ACCOUNT_RENAMES: &[(&str, &str)] = &[
    ("balance.balance", "balance"),
    ("balance.deposit", "deposit"),
    ("balance.profitLoss", "profitLoss"),
    ("balance.available", "availableBalance"),
];

/// Account-level dealing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPreferences {
    /// Whether trailing stops may be used on this account
    pub trailing_stops_enabled: bool,
}

/// Bare `{"status": ...}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// `SUCCESS` on success
    pub status: String,
}

impl StatusResponse {
    /// Returns `true` when IG reported `SUCCESS`.
    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}

/// Result of creating a watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWatchlist {
    /// Id of the new watchlist
    pub watchlist_id: WatchlistId,
    /// `SUCCESS`, or `SUCCESS_NOT_ALL_INSTRUMENTS_ADDED`
    pub status: String,
}
