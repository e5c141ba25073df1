//! Watchlists service.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{path_segment, ClientInner};
use crate::models::market::table_or_empty;
use crate::models::{CreatedWatchlist, Epic, StatusResponse, WatchlistId, MARKET_COLUMNS};
use crate::table::Table;
use crate::{ApiVersion, Error, Result};

/// Service for watchlist operations.
///
/// # Example
///
/// ```no_run
/// use ig_rest::Epic;
///
/// # async fn example(client: ig_rest::IgClient) -> ig_rest::Result<()> {
/// let created = client
///     .watchlists()
///     .create("FX", &[Epic::new("CS.D.GBPUSD.TODAY.IP")])
///     .await?;
///
/// client
///     .watchlists()
///     .add_market(&created.watchlist_id, &Epic::new("CS.D.EURUSD.TODAY.IP"))
///     .await?;
///
/// let markets = client.watchlists().get(&created.watchlist_id).await?;
/// # Ok(())
/// # }
/// ```
pub struct WatchlistsService {
    inner: Arc<ClientInner>,
}

impl WatchlistsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Get the user's watchlists.
    pub async fn list(&self) -> Result<Table> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            watchlists: Vec<Value>,
        }

        let response: Response = self.inner.get("/watchlists", ApiVersion::V1).await?;
        Table::normalize(&response.watchlists)
    }

    /// Create a new watchlist holding `epics`.
    pub async fn create(&self, name: &str, epics: &[Epic]) -> Result<CreatedWatchlist> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("watchlist name is required".to_string()));
        }

        #[derive(serde::Serialize)]
        struct Request<'a> {
            name: &'a str,
            epics: &'a [Epic],
        }

        self.inner
            .post("/watchlists", ApiVersion::V1, &Request { name, epics })
            .await
    }

    /// Markets on one watchlist.
    pub async fn get(&self, id: &WatchlistId) -> Result<Table> {
        let data: Value = self
            .inner
            .get(&watchlist_path(id), ApiVersion::V1)
            .await?;
        table_or_empty(data.get("markets"), MARKET_COLUMNS)
    }

    /// Add a market to a watchlist. Returns IG's status string.
    pub async fn add_market(&self, id: &WatchlistId, epic: &Epic) -> Result<String> {
        #[derive(serde::Serialize)]
        struct Request<'a> {
            epic: &'a Epic,
        }

        let response: StatusResponse = self
            .inner
            .put(&watchlist_path(id), ApiVersion::V1, &Request { epic })
            .await?;
        Ok(response.status)
    }

    /// Remove a market from a watchlist. Returns IG's status string.
    pub async fn remove_market(&self, id: &WatchlistId, epic: &Epic) -> Result<String> {
        let response: StatusResponse = self
            .inner
            .delete::<_, ()>(
                &format!("{}/{}", watchlist_path(id), path_segment(epic.as_str())),
                ApiVersion::V1,
                None,
            )
            .await?;
        Ok(response.status)
    }

    /// Delete a watchlist. Returns IG's status string.
    pub async fn delete(&self, id: &WatchlistId) -> Result<String> {
        let response: StatusResponse = self
            .inner
            .delete::<_, ()>(&watchlist_path(id), ApiVersion::V1, None)
            .await?;
        Ok(response.status)
    }
}

fn watchlist_path(id: &WatchlistId) -> String {
    format!("/watchlists/{}", path_segment(id.as_str()))
}
