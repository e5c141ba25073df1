//! Market data service: prices, navigation, details and search.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::client::{path_segment, ClientInner};
use crate::models::market::{price_history, table_or_empty};
use crate::models::{
    Epic, MarketDetailsFilter, MarketNavigation, NodeId, PriceHistory, Resolution, MARKET_COLUMNS,
};
use crate::table::Table;
use crate::{ApiVersion, Error, Result};

/// Maximum number of epics per `/markets` details request.
pub const MAX_EPICS_PER_REQUEST: usize = 50;

/// Format of the start and end dates in a price path.
const PRICE_PATH_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Service for market data operations.
///
/// # Example
///
/// ```no_run
/// use ig_rest::models::Resolution;
/// use ig_rest::Epic;
///
/// # async fn example(client: ig_rest::IgClient) -> ig_rest::Result<()> {
/// let epic = Epic::new("CS.D.GBPUSD.TODAY.IP");
/// let prices = client
///     .market_data()
///     .prices_by_points(&epic, Resolution::Hour, 24)
///     .await?;
/// for (time, row) in prices.iter() {
///     println!("{time}: {row:?}");
/// }
///
/// let found = client.market_data().search("GBP/USD").await?;
/// println!("{} markets", found.len());
/// # Ok(())
/// # }
/// ```
pub struct MarketDataService {
    inner: Arc<ClientInner>,
}

impl MarketDataService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Historical prices between two dates.
    ///
    /// The result is indexed by snapshot time with the `*_bid`, `*_ask`
    /// and `volume` columns. An empty range yields an empty series with
    /// the same columns.
    pub async fn prices_by_date_range(
        &self,
        epic: &Epic,
        resolution: Resolution,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<PriceHistory> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "start {start} is after end {end}"
            )));
        }

        let endpoint = format!(
            "/prices/{}/{}/{}/{}",
            path_segment(epic.as_str()),
            resolution,
            start.format(PRICE_PATH_DATE_FORMAT),
            end.format(PRICE_PATH_DATE_FORMAT),
        );
        self.prices(&endpoint).await
    }

    /// The most recent `num_points` prices.
    pub async fn prices_by_points(
        &self,
        epic: &Epic,
        resolution: Resolution,
        num_points: u32,
    ) -> Result<PriceHistory> {
        if num_points == 0 {
            return Err(Error::InvalidInput("num_points must be positive".to_string()));
        }

        let endpoint = format!(
            "/prices/{}/{}/{}",
            path_segment(epic.as_str()),
            resolution,
            num_points
        );
        self.prices(&endpoint).await
    }

    async fn prices(&self, endpoint: &str) -> Result<PriceHistory> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            prices: Vec<Value>,
        }

        let response: Response = self.inner.get(endpoint, ApiVersion::V2).await?;
        price_history(&response.prices)
    }

    /// Top level of the market navigation tree.
    pub async fn navigation(&self) -> Result<MarketNavigation> {
        let data: Value = self.inner.get("/marketnavigation", ApiVersion::V1).await?;
        MarketNavigation::from_response(&data)
    }

    /// Children and markets of one navigation node.
    pub async fn navigation_node(&self, node_id: &NodeId) -> Result<MarketNavigation> {
        let endpoint = format!("/marketnavigation/{}", path_segment(node_id.as_str()));
        let data: Value = self.inner.get(&endpoint, ApiVersion::V1).await?;
        MarketNavigation::from_response(&data)
    }

    /// Instrument, dealing rules and snapshot for up to
    /// [`MAX_EPICS_PER_REQUEST`] epics, as returned by IG.
    pub async fn details(&self, epics: &[Epic], filter: MarketDetailsFilter) -> Result<Value> {
        if epics.is_empty() {
            return Err(Error::InvalidInput("at least one epic is required".to_string()));
        }
        if epics.len() > MAX_EPICS_PER_REQUEST {
            return Err(Error::InvalidInput(format!(
                "Too many epics. Maximum is {}, got {}",
                MAX_EPICS_PER_REQUEST,
                epics.len()
            )));
        }

        #[derive(Serialize)]
        struct Query {
            epics: String,
            filter: MarketDetailsFilter,
        }

        let query = Query {
            epics: epics
                .iter()
                .map(Epic::as_str)
                .collect::<Vec<_>>()
                .join(","),
            filter,
        };

        self.inner
            .get_with_query("/markets", ApiVersion::V2, &query)
            .await
    }

    /// Markets matching a search term.
    pub async fn search(&self, term: &str) -> Result<Table> {
        let endpoint = format!("/markets?searchTerm={}", path_segment(term));
        let data: Value = self.inner.get(&endpoint, ApiVersion::V1).await?;
        table_or_empty(data.get("markets"), MARKET_COLUMNS)
    }
}
