//! Accounts service for account, preference and history operations.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::client::paginated::fetch_all_pages;
use crate::client::{ClientInner, DEFAULT_PAGE_SIZE};
use crate::models::account::ACCOUNT_RENAMES;
use crate::models::{AccountPreferences, StatusResponse, TransactionType};
use crate::table::Table;
use crate::{ApiVersion, Error, Result};

/// Format of `from` and `to` in history queries.
const HISTORY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date range and paging for history queries.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use ig_rest::api::HistoryQuery;
///
/// let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let query = HistoryQuery::since(from)
///     .with_max_span_seconds(86_400)
///     .with_page_size(100);
/// assert_eq!(query.page_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Start of the range
    pub from: NaiveDateTime,
    /// End of the range
    pub to: NaiveDateTime,
    /// Limits the range to this many seconds before `to`
    pub max_span_seconds: Option<u64>,
    /// Records per page
    pub page_size: u32,
}

impl HistoryQuery {
    /// Query an explicit range.
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self {
            from,
            to,
            max_span_seconds: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Query from `from` up to now (UTC).
    pub fn since(from: NaiveDateTime) -> Self {
        Self::new(from, Utc::now().naive_utc())
    }

    /// Set the maximum span.
    pub fn with_max_span_seconds(mut self, seconds: u64) -> Self {
        self.max_span_seconds = Some(seconds);
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(Error::InvalidInput(format!(
                "from {} is after to {}",
                self.from, self.to
            )));
        }
        if self.page_size == 0 {
            return Err(Error::InvalidInput("page_size must be positive".to_string()));
        }
        Ok(())
    }

    fn params(&self, transaction_type: Option<TransactionType>) -> HistoryParams {
        HistoryParams {
            transaction_type,
            from: self.from.format(HISTORY_DATE_FORMAT).to_string(),
            to: self.to.format(HISTORY_DATE_FORMAT).to_string(),
            max_span_seconds: self.max_span_seconds,
            page_size: self.page_size,
        }
    }
}

/// History query for transactions, filtered by type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHistoryQuery {
    /// Range and paging
    pub range: HistoryQuery,
    /// Transaction filter, `ALL` by default
    pub transaction_type: TransactionType,
}

impl TransactionHistoryQuery {
    /// All transaction types in `range`.
    pub fn new(range: HistoryQuery) -> Self {
        Self {
            range,
            transaction_type: TransactionType::default(),
        }
    }

    /// Restrict to one transaction type.
    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }
}

impl From<HistoryQuery> for TransactionHistoryQuery {
    fn from(range: HistoryQuery) -> Self {
        Self::new(range)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    transaction_type: Option<TransactionType>,
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_span_seconds: Option<u64>,
    page_size: u32,
}

/// Service for account-related operations.
///
/// # Example
///
/// ```no_run
/// use chrono::{Duration, Utc};
/// use ig_rest::api::HistoryQuery;
///
/// # async fn example(client: ig_rest::IgClient) -> ig_rest::Result<()> {
/// let accounts = client.accounts().list().await?;
/// println!("balances: {:?}", accounts.column("balance"));
///
/// let week_ago = (Utc::now() - Duration::days(7)).naive_utc();
/// let activity = client
///     .accounts()
///     .activity_history(&HistoryQuery::since(week_ago))
///     .await?;
/// println!("{} activities", activity.len());
/// # Ok(())
/// # }
/// ```
pub struct AccountsService {
    inner: Arc<ClientInner>,
}

impl AccountsService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// List the accounts of the logged-in client.
    ///
    /// Balance fields are flattened and renamed to `balance`, `deposit`,
    /// `profitLoss` and `availableBalance`.
    pub async fn list(&self) -> Result<Table> {
        #[derive(serde::Deserialize)]
        struct Response {
            #[serde(default)]
            accounts: Vec<Value>,
        }

        let response: Response = self.inner.get("/accounts", ApiVersion::V1).await?;
        let mut table = Table::normalize(&response.accounts)?;
        table.rename_columns(ACCOUNT_RENAMES);
        Ok(table)
    }

    /// Get the account preferences.
    pub async fn preferences(&self) -> Result<AccountPreferences> {
        self.inner
            .get("/accounts/preferences", ApiVersion::V1)
            .await
    }

    /// Enable or disable trailing stops.
    pub async fn update_preferences(&self, trailing_stops_enabled: bool) -> Result<StatusResponse> {
        self.inner
            .put(
                "/accounts/preferences",
                ApiVersion::V1,
                &AccountPreferences {
                    trailing_stops_enabled,
                },
            )
            .await
    }

    /// All account activity in the query range, across every page.
    pub async fn activity_history(&self, query: &HistoryQuery) -> Result<Table> {
        query.validate()?;
        let records = fetch_all_pages(
            &self.inner,
            "/history/activity",
            ApiVersion::V2,
            "activities",
            &query.params(None),
        )
        .await?;
        Table::from_records(&records)
    }

    /// All transactions in the query range, across every page.
    pub async fn transaction_history(
        &self,
        query: impl Into<TransactionHistoryQuery>,
    ) -> Result<Table> {
        let query = query.into();
        query.range.validate()?;
        let records = fetch_all_pages(
            &self.inner,
            "/history/transactions",
            ApiVersion::V2,
            "transactions",
            &query.range.params(Some(query.transaction_type)),
        )
        .await?;
        Table::from_records(&records)
    }
}
