//! Dealing service for positions, working orders and confirmations.
//!
//! Every write returns a deal reference only. The service then looks the
//! reference up once on `/confirms` and reports the result as a
//! [`DealOutcome`].

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::client::{path_segment, ClientInner};
use crate::models::{
    ClosePositionRequest, CreateWorkingOrderRequest, DealConfirmation, DealId, DealOutcome,
    DealReference, OpenPositionRequest, PositionTables, SprintMarketPositionRequest,
    SubmittedDeal, UpdatePositionRequest, UpdateWorkingOrderRequest, WorkingOrderTables,
};
use crate::table::Table;
use crate::{ApiVersion, Error, Result};

/// Service for dealing operations.
///
/// # Example
///
/// ```no_run
/// use ig_rest::models::{Direction, OpenPositionRequest, OrderType};
/// use rust_decimal_macros::dec;
///
/// # async fn example(client: ig_rest::IgClient) -> ig_rest::Result<()> {
/// let request = OpenPositionRequest::builder()
///     .epic("CS.D.GBPUSD.TODAY.IP")
///     .direction(Direction::Buy)
///     .size(dec!(1))
///     .order_type(OrderType::Market)
///     .currency_code("GBP")
///     .expiry("DFB")
///     .build()?;
///
/// let outcome = client.dealing().open_position(&request).await?;
/// if outcome.is_accepted() {
///     println!("Opened {:?}", outcome.deal_id());
/// } else {
///     println!("Rejected: {:?}", outcome.confirmation().reason);
/// }
/// # Ok(())
/// # }
/// ```
pub struct DealingService {
    inner: Arc<ClientInner>,
}

impl DealingService {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Open an OTC position.
    pub async fn open_position(&self, request: &OpenPositionRequest) -> Result<DealOutcome> {
        let submitted: SubmittedDeal = self
            .inner
            .post("/positions/otc", ApiVersion::V2, request)
            .await?;
        self.confirm(submitted).await
    }

    /// Close, fully or partially, an OTC position.
    pub async fn close_position(&self, request: &ClosePositionRequest) -> Result<DealOutcome> {
        request.validate()?;
        let submitted: SubmittedDeal = self
            .inner
            .delete("/positions/otc", ApiVersion::V1, Some(request))
            .await?;
        self.confirm(submitted).await
    }

    /// Change the stop and limit of an open position.
    pub async fn update_position(
        &self,
        deal_id: &DealId,
        request: &UpdatePositionRequest,
    ) -> Result<DealOutcome> {
        let submitted: SubmittedDeal = self
            .inner
            .put(
                &format!("/positions/otc/{}", path_segment(deal_id.as_str())),
                ApiVersion::V2,
                request,
            )
            .await?;
        self.confirm(submitted).await
    }

    /// Open positions, split into market and position tables.
    pub async fn positions(&self) -> Result<PositionTables> {
        let data: Value = self.inner.get("/positions", ApiVersion::V2).await?;
        let (markets, positions) = split_pairs(&data, "positions", "market", "position")?;
        Ok(PositionTables { markets, positions })
    }

    /// Working orders, split into market and order tables.
    pub async fn working_orders(&self) -> Result<WorkingOrderTables> {
        let data: Value = self.inner.get("/workingorders", ApiVersion::V2).await?;
        let (market_data, working_orders) =
            split_pairs(&data, "workingOrders", "marketData", "workingOrderData")?;
        Ok(WorkingOrderTables {
            market_data,
            working_orders,
        })
    }

    /// Place a working order.
    pub async fn create_working_order(
        &self,
        request: &CreateWorkingOrderRequest,
    ) -> Result<DealOutcome> {
        let submitted: SubmittedDeal = self
            .inner
            .post("/workingorders/otc", ApiVersion::V2, request)
            .await?;
        self.confirm(submitted).await
    }

    /// Change a working order.
    pub async fn update_working_order(
        &self,
        deal_id: &DealId,
        request: &UpdateWorkingOrderRequest,
    ) -> Result<DealOutcome> {
        request.validate()?;
        let submitted: SubmittedDeal = self
            .inner
            .put(
                &format!("/workingorders/otc/{}", path_segment(deal_id.as_str())),
                ApiVersion::V2,
                request,
            )
            .await?;
        self.confirm(submitted).await
    }

    /// Cancel a working order.
    pub async fn delete_working_order(&self, deal_id: &DealId) -> Result<DealOutcome> {
        let submitted: SubmittedDeal = self
            .inner
            .delete::<_, ()>(
                &format!("/workingorders/otc/{}", path_segment(deal_id.as_str())),
                ApiVersion::V2,
                None,
            )
            .await?;
        self.confirm(submitted).await
    }

    /// Open a sprint market position.
    pub async fn open_sprint_market_position(
        &self,
        request: &SprintMarketPositionRequest,
    ) -> Result<DealOutcome> {
        if request.size <= Decimal::ZERO {
            return Err(Error::InvalidInput(format!(
                "size must be positive, got {}",
                request.size
            )));
        }

        let submitted: SubmittedDeal = self
            .inner
            .post("/positions/sprintmarkets", ApiVersion::V1, request)
            .await?;
        self.confirm(submitted).await
    }

    /// Open sprint market positions.
    pub async fn sprint_market_positions(&self) -> Result<Table> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            #[serde(default)]
            sprint_market_positions: Vec<Value>,
        }

        let response: Response = self
            .inner
            .get("/positions/sprintmarkets", ApiVersion::V2)
            .await?;
        Table::normalize(&response.sprint_market_positions)
    }

    /// Look up the confirmation of a deal reference.
    pub async fn deal_confirmation(&self, reference: &DealReference) -> Result<DealConfirmation> {
        let endpoint = format!("/confirms/{}", path_segment(reference.as_str()));
        self.inner.get(&endpoint, ApiVersion::V1).await
    }

    async fn confirm(&self, submitted: SubmittedDeal) -> Result<DealOutcome> {
        let confirmation = self.deal_confirmation(&submitted.deal_reference).await?;
        let outcome = DealOutcome::from_confirmation(confirmation);

        match &outcome {
            DealOutcome::Accepted(c) => tracing::info!(
                reference = %submitted.deal_reference,
                deal_id = ?c.deal_id,
                "Deal accepted"
            ),
            DealOutcome::Rejected(c) => tracing::warn!(
                reference = %submitted.deal_reference,
                reason = ?c.reason,
                "Deal rejected"
            ),
        }

        Ok(outcome)
    }
}

/// Split a list of `{left, right}` pairs under `key` into two tables
/// with one row per pair.
fn split_pairs(data: &Value, key: &str, left: &str, right: &str) -> Result<(Table, Table)> {
    let items = match data.get(key) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Null) | None => &[],
        Some(other) => {
            return Err(Error::UnexpectedResponse(format!(
                "`{key}` is not a list: {other}"
            )))
        }
    };

    let mut lefts = Vec::with_capacity(items.len());
    let mut rights = Vec::with_capacity(items.len());
    for item in items {
        lefts.push(pair_half(item, key, left)?);
        rights.push(pair_half(item, key, right)?);
    }

    Ok((Table::normalize(&lefts)?, Table::normalize(&rights)?))
}

fn pair_half(item: &Value, key: &str, half: &str) -> Result<Value> {
    match item.get(half) {
        Some(value @ Value::Object(_)) => Ok(value.clone()),
        _ => Err(Error::UnexpectedResponse(format!(
            "`{key}` entry has no `{half}` object"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_positions() {
        let data = json!({
            "positions": [
                {
                    "market": {"epic": "A", "bid": 1.0},
                    "position": {"dealId": "D1", "size": 2, "direction": "BUY"}
                },
                {
                    "market": {"epic": "B", "bid": 2.0},
                    "position": {"dealId": "D2", "size": 1, "direction": "SELL"}
                }
            ]
        });

        let (markets, positions) = split_pairs(&data, "positions", "market", "position").unwrap();
        assert_eq!(markets.len(), 2);
        assert_eq!(positions.len(), 2);
        assert_eq!(markets.get(1, "epic"), Some(&json!("B")));
        assert_eq!(positions.get(0, "dealId"), Some(&json!("D1")));
    }

    #[test]
    fn test_split_empty_list() {
        let (markets, orders) = split_pairs(
            &json!({"workingOrders": []}),
            "workingOrders",
            "marketData",
            "workingOrderData",
        )
        .unwrap();
        assert!(markets.is_empty());
        assert!(orders.is_empty());
    }

    #[test]
    fn test_split_rejects_malformed_entry() {
        let data = json!({"positions": [{"market": {"epic": "A"}}]});
        let err = split_pairs(&data, "positions", "market", "position").unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }
}
