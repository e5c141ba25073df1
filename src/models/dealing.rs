//! Dealing models: position and working-order requests, and the
//! submit-then-confirm result types.
//!
//! Every write on the dealing endpoints is answered with a
//! [`SubmittedDeal`] carrying only a deal reference. The actual outcome is
//! a [`DealConfirmation`] looked up separately and classified as a
//! [`DealOutcome`].

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::*;
use super::primitives::{DealId, DealReference, Epic};
use crate::table::Table;
use crate::{Error, Result};

mod good_till_date {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    const FORMAT: &str = "%Y/%m/%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

/// A request to open an OTC position.
///
/// Use [`OpenPositionRequestBuilder`] to construct one.
///
/// ```
/// use ig_rest::models::{Direction, OpenPositionRequest, OrderType};
/// use rust_decimal_macros::dec;
///
/// let request = OpenPositionRequest::builder()
///     .epic("CS.D.GBPUSD.TODAY.IP")
///     .expiry("DFB")
///     .direction(Direction::Buy)
///     .size(dec!(1))
///     .order_type(OrderType::Market)
///     .currency_code("GBP")
///     .build()
///     .unwrap();
/// assert!(!request.force_open);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPositionRequest {
    /// Currency of the deal
    pub currency_code: String,
    /// Client-chosen deal reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_reference: Option<DealReference>,
    /// Buy or sell
    pub direction: Direction,
    /// Instrument to deal
    pub epic: Epic,
    /// Instrument expiry (`"DFB"`, `"-"`, or a date code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Open a new position instead of netting against an opposite one
    pub force_open: bool,
    /// Whether the stop is guaranteed
    pub guaranteed_stop: bool,
    /// Deal level (required for LIMIT and QUOTE orders)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Decimal>,
    /// Limit distance from the deal level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<Decimal>,
    /// Absolute limit level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    /// Order type
    pub order_type: OrderType,
    /// Quote id (QUOTE orders only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    /// Deal size
    pub size: Decimal,
    /// Stop distance from the deal level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<Decimal>,
    /// Absolute stop level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
    /// Time in force
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    /// Whether the stop trails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<bool>,
    /// Trailing stop increment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop_increment: Option<Decimal>,
}

impl OpenPositionRequest {
    /// Start building a request.
    pub fn builder() -> OpenPositionRequestBuilder {
        OpenPositionRequestBuilder::default()
    }
}

/// Builder for [`OpenPositionRequest`] with validation.
#[derive(Debug, Default, Clone)]
pub struct OpenPositionRequestBuilder {
    currency_code: Option<String>,
    deal_reference: Option<DealReference>,
    direction: Option<Direction>,
    epic: Option<Epic>,
    expiry: Option<String>,
    force_open: bool,
    guaranteed_stop: bool,
    level: Option<Decimal>,
    limit_distance: Option<Decimal>,
    limit_level: Option<Decimal>,
    order_type: Option<OrderType>,
    quote_id: Option<String>,
    size: Option<Decimal>,
    stop_distance: Option<Decimal>,
    stop_level: Option<Decimal>,
    time_in_force: Option<TimeInForce>,
    trailing_stop: Option<bool>,
    trailing_stop_increment: Option<Decimal>,
}

impl OpenPositionRequestBuilder {
    /// Set the currency code.
    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }

    /// Set a client deal reference.
    pub fn deal_reference(mut self, reference: impl Into<DealReference>) -> Self {
        self.deal_reference = Some(reference.into());
        self
    }

    /// Set the direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Set the instrument.
    pub fn epic(mut self, epic: impl Into<Epic>) -> Self {
        self.epic = Some(epic.into());
        self
    }

    /// Set the instrument expiry.
    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Open a new position instead of netting.
    pub fn force_open(mut self, force_open: bool) -> Self {
        self.force_open = force_open;
        self
    }

    /// Request a guaranteed stop.
    pub fn guaranteed_stop(mut self, guaranteed: bool) -> Self {
        self.guaranteed_stop = guaranteed;
        self
    }

    /// Set the deal level.
    pub fn level(mut self, level: Decimal) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the limit as a distance.
    pub fn limit_distance(mut self, distance: Decimal) -> Self {
        self.limit_distance = Some(distance);
        self
    }

    /// Set the limit as an absolute level.
    pub fn limit_level(mut self, level: Decimal) -> Self {
        self.limit_level = Some(level);
        self
    }

    /// Set the order type.
    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    /// Set the quote id for QUOTE orders.
    pub fn quote_id(mut self, quote_id: impl Into<String>) -> Self {
        self.quote_id = Some(quote_id.into());
        self
    }

    /// Set the deal size.
    pub fn size(mut self, size: Decimal) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the stop as a distance.
    pub fn stop_distance(mut self, distance: Decimal) -> Self {
        self.stop_distance = Some(distance);
        self
    }

    /// Set the stop as an absolute level.
    pub fn stop_level(mut self, level: Decimal) -> Self {
        self.stop_level = Some(level);
        self
    }

    /// Set the time in force.
    pub fn time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Use a trailing stop with the given increment.
    pub fn trailing_stop(mut self, increment: Decimal) -> Self {
        self.trailing_stop = Some(true);
        self.trailing_stop_increment = Some(increment);
        self
    }

    /// Build the request, validating all fields.
    pub fn build(self) -> Result<OpenPositionRequest> {
        let currency_code = required(self.currency_code, "currency_code")?;
        let direction = required(self.direction, "direction")?;
        let epic = required(self.epic, "epic")?;
        let order_type = required(self.order_type, "order_type")?;
        let size = required(self.size, "size")?;

        validate_size(size)?;
        validate_order_levels(order_type, self.level, self.quote_id.as_deref())?;
        exclusive(self.limit_distance, self.limit_level, "limit_distance", "limit_level")?;
        exclusive(self.stop_distance, self.stop_level, "stop_distance", "stop_level")?;

        Ok(OpenPositionRequest {
            currency_code,
            deal_reference: self.deal_reference,
            direction,
            epic,
            expiry: self.expiry,
            force_open: self.force_open,
            guaranteed_stop: self.guaranteed_stop,
            level: self.level,
            limit_distance: self.limit_distance,
            limit_level: self.limit_level,
            order_type,
            quote_id: self.quote_id,
            size,
            stop_distance: self.stop_distance,
            stop_level: self.stop_level,
            time_in_force: self.time_in_force,
            trailing_stop: self.trailing_stop,
            trailing_stop_increment: self.trailing_stop_increment,
        })
    }
}

/// A request to close (fully or partially) an OTC position.
///
/// Identify the position either by deal id or by epic and expiry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePositionRequest {
    /// Position to close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<DealId>,
    /// Closing direction (opposite of the position's direction)
    pub direction: Direction,
    /// Instrument, when closing by epic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic: Option<Epic>,
    /// Instrument expiry, when closing by epic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    /// Closing level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<Decimal>,
    /// Order type
    pub order_type: OrderType,
    /// Quote id (QUOTE orders only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    /// Size to close
    pub size: Decimal,
    /// Time in force
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
}

impl ClosePositionRequest {
    /// Close a position identified by its deal id.
    pub fn by_deal_id(
        deal_id: impl Into<DealId>,
        direction: Direction,
        size: Decimal,
        order_type: OrderType,
    ) -> Self {
        Self {
            deal_id: Some(deal_id.into()),
            direction,
            epic: None,
            expiry: None,
            level: None,
            order_type,
            quote_id: None,
            size,
            time_in_force: None,
        }
    }

    /// Close the position held on an instrument.
    pub fn by_epic(
        epic: impl Into<Epic>,
        expiry: impl Into<String>,
        direction: Direction,
        size: Decimal,
        order_type: OrderType,
    ) -> Self {
        Self {
            deal_id: None,
            direction,
            epic: Some(epic.into()),
            expiry: Some(expiry.into()),
            level: None,
            order_type,
            quote_id: None,
            size,
            time_in_force: None,
        }
    }

    /// Set the closing level.
    pub fn with_level(mut self, level: Decimal) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the quote id.
    pub fn with_quote_id(mut self, quote_id: impl Into<String>) -> Self {
        self.quote_id = Some(quote_id.into());
        self
    }

    /// Set the time in force.
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.deal_id.is_none() && self.epic.is_none() {
            return Err(Error::InvalidInput(
                "either deal_id or epic is required to close a position".to_string(),
            ));
        }
        validate_size(self.size)?;
        validate_order_levels(self.order_type, self.level, self.quote_id.as_deref())
    }
}

/// Changes to an open position's stop and limit.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    /// Whether the stop is guaranteed
    pub guaranteed_stop: bool,
    /// New limit level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    /// New stop level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
    /// Whether the stop trails
    pub trailing_stop: bool,
    /// Trailing stop distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop_distance: Option<Decimal>,
    /// Trailing stop increment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop_increment: Option<Decimal>,
}

/// A request to place a working (not yet triggered) order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkingOrderRequest {
    /// Currency of the order
    pub currency_code: String,
    /// Client-chosen deal reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_reference: Option<DealReference>,
    /// Buy or sell
    pub direction: Direction,
    /// Instrument
    pub epic: Epic,
    /// Instrument expiry
    pub expiry: String,
    /// Open a new position instead of netting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_open: Option<bool>,
    /// Expiry time for GOOD_TILL_DATE orders
    #[serde(
        serialize_with = "good_till_date::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub good_till_date: Option<NaiveDateTime>,
    /// Whether the stop is guaranteed
    pub guaranteed_stop: bool,
    /// Trigger level
    pub level: Decimal,
    /// Limit distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<Decimal>,
    /// Limit level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    /// Order size
    pub size: Decimal,
    /// Stop distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<Decimal>,
    /// Stop level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
    /// Time in force
    pub time_in_force: WorkingOrderTimeInForce,
    /// Limit or stop entry
    #[serde(rename = "type")]
    pub order_type: WorkingOrderType,
}

impl CreateWorkingOrderRequest {
    /// Start building a request.
    pub fn builder() -> CreateWorkingOrderRequestBuilder {
        CreateWorkingOrderRequestBuilder::default()
    }
}

/// Builder for [`CreateWorkingOrderRequest`] with validation.
#[derive(Debug, Default, Clone)]
pub struct CreateWorkingOrderRequestBuilder {
    currency_code: Option<String>,
    deal_reference: Option<DealReference>,
    direction: Option<Direction>,
    epic: Option<Epic>,
    expiry: Option<String>,
    force_open: Option<bool>,
    good_till_date: Option<NaiveDateTime>,
    guaranteed_stop: bool,
    level: Option<Decimal>,
    limit_distance: Option<Decimal>,
    limit_level: Option<Decimal>,
    size: Option<Decimal>,
    stop_distance: Option<Decimal>,
    stop_level: Option<Decimal>,
    time_in_force: Option<WorkingOrderTimeInForce>,
    order_type: Option<WorkingOrderType>,
}

impl CreateWorkingOrderRequestBuilder {
    /// Set the currency code.
    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }

    /// Set a client deal reference.
    pub fn deal_reference(mut self, reference: impl Into<DealReference>) -> Self {
        self.deal_reference = Some(reference.into());
        self
    }

    /// Set the direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Set the instrument.
    pub fn epic(mut self, epic: impl Into<Epic>) -> Self {
        self.epic = Some(epic.into());
        self
    }

    /// Set the instrument expiry.
    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Open a new position instead of netting when triggered.
    pub fn force_open(mut self, force_open: bool) -> Self {
        self.force_open = Some(force_open);
        self
    }

    /// Keep the order until the given time.
    pub fn good_till_date(mut self, until: NaiveDateTime) -> Self {
        self.good_till_date = Some(until);
        self.time_in_force = Some(WorkingOrderTimeInForce::GoodTillDate);
        self
    }

    /// Request a guaranteed stop.
    pub fn guaranteed_stop(mut self, guaranteed: bool) -> Self {
        self.guaranteed_stop = guaranteed;
        self
    }

    /// Set the trigger level.
    pub fn level(mut self, level: Decimal) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the limit as a distance.
    pub fn limit_distance(mut self, distance: Decimal) -> Self {
        self.limit_distance = Some(distance);
        self
    }

    /// Set the limit as an absolute level.
    pub fn limit_level(mut self, level: Decimal) -> Self {
        self.limit_level = Some(level);
        self
    }

    /// Set the order size.
    pub fn size(mut self, size: Decimal) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the stop as a distance.
    pub fn stop_distance(mut self, distance: Decimal) -> Self {
        self.stop_distance = Some(distance);
        self
    }

    /// Set the stop as an absolute level.
    pub fn stop_level(mut self, level: Decimal) -> Self {
        self.stop_level = Some(level);
        self
    }

    /// Set the time in force.
    pub fn time_in_force(mut self, tif: WorkingOrderTimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Set the entry type.
    pub fn order_type(mut self, order_type: WorkingOrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    /// Build the request, validating all fields.
    pub fn build(self) -> Result<CreateWorkingOrderRequest> {
        let time_in_force = self
            .time_in_force
            .unwrap_or(WorkingOrderTimeInForce::GoodTillCancelled);
        if time_in_force == WorkingOrderTimeInForce::GoodTillDate && self.good_till_date.is_none() {
            return Err(Error::InvalidInput(
                "good_till_date is required for GOOD_TILL_DATE orders".to_string(),
            ));
        }

        let size = required(self.size, "size")?;
        validate_size(size)?;
        exclusive(self.limit_distance, self.limit_level, "limit_distance", "limit_level")?;
        exclusive(self.stop_distance, self.stop_level, "stop_distance", "stop_level")?;

        Ok(CreateWorkingOrderRequest {
            currency_code: required(self.currency_code, "currency_code")?,
            deal_reference: self.deal_reference,
            direction: required(self.direction, "direction")?,
            epic: required(self.epic, "epic")?,
            expiry: required(self.expiry, "expiry")?,
            force_open: self.force_open,
            good_till_date: self.good_till_date,
            guaranteed_stop: self.guaranteed_stop,
            level: required(self.level, "level")?,
            limit_distance: self.limit_distance,
            limit_level: self.limit_level,
            size,
            stop_distance: self.stop_distance,
            stop_level: self.stop_level,
            time_in_force,
            order_type: required(self.order_type, "order_type")?,
        })
    }
}

/// Changes to a working order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkingOrderRequest {
    /// Expiry time for GOOD_TILL_DATE orders
    #[serde(
        serialize_with = "good_till_date::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub good_till_date: Option<NaiveDateTime>,
    /// Whether the stop is guaranteed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guaranteed_stop: Option<bool>,
    /// New trigger level
    pub level: Decimal,
    /// Limit distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<Decimal>,
    /// Limit level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    /// Stop distance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<Decimal>,
    /// Stop level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
    /// Time in force
    pub time_in_force: WorkingOrderTimeInForce,
    /// Limit or stop entry
    #[serde(rename = "type")]
    pub order_type: WorkingOrderType,
}

impl UpdateWorkingOrderRequest {
    /// Move a good-till-cancelled order to a new level.
    pub fn new(level: Decimal, order_type: WorkingOrderType) -> Self {
        Self {
            good_till_date: None,
            guaranteed_stop: None,
            level,
            limit_distance: None,
            limit_level: None,
            stop_distance: None,
            stop_level: None,
            time_in_force: WorkingOrderTimeInForce::GoodTillCancelled,
            order_type,
        }
    }

    /// Keep the order until the given time.
    pub fn with_good_till_date(mut self, until: NaiveDateTime) -> Self {
        self.good_till_date = Some(until);
        self.time_in_force = WorkingOrderTimeInForce::GoodTillDate;
        self
    }

    /// Set the stop level.
    pub fn with_stop_level(mut self, level: Decimal) -> Self {
        self.stop_level = Some(level);
        self
    }

    /// Set the limit level.
    pub fn with_limit_level(mut self, level: Decimal) -> Self {
        self.limit_level = Some(level);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.time_in_force == WorkingOrderTimeInForce::GoodTillDate
            && self.good_till_date.is_none()
        {
            return Err(Error::InvalidInput(
                "good_till_date is required for GOOD_TILL_DATE orders".to_string(),
            ));
        }
        exclusive(self.limit_distance, self.limit_level, "limit_distance", "limit_level")?;
        exclusive(self.stop_distance, self.stop_level, "stop_distance", "stop_level")
    }
}

/// A request to open a sprint market position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintMarketPositionRequest {
    /// Client-chosen deal reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_reference: Option<DealReference>,
    /// Buy or sell
    pub direction: Direction,
    /// Sprint market instrument
    pub epic: Epic,
    /// How long the sprint runs
    pub expiry_period: SprintMarketExpiryPeriod,
    /// Stake
    pub size: Decimal,
}

impl SprintMarketPositionRequest {
    /// Create a request without a client reference.
    pub fn new(
        epic: impl Into<Epic>,
        direction: Direction,
        expiry_period: SprintMarketExpiryPeriod,
        size: Decimal,
    ) -> Self {
        Self {
            deal_reference: None,
            direction,
            epic: epic.into(),
            expiry_period,
            size,
        }
    }
}

/// A write that the API accepted for processing but has not confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedDeal {
    /// Reference to exchange for the confirmation
    pub deal_reference: DealReference,
}

/// Deal affected by a confirmed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedDeal {
    /// Deal id
    pub deal_id: DealId,
    /// What happened to it (`OPENED`, `FULLY_CLOSED`, ...)
    #[serde(default)]
    pub status: Option<String>,
}

/// Resolved outcome of a submitted action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealConfirmation {
    /// Reference the confirmation was looked up with
    pub deal_reference: DealReference,
    /// Deal id of the resulting position or order
    #[serde(default)]
    pub deal_id: Option<DealId>,
    /// Accepted or rejected
    pub deal_status: DealStatus,
    /// Position status (`OPEN`, `CLOSED`, `DELETED`, ...)
    #[serde(default)]
    pub status: Option<String>,
    /// Rejection reason or `SUCCESS`
    #[serde(default)]
    pub reason: Option<String>,
    /// Instrument
    #[serde(default)]
    pub epic: Option<Epic>,
    /// Instrument expiry
    #[serde(default)]
    pub expiry: Option<String>,
    /// Direction
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Fill level
    #[serde(default)]
    pub level: Option<Decimal>,
    /// Size
    #[serde(default)]
    pub size: Option<Decimal>,
    /// Stop level
    #[serde(default)]
    pub stop_level: Option<Decimal>,
    /// Stop distance
    #[serde(default)]
    pub stop_distance: Option<Decimal>,
    /// Limit level
    #[serde(default)]
    pub limit_level: Option<Decimal>,
    /// Limit distance
    #[serde(default)]
    pub limit_distance: Option<Decimal>,
    /// Whether the stop is guaranteed
    #[serde(default)]
    pub guaranteed_stop: Option<bool>,
    /// Whether the stop trails
    #[serde(default)]
    pub trailing_stop: Option<bool>,
    /// Realised profit, for closing deals
    #[serde(default)]
    pub profit: Option<Decimal>,
    /// Currency of `profit`
    #[serde(default)]
    pub profit_currency: Option<String>,
    /// Confirmation time as reported by IG
    #[serde(default)]
    pub date: Option<String>,
    /// Other deals touched by this action
    #[serde(default, deserialize_with = "deserialize_null_as_empty")]
    pub affected_deals: Vec<AffectedDeal>,
}

/// IG sends `null` rather than `[]` when no other deal was touched.
fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl DealConfirmation {
    /// The confirmation as a one-row table.
    pub fn to_table(&self) -> Result<Table> {
        Table::normalize(&[serde_json::to_value(self)?])
    }
}

/// Final state of a submitted deal.
#[derive(Debug, Clone)]
pub enum DealOutcome {
    /// IG accepted the deal.
    Accepted(DealConfirmation),
    /// IG rejected the deal; `reason` says why.
    Rejected(DealConfirmation),
}

impl DealOutcome {
    /// Classify a confirmation. Anything other than `ACCEPTED` is a rejection.
    pub fn from_confirmation(confirmation: DealConfirmation) -> Self {
        match confirmation.deal_status {
            DealStatus::Accepted => DealOutcome::Accepted(confirmation),
            _ => DealOutcome::Rejected(confirmation),
        }
    }

    /// Returns `true` if the deal was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, DealOutcome::Accepted(_))
    }

    /// The underlying confirmation.
    pub fn confirmation(&self) -> &DealConfirmation {
        match self {
            DealOutcome::Accepted(c) | DealOutcome::Rejected(c) => c,
        }
    }

    /// Deal id of the resulting position or order, if any.
    pub fn deal_id(&self) -> Option<&DealId> {
        self.confirmation().deal_id.as_ref()
    }

    /// Convert a rejection into an error.
    pub fn into_accepted(self) -> Result<DealConfirmation> {
        match self {
            DealOutcome::Accepted(c) => Ok(c),
            DealOutcome::Rejected(c) => Err(Error::DealRejected {
                reference: c.deal_reference.to_string(),
                reason: c.reason.unwrap_or_else(|| "UNKNOWN".to_string()),
            }),
        }
    }
}

/// Open positions split into market and position columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionTables {
    /// One row per position: the market the position is on
    pub markets: Table,
    /// One row per position: size, level, deal id, ...
    pub positions: Table,
}

/// Working orders split into market and order columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingOrderTables {
    /// One row per order: the market the order is on
    pub market_data: Table,
    /// One row per order: level, size, type, ...
    pub working_orders: Table,
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::InvalidInput(format!("{name} is required")))
}

fn validate_size(size: Decimal) -> Result<()> {
    if size <= Decimal::ZERO {
        return Err(Error::InvalidInput(format!("size must be positive, got {size}")));
    }
    Ok(())
}

fn validate_order_levels(order_type: OrderType, level: Option<Decimal>, quote_id: Option<&str>) -> Result<()> {
    match order_type {
        OrderType::Limit if level.is_none() => Err(Error::InvalidInput(
            "level is required for LIMIT orders".to_string(),
        )),
        OrderType::Quote if level.is_none() || quote_id.is_none() => Err(Error::InvalidInput(
            "level and quote_id are required for QUOTE orders".to_string(),
        )),
        _ => Ok(()),
    }
}

fn exclusive(a: Option<Decimal>, b: Option<Decimal>, a_name: &str, b_name: &str) -> Result<()> {
    if a.is_some() && b.is_some() {
        return Err(Error::InvalidInput(format!(
            "{a_name} and {b_name} cannot both be set"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn market_buy() -> OpenPositionRequestBuilder {
        OpenPositionRequest::builder()
            .epic("CS.D.GBPUSD.TODAY.IP")
            .expiry("DFB")
            .direction(Direction::Buy)
            .size(dec!(2))
            .order_type(OrderType::Market)
            .currency_code("GBP")
    }

    #[test]
    fn test_open_position_serializes_camel_case_and_skips_absent() {
        let request = market_buy().stop_distance(dec!(20)).build().unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["currencyCode"], "GBP");
        assert_eq!(value["orderType"], "MARKET");
        assert_eq!(value["stopDistance"], json!(20.0));
        assert_eq!(value["forceOpen"], json!(false));
        assert!(value.get("limitLevel").is_none());
        assert!(value.get("dealReference").is_none());
    }

    #[test]
    fn test_open_position_requires_fields() {
        let err = OpenPositionRequest::builder().build().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_limit_order_requires_level() {
        let err = market_buy().order_type(OrderType::Limit).build().unwrap_err();
        assert!(err.to_string().contains("LIMIT"));
        assert!(market_buy()
            .order_type(OrderType::Limit)
            .level(dec!(1.25))
            .build()
            .is_ok());
    }

    #[test]
    fn test_stop_distance_and_level_exclusive() {
        let result = market_buy()
            .stop_distance(dec!(10))
            .stop_level(dec!(1.2))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_non_positive_size_rejected() {
        assert!(market_buy().size(dec!(0)).build().is_err());
    }

    #[test]
    fn test_close_position_validation() {
        let ok = ClosePositionRequest::by_deal_id("DIAAAA", Direction::Sell, dec!(1), OrderType::Market);
        assert!(ok.validate().is_ok());

        let mut missing = ok.clone();
        missing.deal_id = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_working_order_good_till_date_format() {
        let until = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(17, 30, 0)
            .unwrap();
        let request = CreateWorkingOrderRequest::builder()
            .epic("IX.D.FTSE.DAILY.IP")
            .expiry("DFB")
            .direction(Direction::Sell)
            .size(dec!(1))
            .level(dec!(7600))
            .order_type(WorkingOrderType::Limit)
            .currency_code("GBP")
            .good_till_date(until)
            .build()
            .unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["goodTillDate"], "2024/03/01 17:30:00");
        assert_eq!(value["timeInForce"], "GOOD_TILL_DATE");
        assert_eq!(value["type"], "LIMIT");
    }

    #[test]
    fn test_working_order_gtd_without_date_rejected() {
        let result = CreateWorkingOrderRequest::builder()
            .epic("IX.D.FTSE.DAILY.IP")
            .expiry("DFB")
            .direction(Direction::Sell)
            .size(dec!(1))
            .level(dec!(7600))
            .order_type(WorkingOrderType::Stop)
            .currency_code("GBP")
            .time_in_force(WorkingOrderTimeInForce::GoodTillDate)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_deal_outcome_classification() {
        let confirmation: DealConfirmation = serde_json::from_value(json!({
            "dealReference": "REF1",
            "dealId": "DIAAAA",
            "dealStatus": "REJECTED",
            "reason": "INSUFFICIENT_FUNDS",
            "affectedDeals": []
        }))
        .unwrap();

        let outcome = DealOutcome::from_confirmation(confirmation);
        assert!(!outcome.is_accepted());
        assert_eq!(outcome.deal_id().map(DealId::as_str), Some("DIAAAA"));

        let err = outcome.into_accepted().unwrap_err();
        assert!(err.to_string().contains("INSUFFICIENT_FUNDS"));
    }

    #[test]
    fn test_confirmation_with_null_affected_deals() {
        let confirmation: DealConfirmation = serde_json::from_value(json!({
            "dealReference": "REF2",
            "dealStatus": "ACCEPTED",
            "affectedDeals": null
        }))
        .unwrap();

        assert!(confirmation.affected_deals.is_empty());
        assert_eq!(confirmation.deal_status, DealStatus::Accepted);
    }

    #[test]
    fn test_confirmation_to_table() {
        let confirmation: DealConfirmation = serde_json::from_value(json!({
            "dealReference": "REF1",
            "dealStatus": "ACCEPTED",
            "level": 1.2345
        }))
        .unwrap();

        let table = confirmation.to_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "dealStatus"), Some(&json!("ACCEPTED")));
    }
}
