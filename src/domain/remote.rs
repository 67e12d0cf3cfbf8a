use crate::domain::charge::{ChargeMethod, Currency};
use crate::domain::plan::{RepeatUnit, StatusAfterRetry};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier issued by the gateway on first successful creation of a
/// resource. Its presence is the local proxy for "this record exists remotely".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses the gateway's RFC 3339 creation timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Parses a plain `YYYY-MM-DD` date as used for trial end dates.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressPayload {
    pub line1: String,
    #[serde(default)]
    pub line2: String,
    #[serde(default)]
    pub line3: String,
    pub city: String,
    pub state: String,
    pub postal_code: u32,
    pub country_code: String,
}

/// Customer fields sent on both create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: AddressPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCustomer {
    pub id: RemoteId,
    pub name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<AddressPayload>,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCard {
    pub id: RemoteId,
    #[serde(rename = "type")]
    pub card_type: String,
    pub holder_name: String,
    pub card_number: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlan {
    pub name: String,
    /// Decimal amount serialized as a string, never a float.
    pub amount: String,
    pub status_after_retry: StatusAfterRetry,
    pub retry_times: u32,
    pub repeat_unit: RepeatUnit,
    pub trial_days: u32,
    pub repeat_every: u32,
}

/// The only plan fields the gateway allows to change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdate {
    pub name: String,
    pub trial_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlan {
    pub id: RemoteId,
    pub name: String,
    pub amount: String,
    pub status_after_retry: StatusAfterRetry,
    pub retry_times: u32,
    pub repeat_unit: RepeatUnit,
    pub trial_days: u32,
    pub repeat_every: u32,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub plan_id: RemoteId,
    pub card_id: RemoteId,
    pub trial_end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionUpdate {
    pub card_id: RemoteId,
    pub trial_end_date: Option<String>,
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSubscription {
    pub id: RemoteId,
    pub plan_id: RemoteId,
    pub card_id: Option<RemoteId>,
    pub trial_end_date: Option<String>,
    pub cancel_at_period_end: bool,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCharge {
    pub source_id: RemoteId,
    pub method: ChargeMethod,
    pub amount: String,
    pub currency: Currency,
    pub description: String,
    pub device_session_id: Option<String>,
    pub capture: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCharge {
    pub id: RemoteId,
    pub description: String,
    pub amount: String,
    pub method: ChargeMethod,
    pub currency: Currency,
    pub status: Option<String>,
    pub refund: Option<RemoteRefund>,
    pub creation_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRefund {
    pub id: RemoteId,
    pub amount: String,
    pub description: Option<String>,
    pub creation_date: String,
}
