use crate::domain::card::Card;
use crate::domain::customer::Customer;
use crate::domain::ports::Gateway;
use crate::domain::remote::{NewCharge, RemoteCharge, RemoteId, RemoteRefund, parse_timestamp};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeMethod {
    #[default]
    Card,
    Bank,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "MXN")]
    Mxn,
    #[serde(rename = "USD")]
    Usd,
}

/// A one-time or plan-driven payment. Immutable once created remotely; local
/// deletion is deliberately impossible to preserve the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: u64,
    pub remote_id: Option<RemoteId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub description: String,
    pub amount: Decimal,
    pub method: ChargeMethod,
    pub currency: Currency,
    pub customer_id: u64,
    pub card_id: u64,
    pub plan_id: u64,
    /// Set once a refund succeeds. Dedicated field so it can never shadow the
    /// `refund` operation.
    pub refunded: bool,
    #[serde(skip)]
    fetched: Option<RemoteCharge>,
}

impl Charge {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        customer_id: u64,
        card_id: u64,
        plan_id: u64,
    ) -> Self {
        Self {
            id: 0,
            remote_id: None,
            creation_date: None,
            description: description.into(),
            amount,
            method: ChargeMethod::default(),
            currency: Currency::default(),
            customer_id,
            card_id,
            plan_id,
            refunded: false,
            fetched: None,
        }
    }

    pub fn readonly_fields(persisted: bool) -> &'static [&'static str] {
        if persisted {
            &[
                "remote_id",
                "description",
                "amount",
                "method",
                "customer",
                "card",
                "plan",
                "creation_date",
            ]
        } else {
            &["remote_id", "creation_date"]
        }
    }

    pub fn reset_cache(&mut self) {
        self.fetched = None;
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(SyncError::Validation("charge amount must be positive".into()));
        }
        Ok(())
    }

    fn apply(&mut self, remote: &RemoteCharge) -> Result<()> {
        self.description = remote.description.clone();
        self.amount = Decimal::from_str(&remote.amount)?;
        self.method = remote.method;
        self.currency = remote.currency;
        self.refunded = remote.refund.is_some();
        self.creation_date = Some(parse_timestamp(&remote.creation_date)?);
        Ok(())
    }

    async fn fetch(&self, gateway: &dyn Gateway, customer: &Customer) -> Result<RemoteCharge> {
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        match &self.remote_id {
            Some(remote_id) => gateway.retrieve_charge(customer_remote, remote_id).await,
            None => Err(SyncError::NotSynchronized),
        }
    }

    pub async fn retrieve(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let remote = self.fetch(gateway, customer).await?;
        self.fetched = Some(remote);
        Ok(())
    }

    /// Creates the remote charge (authorized, not captured). A charge that
    /// already has a remote identifier cannot be re-pushed; the call is a
    /// no-op to keep saves of the local row harmless.
    pub async fn push(
        &mut self,
        gateway: &dyn Gateway,
        customer: &Customer,
        card: &Card,
        device_session_id: Option<&str>,
    ) -> Result<()> {
        if self.remote_id.is_some() {
            return Ok(());
        }
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        let card_remote = card.remote_id.as_ref().ok_or(SyncError::MissingCard)?;
        let payload = NewCharge {
            source_id: card_remote.clone(),
            method: self.method,
            amount: self.amount.to_string(),
            currency: self.currency,
            description: self.description.clone(),
            device_session_id: device_session_id.map(str::to_string),
            capture: false,
        };
        let created = gateway.create_charge(customer_remote, &payload).await?;
        self.remote_id = Some(created.id.clone());
        self.fetched = Some(created);
        self.pull(gateway, customer).await
    }

    pub async fn pull(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let remote = self.fetch(gateway, customer).await?;
        self.apply(&remote)?;
        self.fetched = Some(remote);
        Ok(())
    }

    /// Charges are financial records; deleting them is forbidden.
    pub async fn remove(&mut self, _gateway: &dyn Gateway) -> Result<()> {
        Err(SyncError::Unsupported("deleting a charge"))
    }

    fn captureable(&self) -> Result<&RemoteId> {
        // Only card-backed, already-created charges can be settled or
        // reversed. Any other state reads as "nothing to address remotely".
        match (&self.remote_id, self.method) {
            (Some(remote_id), ChargeMethod::Card) => Ok(remote_id),
            _ => Err(SyncError::NotSynchronized),
        }
    }

    /// Settles a previously authorized charge.
    pub async fn capture(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let remote_id = self.captureable()?.clone();
        if self.fetched.is_none() {
            self.retrieve(gateway, customer).await?;
        }
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        let remote = gateway.capture_charge(customer_remote, &remote_id).await?;
        self.fetched = Some(remote);
        Ok(())
    }

    /// Reverses the charge and returns the gateway's refund record.
    pub async fn refund(
        &mut self,
        gateway: &dyn Gateway,
        customer: &Customer,
        description: Option<&str>,
    ) -> Result<RemoteRefund> {
        let remote_id = self.captureable()?.clone();
        if self.fetched.is_none() {
            self.retrieve(gateway, customer).await?;
        }
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        let remote = gateway
            .refund_charge(customer_remote, &remote_id, description)
            .await?;
        let refund = remote
            .refund
            .clone()
            .ok_or_else(|| SyncError::Gateway("refund missing from gateway response".into()))?;
        self.refunded = true;
        self.fetched = Some(remote);
        Ok(refund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_charge_defaults() {
        let charge = Charge::new("order 42", dec!(350.00), 1, 1, 1);
        assert_eq!(charge.method, ChargeMethod::Card);
        assert_eq!(charge.currency, Currency::Mxn);
        assert!(!charge.refunded);
        assert!(charge.validate().is_ok());
    }

    #[test]
    fn test_captureable_requires_remote_id_and_card_method() {
        let mut charge = Charge::new("order 42", dec!(350.00), 1, 1, 1);
        assert!(matches!(
            charge.captureable(),
            Err(SyncError::NotSynchronized)
        ));

        charge.remote_id = Some(RemoteId::new("trzjaozcik8msyqshka4"));
        assert!(charge.captureable().is_ok());

        // A non-card method fails the same way even with a remote id.
        charge.method = ChargeMethod::Bank;
        assert!(matches!(
            charge.captureable(),
            Err(SyncError::NotSynchronized)
        ));
    }

    #[test]
    fn test_apply_tracks_remote_refund() {
        let remote = RemoteCharge {
            id: RemoteId::new("trzjaozcik8msyqshka4"),
            description: "order 42".to_string(),
            amount: "350.00".to_string(),
            method: ChargeMethod::Card,
            currency: Currency::Mxn,
            status: Some("refunded".to_string()),
            refund: Some(RemoteRefund {
                id: RemoteId::new("trnyyy1".to_string()),
                amount: "350.00".to_string(),
                description: None,
                creation_date: "2016-05-12T11:10:09-05:00".to_string(),
            }),
            creation_date: "2016-05-12T11:10:09-05:00".to_string(),
        };
        let mut charge = Charge::new("stale", dec!(1.00), 1, 1, 1);
        charge.apply(&remote).unwrap();
        assert!(charge.refunded);
        assert_eq!(charge.amount, dec!(350.00));
    }

    #[test]
    fn test_readonly_fields_freeze_everything_but_links_to_capture() {
        assert_eq!(
            Charge::readonly_fields(false),
            ["remote_id", "creation_date"]
        );
        assert_eq!(
            Charge::readonly_fields(true),
            [
                "remote_id",
                "description",
                "amount",
                "method",
                "customer",
                "card",
                "plan",
                "creation_date",
            ]
        );
    }

    #[test]
    fn test_currency_wire_format() {
        assert_eq!(serde_json::to_string(&Currency::Mxn).unwrap(), "\"MXN\"");
        assert_eq!(serde_json::to_string(&ChargeMethod::Card).unwrap(), "\"card\"");
    }
}
