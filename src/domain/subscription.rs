use crate::domain::card::Card;
use crate::domain::customer::Customer;
use crate::domain::plan::Plan;
use crate::domain::ports::Gateway;
use crate::domain::remote::{
    NewSubscription, RemoteId, RemoteSubscription, SubscriptionUpdate, parse_day, parse_timestamp,
};
use crate::error::{Result, SyncError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Binds a customer, a card and a plan into a recurring billing agreement.
/// Lives under the customer's remote identifier on the gateway side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub remote_id: Option<RemoteId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub customer_id: u64,
    pub card_id: u64,
    pub plan_id: u64,
    pub cancel_at_period_end: bool,
    pub trial_end_date: Option<NaiveDate>,
    #[serde(skip)]
    fetched: Option<RemoteSubscription>,
}

impl Subscription {
    pub fn new(customer_id: u64, card_id: u64, plan_id: u64) -> Self {
        Self {
            id: 0,
            remote_id: None,
            creation_date: None,
            customer_id,
            card_id,
            plan_id,
            cancel_at_period_end: false,
            trial_end_date: None,
            fetched: None,
        }
    }

    pub fn readonly_fields(persisted: bool) -> &'static [&'static str] {
        if persisted {
            &["remote_id", "customer", "plan", "creation_date"]
        } else {
            &["remote_id", "creation_date"]
        }
    }

    pub fn reset_cache(&mut self) {
        self.fetched = None;
    }

    pub fn validate(&self) -> Result<()> {
        if self.customer_id == 0 || self.card_id == 0 || self.plan_id == 0 {
            return Err(SyncError::Validation(
                "subscription requires a stored customer, card and plan".into(),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, remote: &RemoteSubscription) -> Result<()> {
        self.trial_end_date = match &remote.trial_end_date {
            Some(raw) => Some(parse_day(raw)?),
            None => None,
        };
        self.cancel_at_period_end = remote.cancel_at_period_end;
        self.creation_date = Some(parse_timestamp(&remote.creation_date)?);
        Ok(())
    }

    fn trial_end_payload(&self) -> Option<String> {
        self.trial_end_date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    async fn fetch(
        &self,
        gateway: &dyn Gateway,
        customer: &Customer,
    ) -> Result<RemoteSubscription> {
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        match &self.remote_id {
            Some(remote_id) => {
                gateway
                    .retrieve_subscription(customer_remote, remote_id)
                    .await
            }
            None => Err(SyncError::NotSynchronized),
        }
    }

    pub async fn retrieve(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let remote = self.fetch(gateway, customer).await?;
        self.fetched = Some(remote);
        Ok(())
    }

    pub async fn push(
        &mut self,
        gateway: &dyn Gateway,
        customer: &Customer,
        card: &Card,
        plan: &Plan,
    ) -> Result<()> {
        match self.remote_id.clone() {
            Some(remote_id) => {
                let customer_remote =
                    customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
                let card_remote = card.remote_id.as_ref().ok_or(SyncError::MissingCard)?;
                if self.fetched.is_none() {
                    self.retrieve(gateway, customer).await?;
                }
                let update = SubscriptionUpdate {
                    card_id: card_remote.clone(),
                    trial_end_date: self.trial_end_payload(),
                    cancel_at_period_end: self.cancel_at_period_end,
                };
                let updated = gateway
                    .update_subscription(customer_remote, &remote_id, &update)
                    .await?;
                self.fetched = Some(updated);
                Ok(())
            }
            None => {
                let customer_remote =
                    customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
                let card_remote = card.remote_id.as_ref().ok_or(SyncError::MissingCard)?;
                let plan_remote = plan.remote_id.as_ref().ok_or_else(|| {
                    SyncError::Validation("subscription plan has no remote identifier".into())
                })?;
                let payload = NewSubscription {
                    plan_id: plan_remote.clone(),
                    card_id: card_remote.clone(),
                    trial_end_date: self.trial_end_payload(),
                };
                let created = gateway.create_subscription(customer_remote, &payload).await?;
                // The create call cannot carry the cancellation flag, so a
                // second update sets it when requested.
                let created = if self.cancel_at_period_end {
                    let update = SubscriptionUpdate {
                        card_id: card_remote.clone(),
                        trial_end_date: self.trial_end_payload(),
                        cancel_at_period_end: true,
                    };
                    gateway
                        .update_subscription(customer_remote, &created.id, &update)
                        .await?
                } else {
                    created
                };
                self.remote_id = Some(created.id.clone());
                self.fetched = Some(created);
                self.pull(gateway, customer).await
            }
        }
    }

    pub async fn pull(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let remote = self.fetch(gateway, customer).await?;
        self.apply(&remote)?;
        self.fetched = Some(remote);
        Ok(())
    }

    pub async fn remove(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let Some(remote_id) = self.remote_id.clone() else {
            return Ok(());
        };
        if self.fetched.is_none() {
            self.retrieve(gateway, customer).await?;
        }
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        gateway.delete_subscription(customer_remote, &remote_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_stored_links() {
        assert!(Subscription::new(1, 2, 3).validate().is_ok());
        assert!(matches!(
            Subscription::new(0, 2, 3).validate(),
            Err(SyncError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_parses_trial_end_date() {
        let remote = RemoteSubscription {
            id: RemoteId::new("s0gmyor4zrxklqrkcuvh"),
            plan_id: RemoteId::new("p8e6x3hafqqsbmnoevrt"),
            card_id: Some(RemoteId::new("kqgykn96i7bcs1wwhvgw")),
            trial_end_date: Some("2026-09-30".to_string()),
            cancel_at_period_end: true,
            creation_date: "2016-05-12T11:10:09-05:00".to_string(),
        };
        let mut subscription = Subscription::new(1, 1, 1);
        subscription.apply(&remote).unwrap();
        assert_eq!(
            subscription.trial_end_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 30).unwrap())
        );
        assert!(subscription.cancel_at_period_end);
    }

    #[test]
    fn test_readonly_fields_freeze_links_after_persisting() {
        assert_eq!(
            Subscription::readonly_fields(false),
            ["remote_id", "creation_date"]
        );
        assert_eq!(
            Subscription::readonly_fields(true),
            ["remote_id", "customer", "plan", "creation_date"]
        );
    }

    #[test]
    fn test_trial_end_payload_format() {
        let mut subscription = Subscription::new(1, 1, 1);
        assert_eq!(subscription.trial_end_payload(), None);
        subscription.trial_end_date = NaiveDate::from_ymd_opt(2026, 1, 5);
        assert_eq!(subscription.trial_end_payload(), Some("2026-01-05".to_string()));
    }
}
