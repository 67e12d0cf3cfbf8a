use crate::domain::card::Card;
use crate::domain::charge::Charge;
use crate::domain::customer::Customer;
use crate::domain::plan::Plan;
use crate::domain::ports::{Gateway, GatewayBox, RecordStoreBox};
use crate::domain::refund::Refund;
use crate::domain::remote::RemoteId;
use crate::domain::subscription::Subscription;
use crate::error::{Result, SyncError};
use tracing::{info, warn};

/// Explicit orchestration between the local record store and the remote
/// gateway. Every save that needs the gateway pushes inside the same call, so
/// the local store never holds a row the remote side has not (at least) been
/// asked to create.
pub struct SyncService {
    store: RecordStoreBox,
    gateway: GatewayBox,
    device_session_id: Option<String>,
}

impl SyncService {
    pub fn new(store: RecordStoreBox, gateway: GatewayBox) -> Self {
        Self {
            store,
            gateway,
            device_session_id: None,
        }
    }

    /// Device session forwarded on charge creation for the gateway's
    /// anti-fraud checks.
    pub fn with_device_session(mut self, device_session_id: impl Into<String>) -> Self {
        self.device_session_id = Some(device_session_id.into());
        self
    }

    fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    async fn customer_of(&self, id: u64) -> Result<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or(SyncError::NotFound("customer", id))
    }

    // Customers

    pub async fn save_customer(&self, mut customer: Customer) -> Result<Customer> {
        customer.reset_cache();
        customer.email = customer.email.trim().to_string();
        customer.validate()?;
        customer.push(self.gateway()).await?;
        let stored = self.store.store_customer(customer).await?;
        info!(id = stored.id, remote_id = ?stored.remote_id, "customer synchronized");
        Ok(stored)
    }

    pub async fn delete_customer(&self, id: u64) -> Result<()> {
        let mut customer = self.customer_of(id).await?;
        self.store.delete_customer(id).await?;
        customer.reset_cache();
        customer.remove(self.gateway()).await?;
        info!(id, "customer deleted");
        Ok(())
    }

    pub async fn refresh_customer(&self, id: u64) -> Result<Customer> {
        let mut customer = self.customer_of(id).await?;
        customer.reset_cache();
        customer.pull(self.gateway()).await?;
        self.store.store_customer(customer).await
    }

    // Cards

    /// Tokenized card creation: the only way a card row comes into existence.
    pub async fn add_card(
        &self,
        customer_remote_id: &RemoteId,
        token_id: &str,
        device_session_id: &str,
        alias: &str,
    ) -> Result<Card> {
        let customer = self
            .store
            .find_customer_by_remote(customer_remote_id)
            .await?
            .ok_or(SyncError::MissingCustomer)?;
        let card =
            Card::from_token(self.gateway(), &customer, token_id, device_session_id, alias).await?;
        let stored = self.store.store_card(card).await?;
        info!(id = stored.id, remote_id = ?stored.remote_id, "card tokenized");
        Ok(stored)
    }

    /// Persists local-only card edits (the alias). Everything else on a card
    /// is read-only and cards cannot be pushed.
    pub async fn save_card(&self, mut card: Card) -> Result<Card> {
        card.reset_cache();
        card.validate()?;
        self.store.store_card(card).await
    }

    pub async fn delete_card(&self, id: u64) -> Result<()> {
        let mut card = self
            .store
            .get_card(id)
            .await?
            .ok_or(SyncError::NotFound("card", id))?;
        let customer = self.customer_of(card.customer_id).await?;
        self.store.delete_card(id).await?;
        card.reset_cache();
        card.remove(self.gateway(), &customer).await?;
        info!(id, "card deleted");
        Ok(())
    }

    pub async fn refresh_card(&self, id: u64) -> Result<Card> {
        let mut card = self
            .store
            .get_card(id)
            .await?
            .ok_or(SyncError::NotFound("card", id))?;
        let customer = self.customer_of(card.customer_id).await?;
        card.reset_cache();
        card.pull(self.gateway(), &customer).await?;
        self.store.store_card(card).await
    }

    // Plans

    pub async fn save_plan(&self, mut plan: Plan) -> Result<Plan> {
        plan.reset_cache();
        plan.validate()?;
        plan.push(self.gateway()).await?;
        let stored = self.store.store_plan(plan).await?;
        info!(id = stored.id, remote_id = ?stored.remote_id, "plan synchronized");
        Ok(stored)
    }

    pub async fn delete_plan(&self, id: u64) -> Result<()> {
        let mut plan = self
            .store
            .get_plan(id)
            .await?
            .ok_or(SyncError::NotFound("plan", id))?;
        self.store.delete_plan(id).await?;
        plan.reset_cache();
        plan.remove(self.gateway()).await?;
        info!(id, "plan deleted");
        Ok(())
    }

    pub async fn refresh_plan(&self, id: u64) -> Result<Plan> {
        let mut plan = self
            .store
            .get_plan(id)
            .await?
            .ok_or(SyncError::NotFound("plan", id))?;
        plan.reset_cache();
        plan.pull(self.gateway()).await?;
        self.store.store_plan(plan).await
    }

    // Subscriptions

    pub async fn save_subscription(&self, mut subscription: Subscription) -> Result<Subscription> {
        subscription.reset_cache();
        subscription.validate()?;
        let customer = self.customer_of(subscription.customer_id).await?;
        let card = self
            .store
            .get_card(subscription.card_id)
            .await?
            .ok_or(SyncError::NotFound("card", subscription.card_id))?;
        let plan = self
            .store
            .get_plan(subscription.plan_id)
            .await?
            .ok_or(SyncError::NotFound("plan", subscription.plan_id))?;
        subscription
            .push(self.gateway(), &customer, &card, &plan)
            .await?;
        let stored = self.store.store_subscription(subscription).await?;
        info!(id = stored.id, remote_id = ?stored.remote_id, "subscription synchronized");
        Ok(stored)
    }

    pub async fn delete_subscription(&self, id: u64) -> Result<()> {
        let mut subscription = self
            .store
            .get_subscription(id)
            .await?
            .ok_or(SyncError::NotFound("subscription", id))?;
        let customer = self.customer_of(subscription.customer_id).await?;
        self.store.delete_subscription(id).await?;
        subscription.reset_cache();
        subscription.remove(self.gateway(), &customer).await?;
        info!(id, "subscription deleted");
        Ok(())
    }

    pub async fn refresh_subscription(&self, id: u64) -> Result<Subscription> {
        let mut subscription = self
            .store
            .get_subscription(id)
            .await?
            .ok_or(SyncError::NotFound("subscription", id))?;
        let customer = self.customer_of(subscription.customer_id).await?;
        subscription.reset_cache();
        subscription.pull(self.gateway(), &customer).await?;
        self.store.store_subscription(subscription).await
    }

    // Charges

    pub async fn save_charge(&self, mut charge: Charge) -> Result<Charge> {
        charge.reset_cache();
        charge.validate()?;
        let customer = self.customer_of(charge.customer_id).await?;
        let card = self
            .store
            .get_card(charge.card_id)
            .await?
            .ok_or(SyncError::NotFound("card", charge.card_id))?;
        charge
            .push(
                self.gateway(),
                &customer,
                &card,
                self.device_session_id.as_deref(),
            )
            .await?;
        let stored = self.store.store_charge(charge).await?;
        info!(id = stored.id, remote_id = ?stored.remote_id, "charge synchronized");
        Ok(stored)
    }

    /// Always fails: charges are the audit trail and cannot be deleted, so
    /// the remote-removal step runs first and rejects the whole operation.
    pub async fn delete_charge(&self, id: u64) -> Result<()> {
        let mut charge = self
            .store
            .get_charge(id)
            .await?
            .ok_or(SyncError::NotFound("charge", id))?;
        charge.reset_cache();
        charge.remove(self.gateway()).await
    }

    pub async fn refresh_charge(&self, id: u64) -> Result<Charge> {
        let mut charge = self
            .store
            .get_charge(id)
            .await?
            .ok_or(SyncError::NotFound("charge", id))?;
        let customer = self.customer_of(charge.customer_id).await?;
        charge.reset_cache();
        charge.pull(self.gateway(), &customer).await?;
        self.store.store_charge(charge).await
    }

    pub async fn capture_charge(&self, id: u64) -> Result<Charge> {
        let mut charge = self
            .store
            .get_charge(id)
            .await?
            .ok_or(SyncError::NotFound("charge", id))?;
        let customer = self.customer_of(charge.customer_id).await?;
        charge.reset_cache();
        charge.capture(self.gateway(), &customer).await?;
        info!(id, "charge captured");
        self.store.store_charge(charge).await
    }

    pub async fn refund_charge(&self, id: u64, description: Option<&str>) -> Result<Refund> {
        let mut charge = self
            .store
            .get_charge(id)
            .await?
            .ok_or(SyncError::NotFound("charge", id))?;
        let customer = self.customer_of(charge.customer_id).await?;
        charge.reset_cache();
        let remote_refund = charge.refund(self.gateway(), &customer, description).await?;
        let refund = Refund::from_remote(&customer, &charge, &remote_refund)?;
        self.store.store_charge(charge).await?;
        let stored = self.store.store_refund(refund).await?;
        info!(id, refund_id = stored.id, "charge refunded");
        Ok(stored)
    }

    /// Bulk capture. Failures are logged and skipped; only the success count
    /// is reported.
    pub async fn capture_charges(&self, ids: &[u64]) -> usize {
        let mut captured = 0;
        for &id in ids {
            match self.capture_charge(id).await {
                Ok(_) => captured += 1,
                Err(e) => warn!(id, error = %e, "capture failed"),
            }
        }
        captured
    }

    /// Bulk refund, same reporting contract as `capture_charges`.
    pub async fn refund_charges(&self, ids: &[u64]) -> usize {
        let mut refunded = 0;
        for &id in ids {
            match self.refund_charge(id, None).await {
                Ok(_) => refunded += 1,
                Err(e) => warn!(id, error = %e, "refund failed"),
            }
        }
        refunded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::Address;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::infrastructure::mock_gateway::MockGateway;
    use rust_decimal_macros::dec;

    fn service() -> (SyncService, MockGateway) {
        let gateway = MockGateway::new();
        let service = SyncService::new(
            Box::new(InMemoryStore::new()),
            Box::new(gateway.clone()),
        );
        (service, gateway)
    }

    fn ana() -> Customer {
        Customer::new(
            "Ana",
            Some("Ruiz".to_string()),
            "ana@example.com",
            None,
            Address::new("Av. Reforma 222", "Ciudad de Mexico", "CDMX", 6600),
        )
    }

    #[tokio::test]
    async fn test_save_customer_assigns_remote_id_and_timestamp() {
        let (service, _) = service();
        let saved = service.save_customer(ana()).await.unwrap();
        assert!(saved.id > 0);
        assert!(saved.remote_id.is_some());
        assert!(saved.creation_date.is_some());
    }

    #[tokio::test]
    async fn test_save_customer_trims_email() {
        let (service, _) = service();
        let mut customer = ana();
        customer.email = "  ana@example.com ".to_string();
        let saved = service.save_customer(customer).await.unwrap();
        assert_eq!(saved.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_save_customer_rejects_invalid_before_any_push() {
        let (service, gateway) = service();
        let mut customer = ana();
        customer.first_name.clear();
        assert!(matches!(
            service.save_customer(customer).await,
            Err(SyncError::Validation(_))
        ));
        assert_eq!(gateway.request_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_charge_always_fails() {
        let (service, gateway) = service();
        let customer = service.save_customer(ana()).await.unwrap();
        let remote_id = customer.remote_id.clone().unwrap();
        let card = service
            .add_card(&remote_id, "tok_test", "dev_session", "main card")
            .await
            .unwrap();
        let plan = service
            .save_plan(Plan::new("basic", dec!(199.00)))
            .await
            .unwrap();
        let charge = service
            .save_charge(Charge::new("order 42", dec!(350.00), customer.id, card.id, plan.id))
            .await
            .unwrap();

        let before = gateway.request_count();
        assert!(matches!(
            service.delete_charge(charge.id).await,
            Err(SyncError::Unsupported(_))
        ));
        // The rejection happens before any remote call.
        assert_eq!(gateway.request_count(), before);
    }

    #[tokio::test]
    async fn test_bulk_actions_report_success_counts() {
        let (service, _) = service();
        let customer = service.save_customer(ana()).await.unwrap();
        let remote_id = customer.remote_id.clone().unwrap();
        let card = service
            .add_card(&remote_id, "tok_test", "dev_session", "")
            .await
            .unwrap();
        let plan = service
            .save_plan(Plan::new("basic", dec!(199.00)))
            .await
            .unwrap();
        let mut ids = Vec::new();
        for n in 0..3 {
            let charge = service
                .save_charge(Charge::new(
                    format!("order {n}"),
                    dec!(100.00),
                    customer.id,
                    card.id,
                    plan.id,
                ))
                .await
                .unwrap();
            ids.push(charge.id);
        }
        // One id that does not exist: skipped, not fatal.
        ids.push(9999);

        assert_eq!(service.capture_charges(&ids).await, 3);
        assert_eq!(service.refund_charges(&ids).await, 3);

        for &id in &ids[..3] {
            let charge = service.refresh_charge(id).await.unwrap();
            assert!(charge.refunded);
        }
    }
}
