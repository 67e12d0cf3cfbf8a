use crate::domain::card::Card;
use crate::domain::charge::Charge;
use crate::domain::customer::Customer;
use crate::domain::plan::Plan;
use crate::domain::ports::{
    CardStore, ChargeStore, CustomerStore, PlanStore, RefundStore, SubscriptionStore,
};
use crate::domain::refund::Refund;
use crate::domain::remote::RemoteId;
use crate::domain::subscription::Subscription;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory record store, one table per entity.
///
/// `Clone` shares the underlying maps, so a cloned handle observes the same
/// data. Local ids are assigned from a single sequence on first store.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    next_id: Arc<AtomicU64>,
    customers: Arc<RwLock<HashMap<u64, Customer>>>,
    cards: Arc<RwLock<HashMap<u64, Card>>>,
    plans: Arc<RwLock<HashMap<u64, Plan>>>,
    subscriptions: Arc<RwLock<HashMap<u64, Subscription>>>,
    charges: Arc<RwLock<HashMap<u64, Charge>>>,
    refunds: Arc<RwLock<HashMap<u64, Refund>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&self, id: u64) -> u64 {
        if id != 0 {
            return id;
        }
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn store_customer(&self, mut customer: Customer) -> Result<Customer> {
        customer.id = self.assign_id(customer.id);
        let mut customers = self.customers.write().await;
        customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, id: u64) -> Result<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers.get(&id).cloned())
    }

    async fn find_customer_by_remote(&self, remote_id: &RemoteId) -> Result<Option<Customer>> {
        let customers = self.customers.read().await;
        Ok(customers
            .values()
            .find(|c| c.remote_id.as_ref() == Some(remote_id))
            .cloned())
    }

    async fn delete_customer(&self, id: u64) -> Result<()> {
        let mut customers = self.customers.write().await;
        customers.remove(&id);
        Ok(())
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        let customers = self.customers.read().await;
        let mut all: Vec<Customer> = customers.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        Ok(all)
    }
}

#[async_trait]
impl CardStore for InMemoryStore {
    async fn store_card(&self, mut card: Card) -> Result<Card> {
        card.id = self.assign_id(card.id);
        let mut cards = self.cards.write().await;
        cards.insert(card.id, card.clone());
        Ok(card)
    }

    async fn get_card(&self, id: u64) -> Result<Option<Card>> {
        let cards = self.cards.read().await;
        Ok(cards.get(&id).cloned())
    }

    async fn delete_card(&self, id: u64) -> Result<()> {
        let mut cards = self.cards.write().await;
        cards.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl PlanStore for InMemoryStore {
    async fn store_plan(&self, mut plan: Plan) -> Result<Plan> {
        plan.id = self.assign_id(plan.id);
        let mut plans = self.plans.write().await;
        plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn get_plan(&self, id: u64) -> Result<Option<Plan>> {
        let plans = self.plans.read().await;
        Ok(plans.get(&id).cloned())
    }

    async fn delete_plan(&self, id: u64) -> Result<()> {
        let mut plans = self.plans.write().await;
        plans.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn store_subscription(&self, mut subscription: Subscription) -> Result<Subscription> {
        subscription.id = self.assign_id(subscription.id);
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get_subscription(&self, id: u64) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(&id).cloned())
    }

    async fn delete_subscription(&self, id: u64) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ChargeStore for InMemoryStore {
    async fn store_charge(&self, mut charge: Charge) -> Result<Charge> {
        charge.id = self.assign_id(charge.id);
        let mut charges = self.charges.write().await;
        charges.insert(charge.id, charge.clone());
        Ok(charge)
    }

    async fn get_charge(&self, id: u64) -> Result<Option<Charge>> {
        let charges = self.charges.read().await;
        Ok(charges.get(&id).cloned())
    }
}

#[async_trait]
impl RefundStore for InMemoryStore {
    async fn store_refund(&self, mut refund: Refund) -> Result<Refund> {
        refund.id = self.assign_id(refund.id);
        let mut refunds = self.refunds.write().await;
        refunds.insert(refund.id, refund.clone());
        Ok(refund)
    }

    async fn get_refund(&self, id: u64) -> Result<Option<Refund>> {
        let refunds = self.refunds.read().await;
        Ok(refunds.get(&id).cloned())
    }
}
