use crate::domain::ports::{
    CardGateway, ChargeGateway, CustomerGateway, PlanGateway, SubscriptionGateway,
};
use crate::domain::remote::{
    NewCharge, NewCustomer, NewPlan, NewSubscription, PlanUpdate, RemoteCard, RemoteCharge,
    RemoteCustomer, RemoteId, RemotePlan, RemoteRefund, RemoteSubscription, SubscriptionUpdate,
};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Timestamp stamped on every mock-created resource, mimicking the gateway's
/// zoned RFC 3339 format.
pub const MOCK_CREATION_DATE: &str = "2016-05-12T11:10:09-05:00";

const MOCK_CARD_NUMBER: &str = "4242424242424242";

#[derive(Default)]
struct MockState {
    customers: HashMap<RemoteId, RemoteCustomer>,
    cards: HashMap<(RemoteId, RemoteId), RemoteCard>,
    plans: HashMap<RemoteId, RemotePlan>,
    subscriptions: HashMap<(RemoteId, RemoteId), RemoteSubscription>,
    charges: HashMap<(RemoteId, RemoteId), RemoteCharge>,
}

/// Deterministic stand-in for the remote payment service, used in tests and
/// dry runs. Every call increments a request counter so tests can assert
/// that an operation never reached the network.
#[derive(Default, Clone)]
pub struct MockGateway {
    seq: Arc<AtomicU64>,
    requests: Arc<AtomicU64>,
    state: Arc<RwLock<MockState>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of gateway calls issued so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn track(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    fn next_id(&self, prefix: &str) -> RemoteId {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        RemoteId::new(format!("{prefix}_{n:06}"))
    }
}

fn not_found(kind: &str, id: &RemoteId) -> SyncError {
    SyncError::Gateway(format!("{kind} {id} does not exist"))
}

#[async_trait]
impl CustomerGateway for MockGateway {
    async fn create_customer(&self, payload: &NewCustomer) -> Result<RemoteCustomer> {
        self.track();
        let customer = RemoteCustomer {
            id: self.next_id("cus"),
            name: payload.name.clone(),
            last_name: payload.last_name.clone(),
            email: payload.email.clone(),
            phone_number: payload.phone_number.clone(),
            address: Some(payload.address.clone()),
            creation_date: MOCK_CREATION_DATE.to_string(),
        };
        let mut state = self.state.write().await;
        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    async fn retrieve_customer(&self, id: &RemoteId) -> Result<RemoteCustomer> {
        self.track();
        let state = self.state.read().await;
        state
            .customers
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("customer", id))
    }

    async fn update_customer(
        &self,
        id: &RemoteId,
        payload: &NewCustomer,
    ) -> Result<RemoteCustomer> {
        self.track();
        let mut state = self.state.write().await;
        let customer = state
            .customers
            .get_mut(id)
            .ok_or_else(|| not_found("customer", id))?;
        customer.name = payload.name.clone();
        customer.last_name = payload.last_name.clone();
        customer.email = payload.email.clone();
        customer.phone_number = payload.phone_number.clone();
        customer.address = Some(payload.address.clone());
        Ok(customer.clone())
    }

    async fn delete_customer(&self, id: &RemoteId) -> Result<()> {
        self.track();
        let mut state = self.state.write().await;
        state
            .customers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("customer", id))
    }
}

#[async_trait]
impl CardGateway for MockGateway {
    async fn create_card_from_token(
        &self,
        customer: &RemoteId,
        token_id: &str,
        _device_session_id: &str,
    ) -> Result<RemoteCard> {
        self.track();
        let mut state = self.state.write().await;
        if !state.customers.contains_key(customer) {
            return Err(not_found("customer", customer));
        }
        if token_id.is_empty() {
            return Err(SyncError::Gateway("token has expired".into()));
        }
        let card = RemoteCard {
            id: self.next_id("card"),
            card_type: "debit".to_string(),
            holder_name: "Token Holder".to_string(),
            card_number: MOCK_CARD_NUMBER.to_string(),
            expiration_month: "09".to_string(),
            expiration_year: "2029".to_string(),
            creation_date: MOCK_CREATION_DATE.to_string(),
        };
        state
            .cards
            .insert((customer.clone(), card.id.clone()), card.clone());
        Ok(card)
    }

    async fn retrieve_card(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCard> {
        self.track();
        let state = self.state.read().await;
        state
            .cards
            .get(&(customer.clone(), id.clone()))
            .cloned()
            .ok_or_else(|| not_found("card", id))
    }

    async fn delete_card(&self, customer: &RemoteId, id: &RemoteId) -> Result<()> {
        self.track();
        let mut state = self.state.write().await;
        state
            .cards
            .remove(&(customer.clone(), id.clone()))
            .map(|_| ())
            .ok_or_else(|| not_found("card", id))
    }
}

#[async_trait]
impl PlanGateway for MockGateway {
    async fn create_plan(&self, payload: &NewPlan) -> Result<RemotePlan> {
        self.track();
        let plan = RemotePlan {
            id: self.next_id("plan"),
            name: payload.name.clone(),
            amount: payload.amount.clone(),
            status_after_retry: payload.status_after_retry,
            retry_times: payload.retry_times,
            repeat_unit: payload.repeat_unit,
            trial_days: payload.trial_days,
            repeat_every: payload.repeat_every,
            creation_date: MOCK_CREATION_DATE.to_string(),
        };
        let mut state = self.state.write().await;
        state.plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn retrieve_plan(&self, id: &RemoteId) -> Result<RemotePlan> {
        self.track();
        let state = self.state.read().await;
        state
            .plans
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("plan", id))
    }

    async fn update_plan(&self, id: &RemoteId, payload: &PlanUpdate) -> Result<RemotePlan> {
        self.track();
        let mut state = self.state.write().await;
        let plan = state
            .plans
            .get_mut(id)
            .ok_or_else(|| not_found("plan", id))?;
        plan.name = payload.name.clone();
        plan.trial_days = payload.trial_days;
        Ok(plan.clone())
    }

    async fn delete_plan(&self, id: &RemoteId) -> Result<()> {
        self.track();
        let mut state = self.state.write().await;
        state
            .plans
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("plan", id))
    }
}

#[async_trait]
impl SubscriptionGateway for MockGateway {
    async fn create_subscription(
        &self,
        customer: &RemoteId,
        payload: &NewSubscription,
    ) -> Result<RemoteSubscription> {
        self.track();
        let mut state = self.state.write().await;
        if !state.customers.contains_key(customer) {
            return Err(not_found("customer", customer));
        }
        if !state.plans.contains_key(&payload.plan_id) {
            return Err(not_found("plan", &payload.plan_id));
        }
        if !state
            .cards
            .contains_key(&(customer.clone(), payload.card_id.clone()))
        {
            return Err(not_found("card", &payload.card_id));
        }
        let subscription = RemoteSubscription {
            id: self.next_id("sub"),
            plan_id: payload.plan_id.clone(),
            card_id: Some(payload.card_id.clone()),
            trial_end_date: payload.trial_end_date.clone(),
            cancel_at_period_end: false,
            creation_date: MOCK_CREATION_DATE.to_string(),
        };
        state
            .subscriptions
            .insert((customer.clone(), subscription.id.clone()), subscription.clone());
        Ok(subscription)
    }

    async fn retrieve_subscription(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
    ) -> Result<RemoteSubscription> {
        self.track();
        let state = self.state.read().await;
        state
            .subscriptions
            .get(&(customer.clone(), id.clone()))
            .cloned()
            .ok_or_else(|| not_found("subscription", id))
    }

    async fn update_subscription(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
        payload: &SubscriptionUpdate,
    ) -> Result<RemoteSubscription> {
        self.track();
        let mut state = self.state.write().await;
        let subscription = state
            .subscriptions
            .get_mut(&(customer.clone(), id.clone()))
            .ok_or_else(|| not_found("subscription", id))?;
        subscription.card_id = Some(payload.card_id.clone());
        subscription.trial_end_date = payload.trial_end_date.clone();
        subscription.cancel_at_period_end = payload.cancel_at_period_end;
        Ok(subscription.clone())
    }

    async fn delete_subscription(&self, customer: &RemoteId, id: &RemoteId) -> Result<()> {
        self.track();
        let mut state = self.state.write().await;
        state
            .subscriptions
            .remove(&(customer.clone(), id.clone()))
            .map(|_| ())
            .ok_or_else(|| not_found("subscription", id))
    }
}

#[async_trait]
impl ChargeGateway for MockGateway {
    async fn create_charge(
        &self,
        customer: &RemoteId,
        payload: &NewCharge,
    ) -> Result<RemoteCharge> {
        self.track();
        let mut state = self.state.write().await;
        if !state.customers.contains_key(customer) {
            return Err(not_found("customer", customer));
        }
        if !state
            .cards
            .contains_key(&(customer.clone(), payload.source_id.clone()))
        {
            return Err(not_found("card", &payload.source_id));
        }
        let status = if payload.capture {
            "completed"
        } else {
            "in_progress"
        };
        let charge = RemoteCharge {
            id: self.next_id("trn"),
            description: payload.description.clone(),
            amount: payload.amount.clone(),
            method: payload.method,
            currency: payload.currency,
            status: Some(status.to_string()),
            refund: None,
            creation_date: MOCK_CREATION_DATE.to_string(),
        };
        state
            .charges
            .insert((customer.clone(), charge.id.clone()), charge.clone());
        Ok(charge)
    }

    async fn retrieve_charge(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCharge> {
        self.track();
        let state = self.state.read().await;
        state
            .charges
            .get(&(customer.clone(), id.clone()))
            .cloned()
            .ok_or_else(|| not_found("charge", id))
    }

    async fn capture_charge(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCharge> {
        self.track();
        let mut state = self.state.write().await;
        let charge = state
            .charges
            .get_mut(&(customer.clone(), id.clone()))
            .ok_or_else(|| not_found("charge", id))?;
        charge.status = Some("completed".to_string());
        Ok(charge.clone())
    }

    async fn refund_charge(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
        description: Option<&str>,
    ) -> Result<RemoteCharge> {
        self.track();
        let refund_id = self.next_id("ref");
        let mut state = self.state.write().await;
        let charge = state
            .charges
            .get_mut(&(customer.clone(), id.clone()))
            .ok_or_else(|| not_found("charge", id))?;
        if charge.refund.is_some() {
            return Err(SyncError::Gateway(format!("charge {id} already refunded")));
        }
        charge.refund = Some(RemoteRefund {
            id: refund_id,
            amount: charge.amount.clone(),
            description: description.map(str::to_string),
            creation_date: MOCK_CREATION_DATE.to_string(),
        });
        charge.status = Some("refunded".to_string());
        Ok(charge.clone())
    }
}
