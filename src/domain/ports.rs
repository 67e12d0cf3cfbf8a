use crate::domain::card::Card;
use crate::domain::charge::Charge;
use crate::domain::customer::Customer;
use crate::domain::plan::Plan;
use crate::domain::refund::Refund;
use crate::domain::remote::{
    NewCharge, NewCustomer, NewPlan, NewSubscription, PlanUpdate, RemoteCard, RemoteCharge,
    RemoteCustomer, RemoteId, RemotePlan, RemoteSubscription, SubscriptionUpdate,
};
use crate::domain::subscription::Subscription;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CustomerGateway: Send + Sync {
    async fn create_customer(&self, payload: &NewCustomer) -> Result<RemoteCustomer>;
    async fn retrieve_customer(&self, id: &RemoteId) -> Result<RemoteCustomer>;
    async fn update_customer(&self, id: &RemoteId, payload: &NewCustomer)
    -> Result<RemoteCustomer>;
    async fn delete_customer(&self, id: &RemoteId) -> Result<()>;
}

#[async_trait]
pub trait CardGateway: Send + Sync {
    /// Exchanges a one-time token and device session for a stored card.
    /// There is no raw-number creation path.
    async fn create_card_from_token(
        &self,
        customer: &RemoteId,
        token_id: &str,
        device_session_id: &str,
    ) -> Result<RemoteCard>;
    async fn retrieve_card(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCard>;
    async fn delete_card(&self, customer: &RemoteId, id: &RemoteId) -> Result<()>;
}

#[async_trait]
pub trait PlanGateway: Send + Sync {
    async fn create_plan(&self, payload: &NewPlan) -> Result<RemotePlan>;
    async fn retrieve_plan(&self, id: &RemoteId) -> Result<RemotePlan>;
    async fn update_plan(&self, id: &RemoteId, payload: &PlanUpdate) -> Result<RemotePlan>;
    async fn delete_plan(&self, id: &RemoteId) -> Result<()>;
}

#[async_trait]
pub trait SubscriptionGateway: Send + Sync {
    async fn create_subscription(
        &self,
        customer: &RemoteId,
        payload: &NewSubscription,
    ) -> Result<RemoteSubscription>;
    async fn retrieve_subscription(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
    ) -> Result<RemoteSubscription>;
    async fn update_subscription(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
        payload: &SubscriptionUpdate,
    ) -> Result<RemoteSubscription>;
    async fn delete_subscription(&self, customer: &RemoteId, id: &RemoteId) -> Result<()>;
}

/// Charges expose capture and refund instead of delete: the gateway keeps
/// every charge forever, and so does this crate.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    async fn create_charge(&self, customer: &RemoteId, payload: &NewCharge)
    -> Result<RemoteCharge>;
    async fn retrieve_charge(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCharge>;
    async fn capture_charge(&self, customer: &RemoteId, id: &RemoteId) -> Result<RemoteCharge>;
    async fn refund_charge(
        &self,
        customer: &RemoteId,
        id: &RemoteId,
        description: Option<&str>,
    ) -> Result<RemoteCharge>;
}

/// The full remote payment-gateway client.
pub trait Gateway:
    CustomerGateway + CardGateway + PlanGateway + SubscriptionGateway + ChargeGateway
{
}

impl<T> Gateway for T where
    T: CustomerGateway + CardGateway + PlanGateway + SubscriptionGateway + ChargeGateway
{
}

pub type GatewayBox = Box<dyn Gateway>;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Persists the record, assigning a local id when it has none, and
    /// returns the stored copy.
    async fn store_customer(&self, customer: Customer) -> Result<Customer>;
    async fn get_customer(&self, id: u64) -> Result<Option<Customer>>;
    async fn find_customer_by_remote(&self, remote_id: &RemoteId) -> Result<Option<Customer>>;
    async fn delete_customer(&self, id: u64) -> Result<()>;
    async fn customers(&self) -> Result<Vec<Customer>>;
}

#[async_trait]
pub trait CardStore: Send + Sync {
    async fn store_card(&self, card: Card) -> Result<Card>;
    async fn get_card(&self, id: u64) -> Result<Option<Card>>;
    async fn delete_card(&self, id: u64) -> Result<()>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn store_plan(&self, plan: Plan) -> Result<Plan>;
    async fn get_plan(&self, id: u64) -> Result<Option<Plan>>;
    async fn delete_plan(&self, id: u64) -> Result<()>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn store_subscription(&self, subscription: Subscription) -> Result<Subscription>;
    async fn get_subscription(&self, id: u64) -> Result<Option<Subscription>>;
    async fn delete_subscription(&self, id: u64) -> Result<()>;
}

#[async_trait]
pub trait ChargeStore: Send + Sync {
    async fn store_charge(&self, charge: Charge) -> Result<Charge>;
    async fn get_charge(&self, id: u64) -> Result<Option<Charge>>;
}

#[async_trait]
pub trait RefundStore: Send + Sync {
    async fn store_refund(&self, refund: Refund) -> Result<Refund>;
    async fn get_refund(&self, id: u64) -> Result<Option<Refund>>;
}

/// The local persistence layer, one table per mirrored entity.
pub trait RecordStore:
    CustomerStore + CardStore + PlanStore + SubscriptionStore + ChargeStore + RefundStore
{
}

impl<T> RecordStore for T where
    T: CustomerStore + CardStore + PlanStore + SubscriptionStore + ChargeStore + RefundStore
{
}

pub type RecordStoreBox = Box<dyn RecordStore>;
