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
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const CF_CUSTOMERS: &str = "customers";
pub const CF_CARDS: &str = "cards";
pub const CF_PLANS: &str = "plans";
pub const CF_SUBSCRIPTIONS: &str = "subscriptions";
pub const CF_CHARGES: &str = "charges";
pub const CF_REFUNDS: &str = "refunds";

const ALL_CFS: [&str; 6] = [
    CF_CUSTOMERS,
    CF_CARDS,
    CF_PLANS,
    CF_SUBSCRIPTIONS,
    CF_CHARGES,
    CF_REFUNDS,
];

/// Persistent record store backed by RocksDB, one column family per entity.
/// Records are stored as JSON under their big-endian local id.
///
/// `Clone` shares the underlying `Arc<DB>` and the id sequence.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    next_id: Arc<AtomicU64>,
}

impl RocksDbStore {
    /// Opens or creates a database at `path`, ensuring every entity column
    /// family exists and resuming the local id sequence from stored data.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        let mut max_id = 0u64;
        for name in ALL_CFS {
            let cf = db
                .cf_handle(name)
                .ok_or_else(|| SyncError::Internal(format!("missing column family {name}").into()))?;
            if let Some(entry) = db.iterator_cf(cf, IteratorMode::End).next() {
                let (key, _) = entry?;
                if let Ok(bytes) = <[u8; 8]>::try_from(key.as_ref()) {
                    max_id = max_id.max(u64::from_be_bytes(bytes));
                }
            }
        }

        Ok(Self {
            db: Arc::new(db),
            next_id: Arc::new(AtomicU64::new(max_id)),
        })
    }

    fn assign_id(&self, id: u64) -> u64 {
        if id != 0 {
            return id;
        }
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| SyncError::Internal(format!("missing column family {name}").into()))
    }

    fn put<T: Serialize>(&self, cf_name: &str, id: u64, record: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let value = serde_json::to_vec(record).map_err(|e| SyncError::Internal(Box::new(e)))?;
        self.db.put_cf(cf, id.to_be_bytes(), value)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf_name: &str, id: u64) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => {
                let record =
                    serde_json::from_slice(&bytes).map_err(|e| SyncError::Internal(Box::new(e)))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn erase(&self, cf_name: &str, id: u64) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.delete_cf(cf, id.to_be_bytes())?;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = entry?;
            records.push(
                serde_json::from_slice(&value).map_err(|e| SyncError::Internal(Box::new(e)))?,
            );
        }
        Ok(records)
    }
}

#[async_trait]
impl CustomerStore for RocksDbStore {
    async fn store_customer(&self, mut customer: Customer) -> Result<Customer> {
        customer.id = self.assign_id(customer.id);
        self.put(CF_CUSTOMERS, customer.id, &customer)?;
        Ok(customer)
    }

    async fn get_customer(&self, id: u64) -> Result<Option<Customer>> {
        self.fetch(CF_CUSTOMERS, id)
    }

    async fn find_customer_by_remote(&self, remote_id: &RemoteId) -> Result<Option<Customer>> {
        let customers: Vec<Customer> = self.scan(CF_CUSTOMERS)?;
        Ok(customers
            .into_iter()
            .find(|c| c.remote_id.as_ref() == Some(remote_id)))
    }

    async fn delete_customer(&self, id: u64) -> Result<()> {
        self.erase(CF_CUSTOMERS, id)
    }

    async fn customers(&self) -> Result<Vec<Customer>> {
        let mut customers: Vec<Customer> = self.scan(CF_CUSTOMERS)?;
        customers.sort_by_key(|c| c.id);
        Ok(customers)
    }
}

#[async_trait]
impl CardStore for RocksDbStore {
    async fn store_card(&self, mut card: Card) -> Result<Card> {
        card.id = self.assign_id(card.id);
        self.put(CF_CARDS, card.id, &card)?;
        Ok(card)
    }

    async fn get_card(&self, id: u64) -> Result<Option<Card>> {
        self.fetch(CF_CARDS, id)
    }

    async fn delete_card(&self, id: u64) -> Result<()> {
        self.erase(CF_CARDS, id)
    }
}

#[async_trait]
impl PlanStore for RocksDbStore {
    async fn store_plan(&self, mut plan: Plan) -> Result<Plan> {
        plan.id = self.assign_id(plan.id);
        self.put(CF_PLANS, plan.id, &plan)?;
        Ok(plan)
    }

    async fn get_plan(&self, id: u64) -> Result<Option<Plan>> {
        self.fetch(CF_PLANS, id)
    }

    async fn delete_plan(&self, id: u64) -> Result<()> {
        self.erase(CF_PLANS, id)
    }
}

#[async_trait]
impl SubscriptionStore for RocksDbStore {
    async fn store_subscription(&self, mut subscription: Subscription) -> Result<Subscription> {
        subscription.id = self.assign_id(subscription.id);
        self.put(CF_SUBSCRIPTIONS, subscription.id, &subscription)?;
        Ok(subscription)
    }

    async fn get_subscription(&self, id: u64) -> Result<Option<Subscription>> {
        self.fetch(CF_SUBSCRIPTIONS, id)
    }

    async fn delete_subscription(&self, id: u64) -> Result<()> {
        self.erase(CF_SUBSCRIPTIONS, id)
    }
}

#[async_trait]
impl ChargeStore for RocksDbStore {
    async fn store_charge(&self, mut charge: Charge) -> Result<Charge> {
        charge.id = self.assign_id(charge.id);
        self.put(CF_CHARGES, charge.id, &charge)?;
        Ok(charge)
    }

    async fn get_charge(&self, id: u64) -> Result<Option<Charge>> {
        self.fetch(CF_CHARGES, id)
    }
}

#[async_trait]
impl RefundStore for RocksDbStore {
    async fn store_refund(&self, mut refund: Refund) -> Result<Refund> {
        refund.id = self.assign_id(refund.id);
        self.put(CF_REFUNDS, refund.id, &refund)?;
        Ok(refund)
    }

    async fn get_refund(&self, id: u64) -> Result<Option<Refund>> {
        self.fetch(CF_REFUNDS, id)
    }
}
