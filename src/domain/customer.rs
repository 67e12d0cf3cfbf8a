use crate::domain::ports::Gateway;
use crate::domain::remote::{AddressPayload, NewCustomer, RemoteCustomer, RemoteId, parse_timestamp};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{9,15}$").expect("invalid regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid regex")
});

/// Postal address owned by exactly one customer. It travels embedded in the
/// customer payload and has no remote identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub city: String,
    pub state: String,
    pub postal_code: u32,
    pub country_code: String,
}

impl Address {
    pub fn new(
        line1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: u32,
    ) -> Self {
        Self {
            line1: line1.into(),
            line2: String::new(),
            line3: String::new(),
            city: city.into(),
            state: state.into(),
            postal_code,
            country_code: "MX".to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.line1.is_empty() {
            return Err(SyncError::Validation("address line1 is required".into()));
        }
        if self.city.is_empty() || self.state.is_empty() {
            return Err(SyncError::Validation(
                "address city and state are required".into(),
            ));
        }
        Ok(())
    }

    pub fn payload(&self) -> AddressPayload {
        AddressPayload {
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            line3: self.line3.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code,
            country_code: self.country_code.clone(),
        }
    }

    pub fn readonly_fields(_persisted: bool) -> &'static [&'static str] {
        &["remote_id", "creation_date"]
    }
}

/// Root of the customer-scoped object graph. Cards, subscriptions and charges
/// are all addressed through this record's remote identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub remote_id: Option<RemoteId>,
    /// Timestamp reported by the gateway, not the local clock.
    pub creation_date: Option<DateTime<Utc>>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Address,
    /// Last remote object fetched during the current operation.
    #[serde(skip)]
    fetched: Option<RemoteCustomer>,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: Option<String>,
        email: impl Into<String>,
        phone_number: Option<String>,
        address: Address,
    ) -> Self {
        Self {
            id: 0,
            remote_id: None,
            creation_date: None,
            first_name: first_name.into(),
            last_name,
            email: email.into(),
            phone_number,
            address,
            fetched: None,
        }
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    pub fn readonly_fields(_persisted: bool) -> &'static [&'static str] {
        &["remote_id", "creation_date"]
    }

    /// Drops the cached remote handle. Called at the start of every local
    /// operation so a stale fetch never leaks across operations.
    pub fn reset_cache(&mut self) {
        self.fetched = None;
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_name.is_empty() || self.first_name.len() > 60 {
            return Err(SyncError::Validation(
                "first name must be between 1 and 60 characters".into(),
            ));
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(SyncError::Validation(format!(
                "invalid email address: {:?}",
                self.email
            )));
        }
        if let Some(phone) = &self.phone_number
            && !PHONE_RE.is_match(phone)
        {
            return Err(SyncError::Validation(
                "the telephone number can only contain digits, 9 to 15 of them".into(),
            ));
        }
        self.address.validate()
    }

    fn payload(&self) -> NewCustomer {
        NewCustomer {
            name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            address: self.address.payload(),
        }
    }

    async fn fetch(&self, gateway: &dyn Gateway) -> Result<RemoteCustomer> {
        match &self.remote_id {
            Some(remote_id) => gateway.retrieve_customer(remote_id).await,
            None => Err(SyncError::NotSynchronized),
        }
    }

    /// Fetches the authoritative remote representation into the cached handle.
    pub async fn retrieve(&mut self, gateway: &dyn Gateway) -> Result<()> {
        let remote = self.fetch(gateway).await?;
        self.fetched = Some(remote);
        Ok(())
    }

    /// Creates the remote customer on first push; afterwards only updates the
    /// mutable field subset.
    pub async fn push(&mut self, gateway: &dyn Gateway) -> Result<()> {
        match self.remote_id.clone() {
            Some(remote_id) => {
                if self.fetched.is_none() {
                    self.retrieve(gateway).await?;
                }
                let updated = gateway.update_customer(&remote_id, &self.payload()).await?;
                self.fetched = Some(updated);
                Ok(())
            }
            None => {
                let created = gateway.create_customer(&self.payload()).await?;
                self.remote_id = Some(created.id.clone());
                self.fetched = Some(created);
                self.pull(gateway).await
            }
        }
    }

    /// Overwrites every local mutable field from the remote truth.
    pub async fn pull(&mut self, gateway: &dyn Gateway) -> Result<()> {
        let remote = self.fetch(gateway).await?;
        self.first_name = remote.name.clone();
        self.last_name = remote.last_name.clone();
        self.email = remote.email.clone();
        self.phone_number = remote.phone_number.clone();
        self.creation_date = Some(parse_timestamp(&remote.creation_date)?);
        self.fetched = Some(remote);
        Ok(())
    }

    /// Deletes the remote counterpart. A record that was never pushed has
    /// nothing to delete and succeeds trivially.
    pub async fn remove(&mut self, gateway: &dyn Gateway) -> Result<()> {
        let Some(remote_id) = self.remote_id.clone() else {
            return Ok(());
        };
        if self.fetched.is_none() {
            self.retrieve(gateway).await?;
        }
        gateway.delete_customer(&remote_id).await
    }
}
