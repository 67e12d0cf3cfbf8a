use crate::domain::ports::Gateway;
use crate::domain::remote::{NewPlan, PlanUpdate, RemoteId, RemotePlan, parse_timestamp};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusAfterRetry {
    #[default]
    Unpaid,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatUnit {
    Week,
    #[default]
    Month,
    Year,
}

/// Recurring-billing template referenced by subscriptions. The gateway only
/// allows the name and trial days to change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    pub remote_id: Option<RemoteId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub name: String,
    pub amount: Decimal,
    pub retry_times: u32,
    pub status_after_retry: StatusAfterRetry,
    pub trial_days: u32,
    pub repeat_every: u32,
    pub repeat_unit: RepeatUnit,
    #[serde(skip)]
    fetched: Option<RemotePlan>,
}

impl Plan {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: 0,
            remote_id: None,
            creation_date: None,
            name: name.into(),
            amount,
            retry_times: 3,
            status_after_retry: StatusAfterRetry::default(),
            trial_days: 0,
            repeat_every: 1,
            repeat_unit: RepeatUnit::default(),
            fetched: None,
        }
    }

    pub fn readonly_fields(persisted: bool) -> &'static [&'static str] {
        if persisted {
            &[
                "remote_id",
                "amount",
                "retry_times",
                "status_after_retry",
                "repeat_every",
                "repeat_unit",
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
        if self.name.is_empty() || self.name.len() > 60 {
            return Err(SyncError::Validation(
                "plan name must be between 1 and 60 characters".into(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(SyncError::Validation("plan amount must be positive".into()));
        }
        if self.repeat_every == 0 {
            return Err(SyncError::Validation(
                "plan must repeat at least every 1 unit".into(),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, remote: &RemotePlan) -> Result<()> {
        self.name = remote.name.clone();
        self.amount = Decimal::from_str(&remote.amount)?;
        self.status_after_retry = remote.status_after_retry;
        self.retry_times = remote.retry_times;
        self.repeat_unit = remote.repeat_unit;
        self.trial_days = remote.trial_days;
        self.repeat_every = remote.repeat_every;
        self.creation_date = Some(parse_timestamp(&remote.creation_date)?);
        Ok(())
    }

    async fn fetch(&self, gateway: &dyn Gateway) -> Result<RemotePlan> {
        match &self.remote_id {
            Some(remote_id) => gateway.retrieve_plan(remote_id).await,
            None => Err(SyncError::NotSynchronized),
        }
    }

    pub async fn retrieve(&mut self, gateway: &dyn Gateway) -> Result<()> {
        let remote = self.fetch(gateway).await?;
        self.fetched = Some(remote);
        Ok(())
    }

    pub async fn push(&mut self, gateway: &dyn Gateway) -> Result<()> {
        match self.remote_id.clone() {
            Some(remote_id) => {
                if self.fetched.is_none() {
                    self.retrieve(gateway).await?;
                }
                let update = PlanUpdate {
                    name: self.name.clone(),
                    trial_days: self.trial_days,
                };
                let updated = gateway.update_plan(&remote_id, &update).await?;
                self.fetched = Some(updated);
                Ok(())
            }
            None => {
                let payload = NewPlan {
                    name: self.name.clone(),
                    amount: self.amount.to_string(),
                    status_after_retry: self.status_after_retry,
                    retry_times: self.retry_times,
                    repeat_unit: self.repeat_unit,
                    trial_days: self.trial_days,
                    repeat_every: self.repeat_every,
                };
                let created = gateway.create_plan(&payload).await?;
                self.remote_id = Some(created.id.clone());
                self.fetched = Some(created);
                self.pull(gateway).await
            }
        }
    }

    pub async fn pull(&mut self, gateway: &dyn Gateway) -> Result<()> {
        let remote = self.fetch(gateway).await?;
        self.apply(&remote)?;
        self.fetched = Some(remote);
        Ok(())
    }

    pub async fn remove(&mut self, gateway: &dyn Gateway) -> Result<()> {
        let Some(remote_id) = self.remote_id.clone() else {
            return Ok(());
        };
        if self.fetched.is_none() {
            self.retrieve(gateway).await?;
        }
        gateway.delete_plan(&remote_id).await
    }
}
