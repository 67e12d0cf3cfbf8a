use crate::domain::customer::Customer;
use crate::domain::ports::Gateway;
use crate::domain::remote::{RemoteCard, RemoteId, parse_timestamp};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keeps the trailing `n` characters of a masked gateway value.
fn suffix(value: &str, n: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(n)).collect()
}

/// A stored payment instrument. Only masked metadata ever reaches this record:
/// cards are created exclusively through the tokenization flow and the gateway
/// does not allow updating them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: u64,
    pub remote_id: Option<RemoteId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub alias: String,
    pub card_type: String,
    pub holder: String,
    /// Last four digits only.
    pub number: String,
    pub month: String,
    pub year: String,
    pub customer_id: u64,
    #[serde(skip)]
    fetched: Option<RemoteCard>,
}

impl Card {
    /// Exchanges a one-time token and device session for a stored card,
    /// bypassing `push` entirely so the full number is never handled locally.
    pub async fn from_token(
        gateway: &dyn Gateway,
        customer: &Customer,
        token_id: &str,
        device_session_id: &str,
        alias: impl Into<String>,
    ) -> Result<Self> {
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        let remote = gateway
            .create_card_from_token(customer_remote, token_id, device_session_id)
            .await?;
        let mut card = Self {
            id: 0,
            remote_id: Some(remote.id.clone()),
            creation_date: None,
            alias: alias.into(),
            card_type: String::new(),
            holder: String::new(),
            number: String::new(),
            month: String::new(),
            year: String::new(),
            customer_id: customer.id,
            fetched: None,
        };
        card.apply(&remote)?;
        card.fetched = Some(remote);
        Ok(card)
    }

    pub fn readonly_fields(_persisted: bool) -> &'static [&'static str] {
        &[
            "remote_id",
            "card_type",
            "holder",
            "number",
            "month",
            "year",
            "customer",
            "creation_date",
        ]
    }

    pub fn reset_cache(&mut self) {
        self.fetched = None;
    }

    pub fn validate(&self) -> Result<()> {
        if self.number.len() > 4 {
            return Err(SyncError::Validation(
                "card number must be at most the last four digits".into(),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, remote: &RemoteCard) -> Result<()> {
        self.card_type = remote.card_type.clone();
        self.holder = remote.holder_name.clone();
        self.number = suffix(&remote.card_number, 4);
        self.month = suffix(&remote.expiration_month, 2);
        self.year = suffix(&remote.expiration_year, 2);
        self.creation_date = Some(parse_timestamp(&remote.creation_date)?);
        Ok(())
    }

    async fn fetch(&self, gateway: &dyn Gateway, customer: &Customer) -> Result<RemoteCard> {
        let customer_remote = customer.remote_id.as_ref().ok_or(SyncError::MissingCustomer)?;
        match &self.remote_id {
            Some(remote_id) => gateway.retrieve_card(customer_remote, remote_id).await,
            None => Err(SyncError::NotSynchronized),
        }
    }

    pub async fn retrieve(&mut self, gateway: &dyn Gateway, customer: &Customer) -> Result<()> {
        let remote = self.fetch(gateway, customer).await?;
        self.fetched = Some(remote);
        Ok(())
    }

    /// Tokenized cards are immutable on the gateway side.
    pub async fn push(&mut self, _gateway: &dyn Gateway) -> Result<()> {
        Err(SyncError::Unsupported("updating a tokenized card"))
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
        gateway.delete_card(customer_remote, &remote_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_truncation() {
        assert_eq!(suffix("411111XXXXXX1111", 4), "1111");
        assert_eq!(suffix("2029", 2), "29");
        assert_eq!(suffix("9", 2), "9");
    }

    #[test]
    fn test_apply_masks_card_number() {
        let remote = RemoteCard {
            id: RemoteId::new("kqgykn96i7bcs1wwhvgw"),
            card_type: "debit".to_string(),
            holder_name: "Ana Ruiz".to_string(),
            card_number: "4242424242424242".to_string(),
            expiration_month: "09".to_string(),
            expiration_year: "2029".to_string(),
            creation_date: "2016-05-12T11:10:09-05:00".to_string(),
        };
        let mut card = Card {
            id: 0,
            remote_id: None,
            creation_date: None,
            alias: String::new(),
            card_type: String::new(),
            holder: String::new(),
            number: String::new(),
            month: String::new(),
            year: String::new(),
            customer_id: 1,
            fetched: None,
        };
        card.apply(&remote).unwrap();
        assert_eq!(card.number, "4242");
        assert_eq!(card.month, "09");
        assert_eq!(card.year, "29");
        assert!(card.validate().is_ok());
        assert!(card.creation_date.is_some());
    }

    #[test]
    fn test_every_gateway_field_is_readonly() {
        let expected = [
            "remote_id",
            "card_type",
            "holder",
            "number",
            "month",
            "year",
            "customer",
            "creation_date",
        ];
        assert_eq!(Card::readonly_fields(false), expected);
        assert_eq!(Card::readonly_fields(true), expected);
    }
}
