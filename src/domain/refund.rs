use crate::domain::charge::Charge;
use crate::domain::customer::Customer;
use crate::domain::remote::{RemoteId, RemoteRefund, parse_timestamp};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A reversal recorded against a charge. Built from the refund object the
/// gateway returns; never pushed, the gateway is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: u64,
    pub remote_id: Option<RemoteId>,
    pub creation_date: Option<DateTime<Utc>>,
    pub customer_id: u64,
    pub charge_id: u64,
    pub amount: Decimal,
    pub description: Option<String>,
}

impl Refund {
    pub fn from_remote(customer: &Customer, charge: &Charge, remote: &RemoteRefund) -> Result<Self> {
        Ok(Self {
            id: 0,
            remote_id: Some(remote.id.clone()),
            creation_date: Some(parse_timestamp(&remote.creation_date)?),
            customer_id: customer.id,
            charge_id: charge.id,
            amount: Decimal::from_str(&remote.amount)?,
            description: remote.description.clone(),
        })
    }

    pub fn readonly_fields(_persisted: bool) -> &'static [&'static str] {
        &[
            "remote_id",
            "customer",
            "charge",
            "amount",
            "creation_date",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Address, Customer};
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_remote() {
        let mut customer = Customer::new(
            "Ana",
            None,
            "ana@example.com",
            None,
            Address::new("Av. Reforma 222", "Ciudad de Mexico", "CDMX", 6600),
        );
        customer.id = 7;
        let mut charge = Charge::new("order 42", dec!(350.00), 7, 1, 1);
        charge.id = 11;

        let remote = RemoteRefund {
            id: RemoteId::new("trn7qff9drlt0wvbdvzc"),
            amount: "350.00".to_string(),
            description: Some("requested by customer".to_string()),
            creation_date: "2016-05-12T11:10:09-05:00".to_string(),
        };
        let refund = Refund::from_remote(&customer, &charge, &remote).unwrap();
        assert_eq!(refund.customer_id, 7);
        assert_eq!(refund.charge_id, 11);
        assert_eq!(refund.amount, dec!(350.00));
        assert!(refund.creation_date.is_some());
    }

    #[test]
    fn test_refund_rows_are_fully_readonly() {
        let expected = ["remote_id", "customer", "charge", "amount", "creation_date"];
        assert_eq!(Refund::readonly_fields(false), expected);
        assert_eq!(Refund::readonly_fields(true), expected);
    }
}
