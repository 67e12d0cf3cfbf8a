use crate::domain::customer::{Address, Customer};
use crate::error::{Result, SyncError};
use serde::Deserialize;
use std::io::Read;

/// One customer per CSV line, address columns flattened alongside the
/// identity columns.
#[derive(Debug, Deserialize)]
pub struct CustomerRow {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: u32,
    pub country_code: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        let mut address = Address::new(row.line1, row.city, row.state, row.postal_code);
        if let Some(line2) = row.line2 {
            address.line2 = line2;
        }
        if let Some(country_code) = row.country_code {
            address.country_code = country_code;
        }
        Customer::new(
            row.first_name,
            row.last_name,
            row.email,
            row.phone_number,
            address,
        )
    }
}

/// Reads customers from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating missing trailing
/// columns, and yields `Result<Customer>` lazily.
pub struct CustomerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CustomerReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn customers(self) -> impl Iterator<Item = Result<Customer>> {
        self.reader.into_deserialize::<CustomerRow>().map(|row| {
            row.map(Customer::from).map_err(SyncError::from)
        })
    }
}
