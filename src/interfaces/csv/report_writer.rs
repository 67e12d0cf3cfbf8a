use crate::domain::customer::Customer;
use crate::error::Result;
use std::io::Write;

/// Writes a synchronization report as CSV: one line per customer with the
/// remote identifier the gateway assigned.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_customers(&mut self, customers: &[Customer]) -> Result<()> {
        self.writer
            .write_record(["id", "remote_id", "email", "creation_date"])?;
        for customer in customers {
            let remote_id = customer
                .remote_id
                .as_ref()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default();
            let creation_date = customer
                .creation_date
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default();
            self.writer.write_record([
                customer.id.to_string(),
                remote_id,
                customer.email.clone(),
                creation_date,
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::Address;
    use crate::domain::remote::RemoteId;

    #[test]
    fn test_report_format() {
        let mut customer = Customer::new(
            "Ana",
            Some("Ruiz".to_string()),
            "ana@example.com",
            None,
            Address::new("Av. Reforma 222", "Ciudad de Mexico", "CDMX", 6600),
        );
        customer.id = 1;
        customer.remote_id = Some(RemoteId::new("cus_000001"));

        let mut buffer = Vec::new();
        ReportWriter::new(&mut buffer)
            .write_customers(std::slice::from_ref(&customer))
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("id,remote_id,email,creation_date\n"));
        assert!(output.contains("1,cus_000001,ana@example.com,"));
    }
}
