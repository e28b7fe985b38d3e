use crate::domain::purchase::PurchaseRecord;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PurchaseRow<'a> {
    transaction: &'a str,
    items: String,
    total: String,
    currency: &'a str,
}

impl<'a> From<&'a PurchaseRecord> for PurchaseRow<'a> {
    fn from(record: &'a PurchaseRecord) -> Self {
        let items = record
            .items
            .iter()
            .map(|item| item.label.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            transaction: &record.transaction_identifier,
            items,
            total: record.total.to_string(),
            currency: &record.currency_code,
        }
    }
}

/// Writes stored purchases as CSV, one row per purchase.
pub struct PurchaseWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PurchaseWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes a header followed by every purchase, then flushes.
    pub fn write_purchases(&mut self, purchases: &[PurchaseRecord]) -> Result<()> {
        if purchases.is_empty() {
            self.writer
                .write_record(["transaction", "items", "total", "currency"])?;
        }
        for record in purchases {
            self.writer.serialize(PurchaseRow::from(record))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
