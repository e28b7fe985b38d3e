use crate::domain::product::Product;
use crate::error::{PurchaseError, Result};
use std::io::Read;

/// Reads the products of a purchase from a CSV source.
///
/// Expects an `identifier, name, price` header. Whitespace around fields is
/// trimmed; a row with a negative or non-numeric price is reported as an
/// error for that row only.
pub struct ProductReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ProductReader<R> {
    /// Creates a new `ProductReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes products, in
    /// file order.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PurchaseError::from))
    }
}
