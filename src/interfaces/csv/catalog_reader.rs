use crate::domain::catalog::NewProduct;
use crate::error::{OrderError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of the catalog seed CSV: `name, description, category, price,
/// stock`. Product ids are allocated in row order, starting at 1.
#[derive(Debug, Deserialize)]
struct CatalogRecord {
    name: String,
    description: String,
    category: String,
    price: Decimal,
    stock: u32,
}

/// Reads catalog seed rows from a CSV source.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator of validated product payloads.
    pub fn products(self) -> impl Iterator<Item = Result<NewProduct>> {
        self.reader.into_deserialize().map(|result| {
            let record: CatalogRecord = result.map_err(OrderError::from)?;
            NewProduct::new(
                record.name,
                record.description,
                record.category,
                record.price,
                record.stock,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_rows() {
        let data = "name, description, category, price, stock\n\
                    Widget, A sturdy widget, Gadgets, 5.00, 10\n\
                    Gizmo, Spins quietly, Gadgets, 2.50, 4";
        let rows: Vec<Result<NewProduct>> = CatalogReader::new(data.as_bytes()).products().collect();

        assert_eq!(rows.len(), 2);
        let widget = rows[0].as_ref().unwrap();
        assert_eq!(widget.name, "Widget");
        assert_eq!(widget.price.value(), dec!(5.00));
        assert_eq!(widget.stock, 10);
    }

    #[test]
    fn test_reader_rejects_invalid_fields() {
        // Zero price fails the pricing rules even though the row parses.
        let data = "name, description, category, price, stock\n\
                    Widget, A sturdy widget, Gadgets, 0.00, 10";
        let rows: Vec<Result<NewProduct>> = CatalogReader::new(data.as_bytes()).products().collect();
        assert!(rows[0].is_err());

        let data = "name, description, category, price, stock\n\
                    Widget, A sturdy widget, Gadgets, five, 10";
        let rows: Vec<Result<NewProduct>> = CatalogReader::new(data.as_bytes()).products().collect();
        assert!(rows[0].is_err());
    }
}
