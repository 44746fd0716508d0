use crate::domain::catalog::Product;
use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes the end-of-run state report as CSV.
///
/// Two tables separated by a blank line: orders first (`id, customer, date,
/// status, total`), then the catalog (`id, name, description, category,
/// price, stock`). Headers are written even when a table is empty.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_report(&mut self, orders: &[Order], products: &[Product]) -> Result<()> {
        let mut table = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut self.writer);
        table.write_record(["id", "customer", "date", "status", "total"])?;
        for order in orders {
            table.serialize(order)?;
        }
        table.flush()?;
        drop(table);

        writeln!(self.writer)?;

        let mut table = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut self.writer);
        table.write_record(["id", "name", "description", "category", "price", "stock"])?;
        for product in products {
            table.serialize(product)?;
        }
        table.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{NewProduct, ProductId};
    use crate::domain::money::Money;
    use crate::domain::order::{CustomerId, OrderId, OrderStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_layout() {
        let orders = vec![Order {
            id: OrderId(1),
            customer: CustomerId(7),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            status: OrderStatus::Pending,
            total: Money::new(dec!(15.00)),
        }];
        let products = vec![Product::from_new(
            ProductId(1),
            NewProduct::new("Widget", "A sturdy widget", "Gadgets", dec!(5.00), 7).unwrap(),
        )];

        let mut out = Vec::new();
        ReportWriter::new(&mut out)
            .write_report(&orders, &products)
            .unwrap();
        let report = String::from_utf8(out).unwrap();

        assert_eq!(
            report,
            "id,customer,date,status,total\n\
             1,7,2026-09-01,Pending,15.00\n\
             \n\
             id,name,description,category,price,stock\n\
             1,Widget,A sturdy widget,Gadgets,5.00,7\n"
        );
    }

    #[test]
    fn test_report_keeps_headers_when_empty() {
        let mut out = Vec::new();
        ReportWriter::new(&mut out).write_report(&[], &[]).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.starts_with("id,customer,date,status,total\n"));
        assert!(report.contains("id,name,description,category,price,stock\n"));
    }
}
