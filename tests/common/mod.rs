use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

const OPS_HEADER: [&str; 8] = [
    "op", "order", "product", "customer", "item", "quantity", "status", "date",
];

pub fn generate_catalog(path: &Path, products: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["name", "description", "category", "price", "stock"])?;
    for i in 1..=products {
        let name = format!("Product {i}");
        wtr.write_record([name.as_str(), "Bulk test row", "General", "1.00", "9999999"])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_ops(path: &Path, orders: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(OPS_HEADER)?;
    for i in 1..=orders {
        wtr.write_record(["create-order", "", "", "1", "", "", "", "2099-01-01"])?;
        let order = i.to_string();
        wtr.write_record(["add-item", order.as_str(), "1", "", "", "1", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn generate_large_ops(path: &Path, size_mb: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(OPS_HEADER)?;

    let target_size = (size_mb * 1024 * 1024) as u64;
    let mut rng = rand::thread_rng();
    let mut order_id: u64 = 0;

    // Check size every 2500 order/item pairs to avoid syscall overhead
    loop {
        for _ in 0..2500 {
            let customer = rng.gen_range(1..=50u32).to_string();
            wtr.write_record([
                "create-order",
                "",
                "",
                customer.as_str(),
                "",
                "",
                "",
                "2099-01-01",
            ])?;
            order_id += 1;
            let order = order_id.to_string();
            let product = rng.gen_range(1..=5u32).to_string();
            wtr.write_record(["add-item", order.as_str(), product.as_str(), "", "", "1", "", ""])?;
        }
        wtr.flush()?; // Flush to ensure file size is updated
        if std::fs::metadata(path)?.len() >= target_size {
            break;
        }
    }
    Ok(())
}
