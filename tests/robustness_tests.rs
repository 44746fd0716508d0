use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

const OPS_HEADER: [&str; 8] = [
    "op", "order", "product", "customer", "item", "quantity", "status", "date",
];

fn write_catalog(path: &std::path::Path) {
    let mut wtr = csv::Writer::from_path(path).unwrap();
    wtr.write_record(["name", "description", "category", "price", "stock"])
        .unwrap();
    wtr.write_record(["Widget", "A sturdy widget", "Gadgets", "5.00", "10"])
        .unwrap();
    wtr.flush().unwrap();
}

#[test]
fn test_malformed_csv_handling() {
    let catalog_path = std::path::PathBuf::from("robustness_catalog.csv");
    write_catalog(&catalog_path);

    let ops_path = std::path::PathBuf::from("robustness_ops.csv");
    let mut wtr = csv::Writer::from_path(&ops_path).unwrap();
    wtr.write_record(OPS_HEADER).unwrap();
    // Valid order and item
    wtr.write_record(["create-order", "", "", "1", "", "", "", "2099-01-01"])
        .unwrap();
    wtr.write_record(["add-item", "1", "1", "", "", "1", "", ""]).unwrap();
    // Unknown operation kind
    wtr.write_record(["teleport-order", "1", "", "", "", "", "", ""])
        .unwrap();
    // Missing quantity for add-item (required)
    wtr.write_record(["add-item", "1", "1", "", "", "", "", ""]).unwrap();
    // Valid item again
    wtr.write_record(["add-item", "1", "1", "", "", "2", "", ""]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("orderdesk"));
    cmd.arg(&ops_path).arg("--catalog").arg(&catalog_path);

    // 1 + 2 units land; the bad rows only produce stderr noise.
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stderr(predicate::str::contains("Error processing operation"))
        .stdout(predicate::str::contains("1,1,2099-01-01,Pending,15.00"))
        .stdout(predicate::str::contains("5.00,7"));

    std::fs::remove_file(catalog_path).ok();
    std::fs::remove_file(ops_path).ok();
}

#[test]
fn test_invalid_data_types() {
    let catalog_path = std::path::PathBuf::from("data_type_catalog.csv");
    write_catalog(&catalog_path);

    let ops_path = std::path::PathBuf::from("data_type_ops.csv");
    let mut wtr = csv::Writer::from_path(&ops_path).unwrap();
    wtr.write_record(OPS_HEADER).unwrap();
    wtr.write_record(["create-order", "", "", "1", "", "", "", "2099-01-01"])
        .unwrap();
    // Text in the quantity field
    wtr.write_record(["add-item", "1", "1", "", "", "lots", "", ""])
        .unwrap();
    // Non-integer order id
    wtr.write_record(["add-item", "abc", "1", "", "", "1", "", ""])
        .unwrap();
    // Unparseable date
    wtr.write_record(["create-order", "", "", "1", "", "", "", "someday"])
        .unwrap();
    // Valid row
    wtr.write_record(["add-item", "1", "1", "", "", "4", "", ""]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("orderdesk"));
    cmd.arg(&ops_path).arg("--catalog").arg(&catalog_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains("1,1,2099-01-01,Pending,20.00"))
        .stdout(predicate::str::contains("5.00,6"));

    std::fs::remove_file(catalog_path).ok();
    std::fs::remove_file(ops_path).ok();
}

#[test]
fn test_business_errors_do_not_stop_the_run() {
    let catalog_path = std::path::PathBuf::from("business_error_catalog.csv");
    write_catalog(&catalog_path);

    let ops_path = std::path::PathBuf::from("business_error_ops.csv");
    let mut wtr = csv::Writer::from_path(&ops_path).unwrap();
    wtr.write_record(OPS_HEADER).unwrap();
    wtr.write_record(["create-order", "", "", "1", "", "", "", "2099-01-01"])
        .unwrap();
    // Each of these fails a business check and leaves no trace
    wtr.write_record(["add-item", "1", "1", "", "", "999", "", ""]).unwrap();
    wtr.write_record(["add-item", "1", "42", "", "", "1", "", ""]).unwrap();
    wtr.write_record(["add-item", "42", "1", "", "", "1", "", ""]).unwrap();
    wtr.write_record(["update-item", "", "", "", "42", "2", "", ""])
        .unwrap();
    wtr.write_record(["set-status", "1", "", "", "", "", "Lost", ""])
        .unwrap();
    // Then processing continues normally
    wtr.write_record(["add-item", "1", "1", "", "", "2", "", ""]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("orderdesk"));
    cmd.arg(&ops_path).arg("--catalog").arg(&catalog_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("insufficient stock"))
        .stderr(predicate::str::contains("product 42 not found"))
        .stderr(predicate::str::contains("order 42 not found"))
        .stderr(predicate::str::contains("order item 42 not found"))
        .stderr(predicate::str::contains("invalid order status"))
        .stdout(predicate::str::contains("1,1,2099-01-01,Pending,10.00"))
        .stdout(predicate::str::contains("5.00,8"));

    std::fs::remove_file(catalog_path).ok();
    std::fs::remove_file(ops_path).ok();
}
