use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_boundary_numerical_values() {
    let catalog_path = std::path::PathBuf::from("boundary_catalog.csv");
    let mut wtr = csv::Writer::from_path(&catalog_path).unwrap();
    wtr.write_record(["name", "description", "category", "price", "stock"])
        .unwrap();
    // Price cap and stock cap on one row each
    wtr.write_record(["Bullion", "Priced at the cap", "Metals", "99999999.99", "1"])
        .unwrap();
    wtr.write_record(["Grain", "Stocked at the cap", "Bulk", "0.01", "9999999"])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let ops_path = std::path::PathBuf::from("boundary_ops.csv");
    let mut wtr = csv::Writer::from_path(&ops_path).unwrap();
    wtr.write_record(["op", "order", "product", "customer", "item", "quantity", "status", "date"])
        .unwrap();
    // u64::MAX customer id
    wtr.write_record([
        "create-order",
        "",
        "",
        "18446744073709551615",
        "",
        "",
        "",
        "2099-01-01",
    ])
    .unwrap();
    wtr.write_record(["add-item", "1", "1", "", "", "1", "", ""]).unwrap();
    wtr.write_record(["add-item", "1", "2", "", "", "9999999", "", ""])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("orderdesk"));
    cmd.arg(&ops_path).arg("--catalog").arg(&catalog_path);

    // 99999999.99 + 0.01 * 9999999 = 100099999.98, both stocks drained to 0.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("id,customer,date,status,total"))
        .stdout(predicate::str::contains(
            "1,18446744073709551615,2099-01-01,Pending,100099999.98",
        ))
        .stdout(predicate::str::contains("99999999.99,0"))
        .stdout(predicate::str::contains("0.01,0"));

    std::fs::remove_file(catalog_path).ok();
    std::fs::remove_file(ops_path).ok();
}

#[test]
fn test_penny_prices_sum_exactly() {
    let catalog_path = std::path::PathBuf::from("penny_catalog.csv");
    let mut wtr = csv::Writer::from_path(&catalog_path).unwrap();
    wtr.write_record(["name", "description", "category", "price", "stock"])
        .unwrap();
    wtr.write_record(["Washer", "Flat ring", "Hardware", "0.10", "100"])
        .unwrap();
    wtr.write_record(["Screw", "Wood thread", "Hardware", "0.20", "100"])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let ops_path = std::path::PathBuf::from("penny_ops.csv");
    let mut wtr = csv::Writer::from_path(&ops_path).unwrap();
    wtr.write_record(["op", "order", "product", "customer", "item", "quantity", "status", "date"])
        .unwrap();
    wtr.write_record(["create-order", "", "", "1", "", "", "", "2099-01-01"])
        .unwrap();
    wtr.write_record(["add-item", "1", "1", "", "", "3", "", ""]).unwrap();
    wtr.write_record(["add-item", "1", "2", "", "", "1", "", ""]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("orderdesk"));
    cmd.arg(&ops_path).arg("--catalog").arg(&catalog_path);

    // 0.30 + 0.20 carries no float drift.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,1,2099-01-01,Pending,0.50"));

    std::fs::remove_file(catalog_path).ok();
    std::fs::remove_file(ops_path).ok();
}
