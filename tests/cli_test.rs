use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const CSV: &str = "\
first_name,last_name,email,phone_number,line1,line2,city,state,postal_code,country_code
Ana,Ruiz,ana@example.com,5512345678,Av. Reforma 222,,Ciudad de Mexico,CDMX,06600,MX
Luis,Mora,luis@example.com,,Calle 5 de Mayo 10,Int. 4,Puebla,PUE,72000,
";

#[test]
fn test_sync_report_from_csv() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(CSV.as_bytes()).unwrap();

    let mut cmd = Command::cargo_bin("openpay-sync").unwrap();
    cmd.arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("id,remote_id,email,creation_date"))
        .stdout(predicate::str::contains("cus_000001"))
        .stdout(predicate::str::contains("cus_000002"))
        .stdout(predicate::str::contains("luis@example.com"));
}

#[test]
fn test_invalid_rows_are_reported_not_fatal() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input
        .write_all(
            b"first_name,last_name,email,phone_number,line1,line2,city,state,postal_code,country_code
Ana,Ruiz,not-an-email,,Av. Reforma 222,,Ciudad de Mexico,CDMX,06600,MX
Luis,Mora,luis@example.com,,Calle 5 de Mayo 10,,Puebla,PUE,72000,MX
",
        )
        .unwrap();

    let mut cmd = Command::cargo_bin("openpay-sync").unwrap();
    cmd.arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("luis@example.com"))
        .stdout(predicate::str::contains("not-an-email").not())
        .stderr(predicate::str::contains("Error synchronizing customer"));
}

#[test]
fn test_missing_input_fails() {
    let mut cmd = Command::cargo_bin("openpay-sync").unwrap();
    cmd.arg("does-not-exist.csv").assert().failure();
}
