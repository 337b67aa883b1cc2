use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn clinic_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("clinic"))
}

fn init(config_path: &Path) {
    clinic_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
}

fn write_records(config_path: &Path, records: &str) {
    fs::write(config_path.join("records.json"), records).unwrap();
}

const RECORDS: &str = r#"{
  "patients": [
    {"id": "p1", "patient_no": "P-001", "first_name": "Jane", "last_name": "Wanjiku"},
    {"id": "p2", "patient_no": "P-002", "first_name": "Otieno", "last_name": "Ouma"}
  ],
  "lab_orders": [
    {"id": "l1", "patient_id": "p1", "test_name": "CBC", "status": "result_ready"},
    {"id": "l2", "patient_id": "p2", "test_name": "Malaria RDT"}
  ],
  "prescriptions": [
    {"id": "rx1", "patient_id": "p1", "drugs": [
      {"name": "Amoxicillin", "dosage": "500mg", "frequency": "TDS", "duration": "5 days"}
    ]}
  ]
}"#;

/// Initialized config dir with the seeded records
fn setup() -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clinic-config");
    init(&config_path);
    write_records(&config_path, RECORDS);
    let dir = config_path.to_str().unwrap().to_string();
    (temp_dir, dir)
}

fn create_consultation(dir: &str) {
    clinic_cmd()
        .args(["-C", dir, "create", "--patient", "p1", "--item", "Consultation:1500"])
        .assert()
        .success();
}

#[test]
fn test_help() {
    clinic_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Clinic billing"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clinic-config");

    clinic_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized clinic config"));

    assert!(config_path.join("clinic.toml").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clinic-config");
    init(&config_path);

    clinic_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    clinic_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status_on_empty_store() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clinic-config");
    init(&config_path);

    clinic_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync Clinic"))
        .stdout(predicate::str::contains("Invoices:         0"))
        .stdout(predicate::str::contains("Next invoice:     INV-0001"));
}

#[test]
fn test_modes_include_configured_extras() {
    let (_tmp, dir) = setup();
    fs::write(
        Path::new(&dir).join("clinic.toml"),
        "[billing]\npayment_modes = [\"Insurance\", \"cash\"]\n",
    )
    .unwrap();

    clinic_cmd()
        .args(["-C", &dir, "modes"])
        .assert()
        .success()
        .stdout("M-Pesa\nCash\nBank\nInsurance\n");
}

#[test]
fn test_billable_lists_labs_then_drugs() {
    let (_tmp, dir) = setup();

    clinic_cmd()
        .args(["-C", &dir, "billable", "--patient", "p1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lab: CBC"))
        .stdout(predicate::str::contains("Drug: Amoxicillin (500mg)"))
        .stdout(predicate::str::contains("Malaria RDT").not());
}

#[test]
fn test_create_requires_patient() {
    let (_tmp, dir) = setup();

    clinic_cmd()
        .args(["-C", &dir, "create", "--item", "Consultation:1500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Select a patient"));

    clinic_cmd()
        .args(["-C", &dir, "create", "--patient", "nobody", "--item", "Consultation:1500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Patient 'nobody' not found"));
}

#[test]
fn test_create_requires_items() {
    let (_tmp, dir) = setup();

    clinic_cmd()
        .args(["-C", &dir, "create", "--patient", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No items specified"));

    clinic_cmd()
        .args(["-C", &dir, "create", "--patient", "p1", "--item", "Consultation"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid item format"));

    assert!(!fs::read_to_string(Path::new(&dir).join("records.json"))
        .unwrap()
        .contains("INV-0001"));
}

#[test]
fn test_create_with_billable_items() {
    let (_tmp, dir) = setup();

    clinic_cmd()
        .args([
            "-C",
            &dir,
            "create",
            "--patient",
            "p1",
            "--billable",
            "--item",
            "Consultation:1,500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created INV-0001"))
        .stdout(predicate::str::contains("Patient: Jane Wanjiku"))
        .stdout(predicate::str::contains("Items:   3"))
        .stdout(predicate::str::contains("Total:   KES 1,500.00"));
}

#[test]
fn test_pay_show_and_list() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);

    clinic_cmd()
        .args(["-C", &dir, "pay", "INV-0001", "500", "--mode", "mpesa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown payment mode 'mpesa'"));

    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "500", "--mode", "m-pesa", "--reference", "QK7X1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Recorded KES 500.00 M-Pesa payment for INV-0001 (PARTIAL, KES 1,000.00 due)",
        ));

    clinic_cmd()
        .args(["-C", &dir, "show", "inv-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice:  INV-0001 (PARTIAL)"))
        .stdout(predicate::str::contains("QK7X1"))
        .stdout(predicate::str::contains("Balance due: KES 1,000.00"))
        .stdout(predicate::str::contains("Thank you for choosing Sync Clinic"));

    clinic_cmd()
        .args(["-C", &dir, "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Wanjiku"))
        .stdout(predicate::str::contains("PARTIAL"))
        .stdout(predicate::str::contains("(=) OUTSTANDING"))
        .stdout(predicate::str::contains("Showing 1 of 1 invoices (All Time)"));
}

#[test]
fn test_pay_rejects_bad_input() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);

    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "0", "--mode", "Cash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than zero"));

    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payment mode is required"));

    clinic_cmd()
        .args(["-C", &dir, "pay", "5", "500", "--mode", "Cash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid invoice index"));

    clinic_cmd()
        .args(["-C", &dir, "pay", "INV-0404", "500", "--mode", "Cash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invoice 'INV-0404' not found"));
}

#[test]
fn test_edit_and_delete_payment() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);

    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "500", "--mode", "Cash"])
        .assert()
        .success();

    clinic_cmd()
        .args(["-C", &dir, "edit-payment", "1", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));

    clinic_cmd()
        .args(["-C", &dir, "edit-payment", "1", "1", "--amount", "1500", "--mode", "bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("KES 1,500.00 via Bank"))
        .stdout(predicate::str::contains("Paid KES 1,500.00 of KES 1,500.00 (PAID)"));

    clinic_cmd()
        .args(["-C", &dir, "delete-payment", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payment '2' not found on INV-0001"));

    clinic_cmd()
        .args(["-C", &dir, "delete-payment", "1", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Removed KES 1,500.00 payment from INV-0001 (UNPAID)",
        ));
}

#[test]
fn test_edit_replaces_items() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);

    clinic_cmd()
        .args([
            "-C",
            &dir,
            "edit",
            "INV-0001",
            "--item",
            "Consultation:1500",
            "--item",
            "Lab: CBC:800",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Items:  2"))
        .stdout(predicate::str::contains("Total:  KES 2,300.00"));
}

#[test]
fn test_history_and_audit() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);

    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "500", "--mode", "Cash"])
        .assert()
        .success();

    clinic_cmd()
        .args(["-C", &dir, "history", "INV-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice created for KES 1,500.00"))
        .stdout(predicate::str::contains("Payment of KES 500.00 via Cash"))
        .stdout(predicate::str::contains("Admin"));

    clinic_cmd()
        .args(["-C", &dir, "audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing"))
        .stdout(predicate::str::contains("Invoice INV-0001 - KES 1,500.00"));
}

#[test]
fn test_list_search_and_period() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);
    clinic_cmd()
        .args(["-C", &dir, "create", "--patient", "p2", "--item", "Lab: Malaria RDT:400"])
        .assert()
        .success();

    clinic_cmd()
        .args(["-C", &dir, "list", "--search", "ouma", "--period", "today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INV-0002"))
        .stdout(predicate::str::contains("INV-0001").not())
        .stdout(predicate::str::contains("Showing 1 of 2 invoices (Today)"));

    clinic_cmd()
        .args(["-C", &dir, "list", "--period", "fortnight"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid period"));

    clinic_cmd()
        .args(["-C", &dir, "list", "--from", "2020-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires both --from and --to"));

    clinic_cmd()
        .args(["-C", &dir, "list", "--from", "2020-01-01", "--to", "2020-12-31"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No invoices match"));
}

#[test]
fn test_report_exports_csv() {
    let (tmp, dir) = setup();
    create_consultation(&dir);
    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "600", "--mode", "M-Pesa"])
        .assert()
        .success();

    let csv_path = tmp.path().join("income.csv");
    clinic_cmd()
        .args(["-C", &dir, "report", "--period", "month", "--csv", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Income Report: This Month"))
        .stdout(predicate::str::contains("Total paid:   KES 600.00"))
        .stdout(predicate::str::contains("Outstanding:  KES 900.00"))
        .stdout(predicate::str::contains("M-Pesa"))
        .stdout(predicate::str::contains("Exported 1 invoices"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(
        csv,
        "\"Invoice\",\"Patient\",\"Total\",\"Paid\",\"Status\"\n\
         \"INV-0001\",\"Jane Wanjiku\",\"1500\",\"600\",\"partial\"\n"
    );
}

#[test]
fn test_quota_refuses_write_and_keeps_records() {
    let (_tmp, dir) = setup();
    fs::write(
        Path::new(&dir).join("clinic.toml"),
        "[storage]\nquota_bytes = 700\n",
    )
    .unwrap();
    let before = fs::read_to_string(Path::new(&dir).join("records.json")).unwrap();

    clinic_cmd()
        .args(["-C", &dir, "create", "--patient", "p1", "--item", "Consultation:1500"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage full"));

    let after = fs::read_to_string(Path::new(&dir).join("records.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_filtered_list_index_pays_the_listed_invoice() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);
    clinic_cmd()
        .args(["-C", &dir, "create", "--patient", "p2", "--item", "Consultation:800"])
        .assert()
        .success();

    // INV-0001 is second newest overall, so it keeps #2 when filtered
    clinic_cmd()
        .args(["-C", &dir, "list", "--search", "jane"])
        .assert()
        .success()
        .stdout(predicate::str::contains("│ 2 │ INV-0001 │"))
        .stdout(predicate::str::contains("INV-0002").not());

    clinic_cmd()
        .args(["-C", &dir, "pay", "2", "50", "--mode", "Cash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("payment for INV-0001"));
}

#[test]
fn test_show_reports_overpayment() {
    let (_tmp, dir) = setup();
    create_consultation(&dir);

    clinic_cmd()
        .args(["-C", &dir, "pay", "1", "2000", "--mode", "Cash"])
        .assert()
        .success();

    clinic_cmd()
        .args(["-C", &dir, "show", "INV-0001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice:  INV-0001 (OVERPAID)"))
        .stdout(predicate::str::contains("Balance due: KES 0.00"))
        .stdout(predicate::str::contains("(overpaid by KES 500.00)"));
}
