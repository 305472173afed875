#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, tempdir};

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut accounts = NamedTempFile::new().unwrap();
    writeln!(accounts, "account, balance").unwrap();
    writeln!(accounts, "1, 100").unwrap();
    writeln!(accounts, "2, 50").unwrap();

    // 1. First run: move 30 from 1 to 2
    let mut transfers1 = NamedTempFile::new().unwrap();
    writeln!(transfers1, "from, to, amount").unwrap();
    writeln!(transfers1, "1, 2, 30").unwrap();

    let output1 = Command::new(cargo_bin!("bank-transfer"))
        .arg(transfers1.path())
        .arg("--accounts")
        .arg(accounts.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("1,70\n"));
    assert!(stdout1.contains("2,80\n"));

    // 2. Second run: same opening balances file, stored balances win
    let mut transfers2 = NamedTempFile::new().unwrap();
    writeln!(transfers2, "from, to, amount").unwrap();
    writeln!(transfers2, "2, 1, 80").unwrap();

    let output2 = Command::new(cargo_bin!("bank-transfer"))
        .arg(transfers2.path())
        .arg("--accounts")
        .arg(accounts.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("1,150\n"));
    assert!(stdout2.contains("2,0\n"));
}
