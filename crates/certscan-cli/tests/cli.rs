//! End-to-end tests for the certscan binary

use assert_cmd::Command;
use certscan_core::record::{Field, FIELD_COUNT};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SUFFIX_LIST: &str = "\
// ===BEGIN ICANN DOMAINS===
com
uk
co.uk
// ===END ICANN DOMAINS===
// ===BEGIN PRIVATE DOMAINS===
blogspot.com
// ===END PRIVATE DOMAINS===
";

const POLICY_TABLE: &str = "\
CA name,DV OIDs,OV OIDs,EV OIDs
Example Trust,2.23.140.1.2.1,2.23.140.1.2.2,2.23.140.1.1
";

fn setup() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("effective_tld_names.dat"), SUFFIX_LIST).unwrap();
    fs::write(dir.path().join("capolicies.csv"), POLICY_TABLE).unwrap();
    dir
}

fn certscan(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("certscan").unwrap();
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn row(id: u32, valid: bool) -> String {
    let mut fields = vec![String::new(); FIELD_COUNT];
    fields[Field::CertificateId.index()] = id.to_string();
    fields[Field::Subject.index()] = format!("CN=www{id}.example.com, O=Example Corp, C=US");
    fields[Field::Issuer.index()] = "CN=Example CA, O=Example Trust".into();
    fields[Field::IsSelfSigned.index()] = "f".into();
    fields[Field::NotValidBefore.index()] = "2014-01-01 00:00:00".into();
    fields[Field::NotValidAfter.index()] = "2015-01-01 00:00:00".into();
    fields[Field::IsValid.index()] = if valid { "t" } else { "f" }.into();
    fields[Field::IsWindowsValid.index()] = "t".into();
    fields[Field::SubjectAltName.index()] = format!("DNS:www{id}.example.com");
    fields[Field::CertificatePolicies.index()] = "Policy: 2.23.140.1.1".into();
    fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",")
}

fn write_scan(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

#[test]
fn test_help() {
    let dir = setup();
    certscan(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--nobrowservalid"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_scan_writes_kept_records_and_summary() {
    let dir = setup();
    write_scan(dir.path(), "scan.csv", &[row(1, true), row(2, false)]);

    certscan(dir.path())
        .args(["-q", "-o", "kept.csv", "scan.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Record counts:"))
        .stdout(predicate::str::contains("50.00% kept."))
        .stdout(predicate::str::contains("certscan").not());

    let kept = fs::read_to_string(dir.path().join("kept.csv")).unwrap();
    assert_eq!(kept.lines().count(), 1);
    assert!(kept.starts_with("1,"));
}

#[test]
fn test_scan_flags_relax_filter() {
    let dir = setup();
    write_scan(dir.path(), "scan.csv", &[row(1, true), row(2, false)]);

    certscan(dir.path())
        .args(["scan", "--novalid", "--policy", "EV", "scan.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.00% kept."));
}

#[test]
fn test_scan_policy_mismatch_discards() {
    let dir = setup();
    write_scan(dir.path(), "scan.csv", &[row(1, true)]);

    certscan(dir.path())
        .args(["--preset", "dv", "scan.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.00% kept."));
}

#[test]
fn test_scan_writes_bulk_files() {
    let dir = setup();
    write_scan(dir.path(), "scan.csv", &[row(1, true), row(2, true)]);

    certscan(dir.path())
        .args(["--bulk", "--spool-dir", "spool", "--load-policies", "scan.csv"])
        .assert()
        .success();

    let script = fs::read_to_string(dir.path().join("spool").join("load.sql")).unwrap();
    assert!(script.contains("INTO TABLE certs"));
    assert!(script.contains("INTO TABLE capolicies"));
}

#[test]
fn test_scan_aborts_on_too_many_bad_lines() {
    let dir = setup();
    let mut lines: Vec<String> = (0..5).map(|_| "short,row".to_string()).collect();
    lines.push(row(1, true));
    write_scan(dir.path(), "scan.csv", &lines);

    certscan(dir.path())
        .args(["--max-bad-lines", "3", "scan.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Too many bad lines"));
}

#[test]
fn test_scan_requires_inputs() {
    let dir = setup();
    certscan(dir.path())
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No input files"));
}

#[test]
fn test_scan_missing_suffix_list() {
    let dir = setup();
    write_scan(dir.path(), "scan.csv", &[row(1, true)]);

    certscan(dir.path())
        .args(["--suffix-list", "nowhere.dat", "scan.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere.dat"));
}

#[test]
fn test_domain_command() {
    let dir = setup();
    certscan(dir.path())
        .args(["domain", "shop.example.co.uk", "example.co.uk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("registrable:  example.co.uk"))
        .stdout(predicate::str::contains("subdomain:    shop"))
        .stdout(predicate::str::contains("same registrable domain"));
}

#[test]
fn test_domain_without_suffix() {
    let dir = setup();
    certscan(dir.path())
        .args(["domain", "intranet.local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no public suffix"));
}

#[test]
fn test_suffixes_skip_private_section() {
    let dir = setup();
    certscan(dir.path())
        .arg("suffixes")
        .assert()
        .success()
        .stdout(predicate::str::contains("co.uk"))
        .stdout(predicate::str::contains("blogspot").not());
}

#[test]
fn test_policies_command() {
    let dir = setup();
    certscan(dir.path())
        .arg("policies")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"2\.23\.140\.1\.1\s+EV\s+Example Trust").unwrap());
}

#[test]
fn test_config_generate_then_validate() {
    let dir = setup();
    certscan(dir.path())
        .args(["config", "generate", "--preset", "ev", "-o", "ev.toml"])
        .assert()
        .success();

    certscan(dir.path())
        .args(["config", "validate", "ev.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preset: ev"))
        .stdout(predicate::str::contains("Required policy: EV"));

    certscan(dir.path())
        .args(["config", "generate", "-o", "ev.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = setup();
    fs::write(
        dir.path().join("certscan.toml"),
        "[keep]\nkeep_invalid = true\n",
    )
    .unwrap();
    write_scan(dir.path(), "scan.csv", &[row(1, true), row(2, false)]);

    certscan(dir.path())
        .arg("scan.csv")
        .assert()
        .success()
        .stdout(predicate::str::contains("100.00% kept."));
}

#[test]
fn test_config_presets() {
    let dir = setup();
    certscan(dir.path())
        .args(["config", "presets"])
        .assert()
        .success()
        .stdout(predicate::str::contains("untrusted"))
        .stdout(predicate::str::contains("strict"));
}

#[test]
fn test_completions() {
    let dir = setup();
    certscan(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("certscan"));
}
