//! Integration tests for tfpack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn tfpack_cmd() -> Command {
    cargo_bin_cmd!("tfpack")
}

/// Writes a small template with a root module, a child module and state.
fn template(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("network");
    fs::create_dir_all(root.join("modules/subnet")).unwrap();
    fs::write(root.join("main.tf"), "terraform {}").unwrap();
    fs::write(root.join("modules/subnet/main.tf"), "variable \"cidr\" {}").unwrap();
    fs::write(root.join("terraform.tfstate"), "{}").unwrap();
    root
}

fn pack(source: &Path, output: &Path) {
    tfpack_cmd()
        .arg("pack")
        .arg(source)
        .arg("-o")
        .arg(output)
        .assert()
        .success();
}

#[test]
fn test_version_flag() {
    tfpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tfpack"));
}

#[test]
fn test_help_lists_subcommands() {
    tfpack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pack"))
        .stdout(predicate::str::contains("unpack"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_pack_and_unpack() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let archive = temp.path().join("network.tar");

    tfpack_cmd()
        .arg("pack")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive created"));

    let dest = temp.path().join("out");
    tfpack_cmd()
        .arg("unpack")
        .arg(&archive)
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"));

    assert_eq!(
        fs::read_to_string(dest.join("modules/subnet/main.tf")).unwrap(),
        "variable \"cidr\" {}"
    );
    assert!(!dest.join("terraform.tfstate").exists());
}

#[test]
fn test_pack_default_output_name() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let workdir = TempDir::new().unwrap();

    tfpack_cmd()
        .current_dir(workdir.path())
        .arg("pack")
        .arg(&source)
        .assert()
        .success();

    assert!(workdir.path().join("network.tar").is_file());
}

#[test]
fn test_pack_refuses_overwrite_without_force() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let archive = temp.path().join("network.tar");
    fs::write(&archive, "old").unwrap();

    tfpack_cmd()
        .arg("pack")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    tfpack_cmd()
        .arg("pack")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .arg("--force")
        .assert()
        .success();
    assert!(fs::metadata(&archive).unwrap().len() > 512);
}

#[test]
fn test_pack_limit_exceeded() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let archive = temp.path().join("network.tar");

    tfpack_cmd()
        .arg("pack")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .arg("--limit")
        .arg("16")
        .assert()
        .failure()
        .stderr(predicate::str::contains("archive too big: must be < 16 bytes"));

    assert!(!archive.exists());
}

#[test]
fn test_pack_no_template_files() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("README.md"), "# docs").unwrap();

    tfpack_cmd()
        .arg("pack")
        .arg(&docs)
        .arg("-o")
        .arg(temp.path().join("docs.tar"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "is not a valid template since it has no .tf files",
        ));
}

#[test]
fn test_pack_json_output() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let archive = temp.path().join("network.tar");

    let output = tfpack_cmd()
        .arg("--json")
        .arg("pack")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "pack");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["files_added"], 2);
    assert_eq!(json["data"]["directories_added"], 2);
}

#[test]
fn test_list() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let archive = temp.path().join("network.tar");
    pack(&source, &archive);

    tfpack_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("modules/subnet/main.tf"))
        .stdout(predicate::str::contains("Total: 4 entries"));
}

#[test]
fn test_list_json_flags_unsafe_entry() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.tar");

    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    let name = b"../../escape.tf";
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_size(4);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    builder.append(&header, &b"evil"[..]).unwrap();
    fs::write(&archive, builder.into_inner().unwrap()).unwrap();

    let output = tfpack_cmd()
        .arg("list")
        .arg(&archive)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"][0]["path"], "../../escape.tf");
    assert!(json["data"][0]["rejection"].is_string());

    let dest = temp.path().join("dest");
    tfpack_cmd()
        .arg("unpack")
        .arg(&archive)
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Entries skipped: 1"));
    assert!(!temp.path().join("escape.tf").exists());
}

#[test]
fn test_unpack_oversized_file() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("big");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("main.tf"), "#".repeat(4096)).unwrap();
    let archive = temp.path().join("big.tar");
    pack(&source, &archive);

    tfpack_cmd()
        .arg("unpack")
        .arg(&archive)
        .arg(temp.path().join("rejected"))
        .arg("--max-file-size")
        .arg("1K")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-file-size"));

    let dest = temp.path().join("truncated");
    tfpack_cmd()
        .arg("unpack")
        .arg(&archive)
        .arg(&dest)
        .arg("--max-file-size")
        .arg("1K")
        .arg("--truncate")
        .assert()
        .success();
    assert_eq!(fs::metadata(dest.join("main.tf")).unwrap().len(), 1024);
}

#[test]
fn test_unpack_corrupted_archive() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("garbage.tar");
    fs::write(&archive, vec![0x41u8; 1024]).unwrap();

    tfpack_cmd()
        .arg("unpack")
        .arg(&archive)
        .arg(temp.path().join("dest"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive"));
}

#[test]
fn test_unpack_missing_archive() {
    let temp = TempDir::new().unwrap();

    tfpack_cmd()
        .arg("unpack")
        .arg(temp.path().join("missing.tar"))
        .arg(temp.path().join("dest"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open archive"));
}

#[test]
fn test_quiet_suppresses_output() {
    let temp = TempDir::new().unwrap();
    let source = template(&temp);
    let archive = temp.path().join("network.tar");

    tfpack_cmd()
        .arg("--quiet")
        .arg("pack")
        .arg(&source)
        .arg("-o")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
