//! CLI integration tests for every subcommand.
//!
//! Uses `assert_cmd` to spawn the `platon` binary against PL files written
//! into a temporary directory.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "author = Alice\nversion = 1\ntitle = Demo\nstatement = Do X\nformState =\n";

fn platon() -> Command {
    let mut cmd = cargo_bin_cmd!("platon");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    platon()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PL exercise file toolchain"));
}

#[test]
fn version_exits_0() {
    platon()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("platon"));
}

// ──────────────────────────────────────────────
// 2. Parse subcommand
// ──────────────────────────────────────────────

#[test]
fn parse_prints_document_json() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "demo.pl", &format!("{HEADER}a.b = 3\na.c % [1, 2, 3]\n"));

    let out = platon()
        .current_dir(tmp.path())
        .args(["parse", "demo.pl"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["format"], "pl");
    assert_eq!(doc["data"]["a"], serde_json::json!({"b": 3, "c": [1, 2, 3]}));
    assert_eq!(doc["data"]["formState"], "");
    assert_eq!(doc["warnings"], serde_json::json!([]));
}

#[test]
fn parse_follows_extends_and_dependencies_on_disk() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "lib/base.pl", &format!("{HEADER}@ grader.py\n"));
    write(tmp.path(), "lib/grader.py", "print('ok')\n");
    write(
        tmp.path(),
        "exos/child.pl",
        "extends = ../lib/base.pl\ntitle = Child\nstatement =@ statement.md\n",
    );
    write(tmp.path(), "exos/statement.md", "# Sort a list");

    let out = platon()
        .current_dir(tmp.path())
        .args(["parse", "exos/child.pl", "--resource-id", "7"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["data"]["title"], "Child");
    assert_eq!(doc["data"]["statement"], "# Sort a list");
    assert_eq!(doc["dependencies"][0]["alias"], "grader.py");
    assert_eq!(doc["dependencies"][0]["path"]["resource_id"], 7);
    assert_eq!(doc["path"]["path"], "exos/child.pl");
}

#[test]
fn parse_reports_warnings_on_stderr_in_text_mode() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "demo.pl", &format!("{HEADER}title = Again\n"));

    platon()
        .current_dir(tmp.path())
        .args(["parse", "demo.pl"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Overwriting existing value at key \"title\"",
        ));
}

#[test]
fn parse_syntax_error_exits_1_with_line() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "bad.pl", &format!("{HEADER}??? what\n"));

    platon()
        .current_dir(tmp.path())
        .args(["parse", "bad.pl"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 6"))
        .stderr(predicate::str::contains("??? what"));
}

#[test]
fn parse_error_json_has_kind_and_line() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "bad.pl", "text ==\nnever closed\n");

    let out = platon()
        .current_dir(tmp.path())
        .args(["--output", "json", "parse", "bad.pl"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let err: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(err["kind"], "syntax");
    assert_eq!(err["line"], 1);
}

#[test]
fn parse_missing_mandatory_key_and_opt_out() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "partial.pl", "title = Only a title\n");

    platon()
        .current_dir(tmp.path())
        .args(["parse", "partial.pl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("author"));

    platon()
        .current_dir(tmp.path())
        .args(["parse", "partial.pl", "--no-mandatory-keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Only a title"));
}

#[test]
fn parse_inheritance_loop_exits_1() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "a.pl", "extends = b.pl\n");
    write(tmp.path(), "b.pl", "extends = a.pl\n");

    platon()
        .current_dir(tmp.path())
        .args(["parse", "a.pl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.pl"))
        .stderr(predicate::str::contains("b.pl"));
}

#[test]
fn parse_max_depth_is_enforced() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "l0.pl", "extends = l1.pl\n");
    write(tmp.path(), "l1.pl", "extends = l2.pl\n");
    write(tmp.path(), "l2.pl", "x = 1\n");

    let out = platon()
        .current_dir(tmp.path())
        .args(["--output", "json", "parse", "l0.pl", "--no-mandatory-keys", "--max-depth", "2"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let err: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(err["kind"], "inheritance_too_deep");

    platon()
        .current_dir(tmp.path())
        .args(["parse", "l0.pl", "--no-mandatory-keys", "--max-depth", "3"])
        .assert()
        .success();
}

#[test]
fn parse_unknown_extension_exits_1() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "exercise.yaml", "title: nope\n");

    platon()
        .current_dir(tmp.path())
        .args(["parse", "exercise.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no parser for extension .yaml"));
}

#[test]
fn parse_nonexistent_file_exits_1() {
    platon()
        .args(["parse", "/nonexistent/exercise.pl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn quiet_suppresses_error_text() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "bad.pl", "???\n");

    platon()
        .current_dir(tmp.path())
        .args(["--quiet", "parse", "bad.pl"])
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. Check subcommand
// ──────────────────────────────────────────────

#[test]
fn check_valid_file_prints_ok() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "demo.pl", HEADER);

    platon()
        .current_dir(tmp.path())
        .args(["check", "demo.pl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: demo.pl"));
}

#[test]
fn check_json_summary() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "demo.pl", &format!("{HEADER}title = Again\n@ demo.pl [self.pl]\n"));

    let out = platon()
        .current_dir(tmp.path())
        .args(["check", "demo.pl", "--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(summary["ok"], true);
    assert_eq!(summary["keys"], 5);
    assert_eq!(summary["dependencies"], 1);
    assert_eq!(summary["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn check_invalid_file_exits_1() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "bad.pl", &format!("{HEADER}w =: NoSuchWidget\n"));

    platon()
        .current_dir(tmp.path())
        .args(["check", "bad.pl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NoSuchWidget"));
}

// ──────────────────────────────────────────────
// 4. Extensions subcommand
// ──────────────────────────────────────────────

#[test]
fn extensions_lists_pl() {
    platon()
        .arg("extensions")
        .assert()
        .success()
        .stdout(predicate::str::contains(".pl\tpl"));
}

#[test]
fn extensions_json() {
    let out = platon()
        .args(["extensions", "--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(listed, serde_json::json!([{"extension": "pl", "format": "pl"}]));
}
