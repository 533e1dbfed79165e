//! Common test utilities shared across integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::json;

/// Path of the compiled `codemap` binary.
pub fn codemap_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_codemap"))
}

/// Run the codemap binary against the workspace at `dir`.
pub fn run_codemap_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(codemap_binary())
        .arg("--workspace")
        .arg(dir)
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute codemap binary")
}

/// Write a small fact file into `dir` and return its name.
///
/// `main.run` and `api.login` call `auth.validate`, which calls `db.query`.
/// `db.query` and `db.pool` call each other.
pub fn write_sample_facts(dir: &Path) -> &'static str {
    let facts = json!({
        "symbols": [
            {"qualified_name": "main.run", "kind": "function", "file": "main.py", "line": 1},
            {"qualified_name": "api.login", "kind": "function", "file": "api.py", "line": 4},
            {"qualified_name": "auth", "kind": "module", "file": "auth.py", "line": 1},
            {"qualified_name": "auth.validate", "kind": "function", "file": "auth.py", "line": 3,
             "docstring": "Check credentials."},
            {"qualified_name": "auth.hash_password", "kind": "function", "file": "auth.py", "line": 12},
            {"qualified_name": "db.query", "kind": "function", "file": "db.py", "line": 8},
            {"qualified_name": "db.pool", "kind": "function", "file": "db.py", "line": 20}
        ],
        "dependencies": [
            {"from_sym": "main.run", "to_sym": "auth.validate",
             "location": {"file": "main.py", "line": 2}},
            {"from_sym": "api.login", "to_sym": "auth.validate"},
            {"from_sym": "auth.validate", "to_sym": "db.query"},
            {"from_sym": "auth.validate", "to_sym": "auth.hash_password"},
            {"from_sym": "db.query", "to_sym": "db.pool"},
            {"from_sym": "db.pool", "to_sym": "db.query"},
            {"from_sym": "main.run", "to_sym": "auth", "kind": "imports"}
        ]
    });
    fs::write(
        dir.join("facts.json"),
        serde_json::to_string_pretty(&facts).expect("serialize facts"),
    )
    .expect("write facts");
    "facts.json"
}

/// Write a fact file in which `n` functions all call each other.
pub fn write_dense_facts(dir: &Path, n: usize) -> &'static str {
    let mut symbols = Vec::new();
    let mut dependencies = Vec::new();
    for from in 0..n {
        symbols.push(json!({
            "qualified_name": format!("mesh.f{from}"),
            "kind": "function",
            "file": "mesh.py",
            "line": from + 1
        }));
        for to in (0..n).filter(|to| *to != from) {
            dependencies.push(json!({
                "from_sym": format!("mesh.f{from}"),
                "to_sym": format!("mesh.f{to}")
            }));
        }
    }

    let facts = json!({"symbols": symbols, "dependencies": dependencies});
    fs::write(
        dir.join("dense.json"),
        serde_json::to_string(&facts).expect("serialize facts"),
    )
    .expect("write facts");
    "dense.json"
}

/// Stdout of `output` as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of `output` as a string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
