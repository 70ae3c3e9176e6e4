//! Runs the built `idlsync` binary against throwaway workspaces.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(temp_dir: &TempDir, workspace: &Path, args: &[&str]) -> Output {
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&home).unwrap();
    Command::new(env!("CARGO_BIN_EXE_idlsync"))
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("IDLSYNC_LOG")
        .env_remove("IDLSYNC_ENV")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_init_then_status() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let output = run(&temp_dir, &workspace, &["--quiet", "init"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(workspace.join("idlsync.toml").is_file());

    let again = run(&temp_dir, &workspace, &["--quiet", "init"]);
    assert!(again.status.success());
    assert!(String::from_utf8_lossy(&again.stdout).contains("already exists"));

    let status = run(&temp_dir, &workspace, &["--quiet", "status", "--format", "json"]);
    assert!(status.status.success(), "{:?}", status);
    let value: serde_json::Value = serde_json::from_slice(&status.stdout).unwrap();
    assert_eq!(value["source_count"], 0);
}

#[test]
fn test_invalid_config_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(
        workspace.join("idlsync.toml"),
        "[project]\ndependencies = [\"broken\"]\n",
    )
    .unwrap();

    let output = run(&temp_dir, &workspace, &["--quiet", "compile"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}

#[test]
fn test_logs_go_to_stderr_not_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let output = run(
        &temp_dir,
        &workspace,
        &["--verbose", "status", "--format", "json"],
    );
    assert!(output.status.success(), "{:?}", output);
    // stdout is pure JSON even with debug logging on
    assert!(serde_json::from_slice::<serde_json::Value>(&output.stdout).is_ok());
    assert!(!output.stderr.is_empty());
}

#[cfg(unix)]
#[test]
fn test_compile_reports_compiler_exit_code() {
    use crate::integration::test_utils::{write_source, FakeCompiler};

    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_source(&workspace.join("idl"), "a.def", 100);
    let compiler = FakeCompiler::failing(&temp_dir.path().join("bin"), 7);
    fs::write(
        workspace.join("idlsync.toml"),
        format!(
            "[project]\nsource_dir = \"idl\"\noutput_dir = \"gen\"\nidl_extension = \"def\"\n\n[compiler]\nbinary = \"{}\"\n",
            compiler.binary.display()
        ),
    )
    .unwrap();

    let output = run(&temp_dir, &workspace, &["--quiet", "compile"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("exited with code 7"));
}

#[cfg(unix)]
#[test]
fn test_compile_json_lists_generated_files() {
    use crate::integration::test_utils::{write_source, FakeCompiler};

    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_source(&workspace.join("idl"), "user.def", 100);
    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    fs::write(
        workspace.join("idlsync.toml"),
        format!(
            "[project]\nsource_dir = \"idl\"\noutput_dir = \"gen\"\nidl_extension = \"def\"\ngenerated_extension = \"gen\"\n\n[compiler]\nbinary = \"{}\"\n",
            compiler.binary.display()
        ),
    )
    .unwrap();

    let output = run(&temp_dir, &workspace, &["--quiet", "compile", "--format", "json"]);
    assert!(output.status.success(), "{:?}", output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "compiled");
    assert!(value["generated_files"][0]
        .as_str()
        .unwrap()
        .ends_with("gen/user.gen"));

    let second = run(&temp_dir, &workspace, &["--quiet", "compile", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert_eq!(value["state"], "skipped");
    assert_eq!(compiler.invocations().len(), 1);
}

#[cfg(unix)]
#[test]
fn test_compiler_stdout_does_not_corrupt_json() {
    use crate::integration::test_utils::{write_source, FakeCompiler};

    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_source(&workspace.join("idl"), "chatty.def", 100);
    let compiler = FakeCompiler::succeeding(&temp_dir.path().join("bin"));
    fs::write(
        workspace.join("idlsync.toml"),
        format!(
            "[project]\nsource_dir = \"idl\"\noutput_dir = \"gen\"\nidl_extension = \"def\"\n\n[compiler]\nbinary = \"{}\"\n",
            compiler.binary.display()
        ),
    )
    .unwrap();

    let output = run(&temp_dir, &workspace, &["--quiet", "compile", "--format", "json"]);
    assert!(output.status.success(), "{:?}", output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {:?}", e, output));
    assert_eq!(value["state"], "compiled");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Generating code for"));
}
