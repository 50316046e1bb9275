use anyhow::Context;
use anyhow::Result;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

const SAMPLE_PROGRAM: &str = r#"#include <iostream>

/*defiprompt
INPUTS:
3
1
2
3
OUTPUT:
6
-*-
INPUTS:
4
10
2
3
5
OUTPUT:
20
-*-
INPUTS:
5
8
-3
4
0
11
OUTPUT:
20
*/

int main() {
    return 0;
}
"#;

#[test]
fn sum_sample_inputs() -> Result<()> {
    for (input, expected) in [
        ("3\n1\n2\n3\n", "6\n"),
        ("4\n10\n2\n3\n5\n", "20\n"),
        ("5\n8\n-3\n4\n0\n11\n", "20\n"),
        ("0\n", "0\n"),
    ] {
        let output = run_sum(input)?;
        assert!(output.status.success(), "input {input:?}");
        assert_eq!(std::str::from_utf8(&output.stdout)?, expected);
    }
    Ok(())
}

#[test]
fn sum_is_repeatable() -> Result<()> {
    let first = run_sum("5\n8\n-3\n4\n0\n11\n")?;
    let second = run_sum("5\n8\n-3\n4\n0\n11\n")?;
    assert_eq!(first.stdout, second.stdout);
    Ok(())
}

#[test]
fn sum_malformed_input() -> Result<()> {
    for input in ["3\n1\n2\n", "abc\n1\n", ""] {
        let output = run_sum(input)?;
        assert_eq!(output.status.code(), Some(1), "input {input:?}");
        assert!(output.stdout.is_empty(), "input {input:?}");
    }
    Ok(())
}

/// Runs the samples in the sample program against `defi sum` itself.
#[test]
fn check_sample_program() -> Result<()> {
    let tmpdir = tempfile::tempdir()?;
    let source = tmpdir.path().join("new.cpp");
    std::fs::write(&source, SAMPLE_PROGRAM)?;
    let output = check_once(tmpdir.path(), &source)?;
    let stdout = std::str::from_utf8(&output.stdout)?;
    if !output.status.success() || !stdout.contains("Tests passed: 3/3") {
        print_output(&output);
        panic!("Sample program didn't pass");
    }
    Ok(())
}

#[test]
fn check_reports_failing_case() -> Result<()> {
    let tmpdir = tempfile::tempdir()?;
    let source = tmpdir.path().join("new.cpp");
    std::fs::write(&source, SAMPLE_PROGRAM.replacen("OUTPUT:\n6", "OUTPUT:\n7", 1))?;
    let output = check_once(tmpdir.path(), &source)?;
    assert_eq!(output.status.code(), Some(1));
    let stdout = std::str::from_utf8(&output.stdout)?;
    let stderr = std::str::from_utf8(&output.stderr)?;
    if !stdout.contains("Tests passed: 2/3") || !stderr.contains("case 1") {
        print_output(&output);
        panic!("Failure wasn't reported");
    }
    Ok(())
}

/// Makes sure that if we supply an invalid toml file, that the error message includes details of
/// the problem.
#[test]
fn invalid_config() -> Result<()> {
    let tmpdir = tempfile::tempdir()?;
    let source = tmpdir.path().join("new.cpp");
    std::fs::write(&source, SAMPLE_PROGRAM)?;
    let config_path = tmpdir.path().join("defi.toml");
    std::fs::write(&config_path, "invalid_key = true")?;
    let output = Command::new(defi_exe())
        .arg("--config")
        .arg(&config_path)
        .arg("check")
        .arg("--once")
        .arg(&source)
        .output()
        .with_context(|| format!("Failed to invoke `{}`", defi_exe().display()))?;
    assert!(!output.status.success());
    let stderr = std::str::from_utf8(&output.stderr)?;
    if !stderr.contains("invalid_key") {
        print_output(&output);
        panic!("Error doesn't mention invalid_key");
    }
    Ok(())
}

#[test]
fn once_without_matches() -> Result<()> {
    let tmpdir = tempfile::tempdir()?;
    let output = Command::new(defi_exe())
        .current_dir(tmpdir.path())
        .arg("check")
        .arg("--once")
        .arg(tmpdir.path())
        .output()?;
    assert!(!output.status.success());
    assert!(std::str::from_utf8(&output.stderr)?.contains("No matching files found"));
    Ok(())
}

/// Runs the watch loop briefly against a source without prompts. Errors from each run go to
/// stderr, the same as with `--once`.
#[test]
fn watch_reports_errors_on_stderr() -> Result<()> {
    let tmpdir = tempfile::tempdir()?;
    let source = tmpdir.path().join("new.cpp");
    std::fs::write(&source, "int main() { return 0; }")?;
    let mut child = Command::new(defi_exe())
        .current_dir(tmpdir.path())
        .arg("--colour")
        .arg("never")
        .arg("check")
        .arg("--interval")
        .arg("1")
        .arg("--run")
        .arg(defi_exe())
        .arg(&source)
        .arg("--")
        .arg("sum")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to invoke `{}`", defi_exe().display()))?;
    std::thread::sleep(std::time::Duration::from_secs(2));
    child.kill()?;
    let output = child.wait_with_output()?;
    let stdout = std::str::from_utf8(&output.stdout)?;
    let stderr = std::str::from_utf8(&output.stderr)?;
    if !stderr.contains("ERROR: ")
        || !stderr.contains("No defiprompt blocks")
        || stdout.contains("ERROR")
    {
        print_output(&output);
        panic!("Watch loop error wasn't written to stderr");
    }
    Ok(())
}

fn run_sum(input: &str) -> Result<Output> {
    let mut child = Command::new(defi_exe())
        .arg("sum")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to invoke `{}`", defi_exe().display()))?;
    child
        .stdin
        .take()
        .context("Missing stdin")?
        .write_all(input.as_bytes())?;
    Ok(child.wait_with_output()?)
}

fn check_once(dir: &Path, source: &Path) -> Result<Output> {
    Command::new(defi_exe())
        .current_dir(dir)
        .arg("--colour")
        .arg("never")
        .arg("check")
        .arg("--once")
        .arg("--run")
        .arg(defi_exe())
        .arg(source)
        .arg("--")
        .arg("sum")
        .output()
        .with_context(|| format!("Failed to invoke `{}`", defi_exe().display()))
}

fn print_output(output: &Output) {
    println!(
        "=== stdout ===\n{}\n=== stderr ===\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn defi_exe() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_defi"))
}
