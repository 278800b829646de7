use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const README: &str = "# Demo\n\n```mermaid\ngraph TD\n  A-->B\n```\n\nText.\n\n```mermaid\nsequenceDiagram\n  A->>B: hi\n```\n";

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("readme-diagrams"))
}

fn write_readme(dir: &Path, text: &str) {
    fs::write(dir.join("README.md"), text).expect("write README.md");
}

fn write_puppeteer_config(dir: &Path) {
    fs::create_dir_all(dir.join("scripts")).expect("mkdir scripts");
    fs::write(
        dir.join("scripts").join("puppeteer-config.json"),
        r#"{ "args": ["--no-sandbox"] }"#,
    )
    .expect("write puppeteer config");
}

fn list_dir(dir: &Path) -> Vec<String> {
    let Ok(rd) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = rd
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// An `mmdc` stand-in: copies the `-i` file to the `-o` path and logs its arguments.
#[cfg(unix)]
fn fake_renderer(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-mmdc.sh");
    let script = r#"#!/bin/sh
log="$(dirname "$0")/renderer.log"
echo "$@" >> "$log"
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) shift; in="$1" ;;
    -o) shift; out="$1" ;;
  esac
  shift
done
[ -n "$in" ] && [ -n "$out" ] || exit 3
cp "$in" "$out"
"#;
    fs::write(&path, script).expect("write fake renderer");
    let mut perms = fs::metadata(&path).expect("stat").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    path
}

#[test]
fn missing_readme_fails_before_writing_anything() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_puppeteer_config(tmp.path());

    let out = cli()
        .current_dir(tmp.path())
        .output()
        .expect("run readme-diagrams");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("README.md not found"), "stderr: {stderr}");
    assert_eq!(list_dir(tmp.path()), vec!["scripts".to_string()]);
}

#[test]
fn missing_puppeteer_config_fails_before_writing_anything() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_readme(tmp.path(), README);

    let out = cli()
        .current_dir(tmp.path())
        .output()
        .expect("run readme-diagrams");

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("scripts/puppeteer-config.json not found"),
        "stderr: {stderr}"
    );
    assert_eq!(list_dir(tmp.path()), vec!["README.md".to_string()]);
}

#[test]
fn readme_without_diagrams_is_a_successful_no_op() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let text = "# Plain\n\nNo diagrams.\n";
    write_readme(tmp.path(), text);
    write_puppeteer_config(tmp.path());

    cli()
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("No mermaid blocks found in README.md. Nothing to do.\n");

    assert_eq!(fs::read_to_string(tmp.path().join("README.md")).unwrap(), text);
    assert!(!tmp.path().join("docs").exists());
}

#[test]
fn usage_errors_exit_with_code_two() {
    let out = cli().arg("--format").arg("gif").output().expect("run");
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("USAGE:"));

    let out = cli().arg("--bogus").output().expect("run");
    assert_eq!(out.status.code(), Some(2));
}

#[cfg(unix)]
#[test]
fn renders_and_patches_readme_idempotently() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_readme(tmp.path(), README);
    write_puppeteer_config(tmp.path());
    let renderer = fake_renderer(tmp.path());

    let out = cli()
        .current_dir(tmp.path())
        .arg("--renderer")
        .arg(&renderer)
        .output()
        .expect("run readme-diagrams");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Patched README.md with PNG fallbacks"), "stdout: {stdout}");
    assert!(stdout.contains("Rendered 2 diagram(s) into docs/diagrams"), "stdout: {stdout}");

    let images = list_dir(&tmp.path().join("docs").join("diagrams"));
    assert_eq!(images.len(), 2);
    assert!(images[0].starts_with("readme-diagram-01-"));
    assert!(images[1].starts_with("readme-diagram-02-"));
    let rendered = fs::read_to_string(tmp.path().join("docs/diagrams").join(&images[0])).unwrap();
    assert_eq!(rendered, "graph TD\n  A-->B\n");

    let log = fs::read_to_string(tmp.path().join("renderer.log")).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.contains("-p ./scripts/puppeteer-config.json") || log.contains("-p scripts/puppeteer-config.json"), "log: {log}");
    assert!(log.contains("-b transparent"), "log: {log}");

    let patched = fs::read_to_string(tmp.path().join("README.md")).unwrap();
    for (i, image) in images.iter().enumerate() {
        let expected = format!("![Diagram {}](docs/diagrams/{image})\n\n```mermaid", i + 1);
        assert!(patched.contains(&expected), "README missing {expected:?}:\n{patched}");
    }

    let out = cli()
        .current_dir(tmp.path())
        .arg("--renderer")
        .arg(&renderer)
        .output()
        .expect("run readme-diagrams again");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("README.md already contains PNG fallbacks for detected blocks"),
        "stdout: {stdout}"
    );
    assert_eq!(fs::read_to_string(tmp.path().join("README.md")).unwrap(), patched);
    assert_eq!(list_dir(&tmp.path().join("docs").join("diagrams")), images);
}

#[cfg(unix)]
#[test]
fn renderer_failure_exits_non_zero_and_keeps_readme() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_readme(tmp.path(), README);

    let out = cli()
        .current_dir(tmp.path())
        .args(["--no-config", "--renderer", "false"])
        .output()
        .expect("run readme-diagrams");

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("renderer `false` failed"));
    assert_eq!(fs::read_to_string(tmp.path().join("README.md")).unwrap(), README);
}

#[cfg(unix)]
#[test]
fn json_report_lists_each_diagram() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_readme(tmp.path(), README);
    let renderer = fake_renderer(tmp.path());

    let out = cli()
        .current_dir(tmp.path())
        .arg("--no-config")
        .arg("--renderer")
        .arg(&renderer)
        .arg("--json")
        .output()
        .expect("run readme-diagrams");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(value["status"], "processed");
    assert_eq!(value["readme_changed"], true);
    let diagrams = value["diagrams"].as_array().expect("diagrams array");
    assert_eq!(diagrams.len(), 2);
    assert_eq!(diagrams[1]["index"], 2);
    assert_eq!(diagrams[1]["patch"], "inserted");
}

#[test]
fn dry_run_reports_without_rendering() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_readme(tmp.path(), README);

    let out = cli()
        .current_dir(tmp.path())
        .args(["--no-config", "--dry-run", "--renderer", "readme-diagrams-no-such-renderer"])
        .output()
        .expect("run readme-diagrams");

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("would render diagram 1 -> docs/diagrams/readme-diagram-01-"));
    assert!(stdout.contains("README.md would be patched with PNG fallbacks"));
    assert_eq!(fs::read_to_string(tmp.path().join("README.md")).unwrap(), README);
    assert!(!tmp.path().join("docs").exists());
}
