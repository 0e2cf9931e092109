use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn codesense() -> Command {
    Command::cargo_bin("codesense").unwrap()
}

#[test]
fn analyze_prints_json_contract() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.py"), "def f():\n    return eval(x)\n").unwrap();

    let output = codesense()
        .arg("analyze")
        .arg(dir.path())
        .arg("--no-parallel")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for field in ["metrics", "smells", "risks", "summary"] {
        assert!(value.get(field).is_some(), "missing {field}");
    }
    assert!(value.get("error").is_none());
    assert_eq!(value["summary"]["total_files"], 1);
    assert_eq!(value["smells"][0]["path"], "app.py");
}

#[test]
fn terminal_format_shows_summary() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.js"), "el.innerHTML = html;\n").unwrap();

    let output = codesense()
        .args(["analyze", "--format", "terminal", "--top", "3"])
        .arg(dir.path())
        .env("NO_COLOR", "1")
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("Files analyzed:  1"));
    assert!(text.contains("app.js"));
}

#[test]
fn missing_root_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let output = codesense()
        .arg("analyze")
        .arg(dir.path().join("missing"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["error"].is_string());
}

#[test]
fn ignore_dir_flag_prunes_directories() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("vendor")).unwrap();
    fs::write(dir.path().join("vendor/lib.py"), "exec(x)\n").unwrap();
    fs::write(dir.path().join("main.py"), "x = 1\n").unwrap();

    let output = codesense()
        .arg("analyze")
        .arg(dir.path())
        .args(["--ignore-dir", "vendor"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["total_files"], 1);
    assert_eq!(value["metrics"][0]["path"], "main.py");
}

#[test]
fn init_writes_config_once() {
    let dir = TempDir::new().unwrap();

    codesense()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .success();
    assert!(dir.path().join(".codesense.toml").exists());

    codesense()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .failure();

    codesense()
        .args(["init", "--force"])
        .current_dir(dir.path())
        .assert()
        .success();
}

#[test]
fn explicit_bad_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[thresholds]\ncomplexity = \"high\"\n").unwrap();

    codesense()
        .arg("analyze")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}
