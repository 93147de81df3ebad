use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fplan(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fplan").expect("找不到 fplan 可执行文件");
    cmd.current_dir(workdir)
        .env_remove("FPLAN_CONFIG")
        .env_remove("FPLAN_PLAN")
        .env("RUST_LOG", "off");
    cmd
}

fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path).expect("读取输出文件失败");
    serde_json::from_str(&text).expect("输出文件不是合法 JSON")
}

#[test]
fn demo_report_lists_the_apartment() {
    let dir = tempfile::tempdir().unwrap();
    fplan(dir.path())
        .arg("--demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("已载入内置示例户型"))
        .stdout(predicate::str::contains("平面图: Complex Apartment Layout"))
        .stdout(predicate::str::contains("房间数: 24, 给排水点: 5"))
        .stdout(predicate::str::contains("历史: 可撤销 0 步, 可重做 0 步"));
}

#[test]
fn scripted_edits_are_saved() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("kitchen.json");
    fplan(dir.path())
        .args(["--exec", "add_room kitchen"])
        .args(["--exec", "add_plumbing 100 100"])
        .args(["--exec", "rename_room room-1 Galley Kitchen"])
        .arg("--save")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("[命令] 已新建房间 room-1"))
        .stdout(predicate::str::contains("\"Galley Kitchen\""))
        .stdout(predicate::str::contains("校验: 全部通过"));

    let saved = read_json(&out);
    assert_eq!(saved["name"], "New Project");
    assert_eq!(saved["rooms"].as_array().unwrap().len(), 1);
    assert_eq!(saved["rooms"][0]["type"], "kitchen");
    assert_eq!(saved["plumbingPoints"][0]["id"], "plumbing-1");
}

#[test]
fn saved_plan_can_be_reloaded_and_edited() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    fplan(dir.path())
        .args(["--exec", "add_room toilet", "--save"])
        .arg(&first)
        .assert()
        .success();

    fplan(dir.path())
        .arg("--plan")
        .arg(&first)
        .args(["--exec", "rotate_room room-1", "--exec", "move_room room-1 300 40"])
        .arg("--save")
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("已从 JSON 加载平面图"))
        .stdout(predicate::str::contains("旋转=90°"));

    let saved = read_json(&second);
    assert_eq!(saved["rooms"][0]["rotation"], 90);
    assert_eq!(saved["rooms"][0]["x"], 300.0);
}

#[test]
fn plan_is_taken_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("env.json");
    fs::write(&plan, r#"{"name": "From Env", "rooms": []}"#).unwrap();

    fplan(dir.path())
        .env("FPLAN_PLAN", &plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("平面图: From Env"));
}

#[test]
fn invalid_plan_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("broken.json");
    fs::write(&plan, r#"{"name": "No rooms"}"#).unwrap();

    fplan(dir.path())
        .arg("--plan")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("加载平面图失败"))
        .stdout(predicate::str::contains("平面图: New Project"));
}

#[test]
fn failing_command_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    fplan(dir.path())
        .args(["--exec", "delete_room ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delete_room ghost"));
}

#[test]
fn plan_and_demo_conflict() {
    let dir = tempfile::tempdir().unwrap();
    fplan(dir.path())
        .args(["--demo", "--plan", "x.json"])
        .assert()
        .failure();
}

#[test]
fn config_controls_json_layout() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("fplan.toml");
    fs::write(&config, "[frontend]\npretty_json = false\n").unwrap();
    let out = dir.path().join("compact.json");

    fplan(dir.path())
        .env("FPLAN_CONFIG", &config)
        .args(["--exec", "add_room storage", "--save"])
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), 1);
}
