mod golden;

use std::path::PathBuf;

use golden::assert_golden;
use fplan_core::constraints;
use fplan_core::geometry::Point2;
use fplan_core::plan::{RoomId, Rotation, Wall};
use fplan_io::{IoError, JsonFacade, PlanLoader, PlanSaver, parse_plan};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

#[test]
fn load_studio_matches_golden_output() {
    let loader = JsonFacade::new();
    let plan = loader.load(&fixture("studio.json")).expect("读取平面图失败");
    assert_golden("studio", &plan);

    assert_eq!(plan.name, "Corner Studio");
    assert_eq!(plan.rooms().len(), 3);
    assert_eq!(plan.plumbing_points().len(), 1);

    let living = plan.room(&RoomId::new("living")).expect("缺少客厅");
    assert_eq!(living.doors.len(), 1);
    assert_eq!(living.doors[0].wall, Wall::Bottom);
    assert!(living.doors[0].fits(living));
}

#[test]
fn rotations_are_normalised_on_load() {
    let plan = JsonFacade::new()
        .load(&fixture("studio.json"))
        .expect("读取平面图失败");
    let bath = plan.room(&RoomId::new("bath")).unwrap();
    let kitchen = plan.room(&RoomId::new("kitchen")).unwrap();
    assert_eq!(bath.rotation, Rotation::Deg90);
    assert_eq!(kitchen.rotation, Rotation::Deg270);

    let bounds = plan.content_bounds().expect("存在房间时应有包围盒");
    assert_eq!(bounds.min(), Point2::new(0.0, 0.0));
    assert_eq!(bounds.max(), Point2::new(370.0, 330.0));
}

#[test]
fn loaded_plan_is_validated_like_an_edited_one() {
    let plan = JsonFacade::new()
        .load(&fixture("studio.json"))
        .expect("读取平面图失败");
    let issues = constraints::validate_plan(&plan);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].room, Some(RoomId::new("kitchen")));
    assert!(issues[0].plumbing_out_of_range);
    assert!(issues[0].overlapping.is_empty());
}

#[test]
fn minimal_document_uses_defaults() {
    let plan = JsonFacade::new()
        .load(&fixture("minimal.json"))
        .expect("读取最小平面图失败");
    assert_eq!(plan.name, "New Project");
    assert_eq!((plan.width, plan.height), (800.0, 1200.0));
    assert!(plan.rooms().is_empty());
    assert!(plan.plumbing_points().is_empty());
}

#[test]
fn invalid_documents_are_rejected() {
    let loader = JsonFacade::new();
    for name in [
        "missing_rooms.json",
        "bad_rotation.json",
        "duplicate_rooms.json",
        "zero_size.json",
    ] {
        match loader.load(&fixture(name)) {
            Err(IoError::InvalidDocument(message)) => assert!(!message.is_empty()),
            other => panic!("{name} 应当被拒绝，实际结果: {other:?}"),
        }
    }

    let err = parse_plan(r#"{"name": "x"}"#).unwrap_err();
    assert!(err.to_string().contains("rooms"));
}

#[test]
fn missing_file_reports_read_error() {
    let err = JsonFacade::new()
        .load(&fixture("does_not_exist.json"))
        .unwrap_err();
    assert!(matches!(err, IoError::ReadError { .. }));
}

#[test]
fn save_then_load_preserves_plan() {
    let facade = JsonFacade::with_pretty(false);
    let original = facade.load(&fixture("studio.json")).expect("读取平面图失败");

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join(fplan_io::suggested_file_name(&original));
    facade.save(&original, &path).expect("写出平面图失败");
    assert!(path.ends_with("layout-corner-studio.json"));

    let reloaded = facade.load(&path).expect("重新读取平面图失败");
    assert_eq!(reloaded, original);
}

#[test]
fn saving_into_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("nested/missing/plan.json");
    let plan = parse_plan(r#"{"rooms": []}"#).unwrap();
    let err = JsonFacade::new().save(&plan, &path).unwrap_err();
    assert!(matches!(err, IoError::WriteError { .. }));
}
