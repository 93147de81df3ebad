use std::fs;
use std::path::PathBuf;

use fplan_core::plan::FloorPlan;
use serde_json::Value;

/// 将平面图序列化结果与 `tests/data/golden/<name>.json` 对比。
///
/// 黄金文件不存在时自动生成并让测试失败，确认内容后重新运行即可。
pub fn assert_golden(name: &str, plan: &FloorPlan) {
    let base_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/golden");
    if let Err(err) = fs::create_dir_all(&base_dir) {
        panic!("无法创建黄金数据目录 {}: {err}", base_dir.display());
    }
    let golden_path = base_dir.join(format!("{name}.json"));
    let serialized = fplan_io::to_json(plan, true).expect("序列化黄金快照失败");

    if !golden_path.exists() {
        fs::write(&golden_path, &serialized)
            .unwrap_or_else(|err| panic!("写入黄金文件 {} 失败: {err}", golden_path.display()));
        panic!(
            "黄金文件 {} 不存在，已自动生成。请确认内容后重新运行测试。",
            golden_path.display()
        );
    }

    let expected_str = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    let expected: Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|err| panic!("解析黄金文件 {} 失败: {err}", golden_path.display()));
    let actual: Value = serde_json::from_str(&serialized).expect("解析序列化结果失败");

    if expected != actual {
        let diff_path = base_dir.join(format!("{name}.actual.json"));
        fs::write(&diff_path, &serialized).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前输出不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}
