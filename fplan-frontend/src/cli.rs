use std::path::PathBuf;

use fplan_config::AppConfig;
use fplan_core::constraints::RoomIssues;
use fplan_core::geometry::Point2;
use fplan_core::plan::Room;
use fplan_core::units::{format_area, format_dimensions};
use fplan_engine::command::{CommandBus, CommandContext, CommandRequest};
use fplan_engine::scene::Scene;
use fplan_io::{JsonFacade, PlanSaver};
use tracing::{debug, info};

use crate::errors::FrontendError;
use crate::loader::{LoadOptions, LoadedScene, PlanSource, load_scene};

/// 一次无界面运行的参数：加载来源、依次执行的命令脚本、保存路径。
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub load: LoadOptions,
    pub commands: Vec<String>,
    pub save: Option<PathBuf>,
}

/// 加载平面图，执行命令脚本，打印概览，必要时写出结果。
///
/// 任一命令失败即中止，返回的错误带有失败命令的原文。
pub fn run(options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    let LoadedScene {
        mut scene,
        source,
        load_error,
    } = load_scene(&options.load, config);

    println!("平面图编辑器 CLI");
    println!("{}", describe_source(&source, load_error.as_deref()));

    let bus = CommandBus::new();
    for line in &options.commands {
        if let Some(message) = execute_line(&bus, &mut scene, line)? {
            println!("[命令] {message}");
        }
    }

    print!("{}", render_report(&scene));

    if let Some(path) = &options.save {
        JsonFacade::with_pretty(config.frontend.pretty_json)
            .save(scene.plan(), path)
            .map_err(|source| FrontendError::Save {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "平面图已保存");
        println!("已保存平面图到 {}", path.display());
    }
    Ok(())
}

/// 执行一行命令。空行直接跳过并返回 `Ok(None)`。
pub fn execute_line(
    bus: &CommandBus,
    scene: &mut Scene,
    line: &str,
) -> Result<Option<String>, FrontendError> {
    let Some(request) = CommandRequest::parse(line) else {
        return Ok(None);
    };
    debug!(command = %request.name, args = ?request.args, "执行命令");
    let mut context = CommandContext { scene };
    let response = bus.dispatch(&request, &mut context);
    if response.success {
        Ok(response.message)
    } else {
        Err(FrontendError::Command {
            command: line.trim().to_string(),
            message: response.message.unwrap_or_else(|| "未知错误".to_string()),
        })
    }
}

pub fn describe_source(source: &PlanSource, load_error: Option<&str>) -> String {
    match (source, load_error) {
        (_, Some(error)) => format!("加载平面图失败（{error}），已使用空白平面图"),
        (PlanSource::File(path), None) => format!("已从 JSON 加载平面图：{}", path.display()),
        (PlanSource::Demo, None) => "已载入内置示例户型".to_string(),
        (PlanSource::Empty, None) => "使用空白平面图".to_string(),
    }
}

/// 平面图概览：尺寸、房间、门、给排水点、校验结果与历史状态。
pub fn render_report(scene: &Scene) -> String {
    let plan = scene.plan();
    let issues = scene.validation_report();
    let mut lines = Vec::new();

    lines.push(format!(
        "平面图: {} (id={}, 画布 {}x{})",
        plan.name, plan.id, plan.width, plan.height
    ));
    lines.push(format!(
        "房间数: {}, 给排水点: {}",
        plan.rooms().len(),
        plan.plumbing_points().len()
    ));
    match plan.content_bounds() {
        Some(bounds) => lines.push(format!(
            "内容范围: {} - {}",
            format_point(bounds.min()),
            format_point(bounds.max())
        )),
        None => lines.push("内容范围: <空>".to_string()),
    }

    if !plan.rooms().is_empty() {
        lines.push("房间：".to_string());
        for room in plan.rooms() {
            lines.push(describe_room(room));
            for door in &room.doors {
                let warning = if door.fits(room) { "" } else { "（超出墙体）" };
                lines.push(format!(
                    "      门 {}: {} 偏移={:.2} 宽度={:.2}{warning}",
                    door.id,
                    door.wall.name(),
                    door.offset,
                    door.width
                ));
            }
            if let Some(found) = issues.iter().find(|entry| entry.room.as_ref() == Some(&room.id)) {
                lines.extend(describe_issues(found));
            }
        }
    }

    if !plan.plumbing_points().is_empty() {
        lines.push("给排水点：".to_string());
        for point in plan.plumbing_points() {
            lines.push(format!("  - {} {}", point.id, format_point(point.position())));
        }
    }

    if issues.is_empty() {
        lines.push("校验: 全部通过".to_string());
    } else {
        lines.push(format!("校验: {} 个房间存在问题", issues.len()));
    }
    let history = scene.history();
    lines.push(format!(
        "历史: 可撤销 {} 步, 可重做 {} 步",
        history.past_len(),
        history.future_len()
    ));

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

fn describe_room(room: &Room) -> String {
    format!(
        "  - {} [{}] \"{}\" 位置={} 尺寸={} 面积={} 旋转={}°",
        room.id,
        room.kind,
        room.label,
        format_point(room.origin()),
        format_dimensions(room.width, room.height),
        format_area(room.width, room.height),
        room.rotation.degrees()
    )
}

fn describe_issues(issues: &RoomIssues) -> Vec<String> {
    let mut lines: Vec<String> = issues
        .overlapping
        .iter()
        .map(|other| format!("      ! 与 {other} 重叠"))
        .collect();
    if issues.plumbing_out_of_range {
        lines.push("      ! 距离给排水点过远".to_string());
    }
    lines
}

fn format_point(point: Point2) -> String {
    format!("({:.2}, {:.2})", point.x(), point.y())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fplan_core::plan::RoomKind;

    #[test]
    fn report_lists_rooms_and_issues() {
        let mut scene = Scene::new();
        let kitchen = scene.add_room(RoomKind::Kitchen).unwrap();
        scene.add_room(RoomKind::Toilet).unwrap();
        scene.add_door(&kitchen).unwrap();
        scene.add_plumbing_point(Point2::new(900.0, 900.0)).unwrap();

        let report = render_report(&scene);
        assert!(report.contains("平面图: New Project"));
        assert!(report.contains("[kitchen] \"New kitchen\""));
        assert!(report.contains("尺寸=12.0' x 12.0' 面积=144.0 sqft"));
        assert!(report.contains("门 door-1: top 偏移=10.00 宽度=30.00\n"));
        assert!(report.contains("! 与 room-2 重叠"));
        assert!(report.contains("! 距离给排水点过远"));
        assert!(report.contains("校验: 2 个房间存在问题"));
        assert!(report.contains("历史: 可撤销 4 步, 可重做 0 步"));
    }

    #[test]
    fn empty_plan_report() {
        let report = render_report(&Scene::new());
        assert!(report.contains("内容范围: <空>"));
        assert!(report.contains("校验: 全部通过"));
        assert!(!report.contains("房间："));
    }

    #[test]
    fn execute_line_reports_failures() {
        let bus = CommandBus::new();
        let mut scene = Scene::new();

        assert_eq!(execute_line(&bus, &mut scene, "   ").unwrap(), None);
        let message = execute_line(&bus, &mut scene, "add_room living").unwrap();
        assert_eq!(message.as_deref(), Some("已新建房间 room-1"));

        let err = execute_line(&bus, &mut scene, " delete_room nope ").unwrap_err();
        match err {
            FrontendError::Command { command, message } => {
                assert_eq!(command, "delete_room nope");
                assert!(message.contains("nope"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_failure_is_described() {
        let text = describe_source(&PlanSource::Empty, Some("plan.json: missing `rooms` array"));
        assert!(text.contains("missing `rooms` array"));
        assert_eq!(describe_source(&PlanSource::Demo, None), "已载入内置示例户型");
    }
}
