use std::env;
use std::path::{Path, PathBuf};

use fplan_config::{AppConfig, EditorConfig};
use fplan_engine::interaction::InteractionSettings;
use fplan_engine::scene::Scene;
use fplan_io::{JsonFacade, PlanLoader};
use tracing::{info, warn};

/// 指定启动平面图的环境变量。
pub const PLAN_ENV: &str = "FPLAN_PLAN";

/// 平面图来源，便于前端呈现加载信息。
#[derive(Debug, Clone, PartialEq)]
pub enum PlanSource {
    File(PathBuf),
    Demo,
    Empty,
}

/// 命令行给出的加载选项。
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub plan: Option<PathBuf>,
    pub demo: bool,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: PlanSource,
    /// 请求的文件加载失败时的错误描述，此时场景保留空白平面图。
    pub load_error: Option<String>,
}

/// 依次考虑 `--plan`、`--demo`、环境变量 `FPLAN_PLAN` 与配置中的 `default_plan`。
pub fn resolve_source(
    options: &LoadOptions,
    env_plan: Option<PathBuf>,
    config: &AppConfig,
) -> PlanSource {
    if let Some(path) = &options.plan {
        return PlanSource::File(path.clone());
    }
    if options.demo {
        return PlanSource::Demo;
    }
    if let Some(path) = env_plan {
        return PlanSource::File(path);
    }
    match &config.frontend.default_plan {
        Some(path) => PlanSource::File(path.clone()),
        None => PlanSource::Empty,
    }
}

pub fn interaction_settings(editor: &EditorConfig) -> InteractionSettings {
    InteractionSettings {
        zoom_step: editor.zoom_step,
        button_zoom_factor: editor.button_zoom_factor,
        min_zoom: editor.min_zoom,
        max_zoom: editor.max_zoom,
        min_room_size: editor.min_room_size,
    }
}

/// 按配置构建场景并加载平面图。文件读取失败时记录错误并保留空白平面图。
pub fn load_scene(options: &LoadOptions, config: &AppConfig) -> LoadedScene {
    let env_plan = env::var_os(PLAN_ENV).map(PathBuf::from);
    load_scene_from(resolve_source(options, env_plan, config), config)
}

pub fn load_scene_from(source: PlanSource, config: &AppConfig) -> LoadedScene {
    let mut scene = Scene::with_settings(
        interaction_settings(&config.editor),
        config.history.max_depth,
    );
    match source {
        PlanSource::File(path) => match JsonFacade::new().load(&path) {
            Ok(plan) => {
                info!(path = %path.display(), "从 JSON 加载平面图成功");
                scene.load_plan(plan);
                LoadedScene {
                    scene,
                    source: PlanSource::File(path),
                    load_error: None,
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载平面图失败，使用空白平面图");
                LoadedScene {
                    scene,
                    source: PlanSource::Empty,
                    load_error: Some(describe_failure(&path, &err)),
                }
            }
        },
        PlanSource::Demo => {
            scene.populate_demo();
            info!("已载入内置示例户型");
            LoadedScene {
                scene,
                source: PlanSource::Demo,
                load_error: None,
            }
        }
        PlanSource::Empty => LoadedScene {
            scene,
            source: PlanSource::Empty,
            load_error: None,
        },
    }
}

fn describe_failure(path: &Path, err: &fplan_io::IoError) -> String {
    format!("{}: {err}", path.display())
}
