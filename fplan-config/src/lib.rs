use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "FPLAN_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .editor
            .validate()
            .and_then(|()| config.history.validate())
            .map_err(|message| ConfigError::Invalid {
                path: path.to_path_buf(),
                message,
            })?;
        Ok(config)
    }

    /// 自动发现配置文件：优先读取环境变量 `FPLAN_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 画布交互参数。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditorConfig {
    /// 滚轮每格的缩放倍率。
    #[serde(default = "EditorConfig::default_zoom_step")]
    pub zoom_step: f64,
    /// 工具栏放大/缩小按钮的倍率。
    #[serde(default = "EditorConfig::default_button_zoom_factor")]
    pub button_zoom_factor: f64,
    #[serde(default = "EditorConfig::default_min_zoom")]
    pub min_zoom: f64,
    #[serde(default = "EditorConfig::default_max_zoom")]
    pub max_zoom: f64,
    /// 通过左侧或上侧手柄缩放时房间边长的下限。
    #[serde(default = "EditorConfig::default_min_room_size")]
    pub min_room_size: f64,
}

impl EditorConfig {
    fn default_zoom_step() -> f64 {
        1.05
    }

    fn default_button_zoom_factor() -> f64 {
        1.2
    }

    fn default_min_zoom() -> f64 {
        0.2
    }

    fn default_max_zoom() -> f64 {
        5.0
    }

    fn default_min_room_size() -> f64 {
        20.0
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.zoom_step > 1.0 && self.button_zoom_factor > 1.0) {
            return Err(format!(
                "缩放倍率必须大于 1（zoom_step = {}, button_zoom_factor = {}）",
                self.zoom_step, self.button_zoom_factor
            ));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(format!(
                "缩放范围无效: min_zoom = {}, max_zoom = {}",
                self.min_zoom, self.max_zoom
            ));
        }
        if !(self.min_room_size > 0.0) {
            return Err(format!(
                "min_room_size 必须为正数，实际为 {}",
                self.min_room_size
            ));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_step: Self::default_zoom_step(),
            button_zoom_factor: Self::default_button_zoom_factor(),
            min_zoom: Self::default_min_zoom(),
            max_zoom: Self::default_max_zoom(),
            min_room_size: Self::default_min_room_size(),
        }
    }
}

/// 撤销历史配置。未设置 `max_depth` 时不限制深度。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_depth == Some(0) {
            return Err("max_depth 必须至少为 1，不限制深度请省略该项".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrontendConfig {
    /// 启动时加载的平面图，命令行参数与环境变量优先。
    #[serde(default)]
    pub default_plan: Option<PathBuf>,
    #[serde(default = "FrontendConfig::default_pretty_json")]
    pub pretty_json: bool,
}

impl FrontendConfig {
    fn default_pretty_json() -> bool {
        true
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            default_plan: None,
            pretty_json: Self::default_pretty_json(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置文件 {path:?} 无效: {message}")]
    Invalid { path: PathBuf, message: String },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        writeln!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn defaults_are_returned_when_file_missing() {
        let cfg = AppConfig::discover().expect("discover should succeed");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.editor.zoom_step, 1.05);
        assert_eq!(cfg.editor.button_zoom_factor, 1.2);
        assert_eq!((cfg.editor.min_zoom, cfg.editor.max_zoom), (0.2, 5.0));
        assert_eq!(cfg.editor.min_room_size, 20.0);
        assert!(cfg.history.max_depth.is_none());
        assert!(cfg.frontend.default_plan.is_none());
        assert!(cfg.frontend.pretty_json);
    }

    #[test]
    fn load_from_temp_file() {
        let file = write_config(
            r#"
            [logging]
            level = "debug"

            [editor]
            zoom_step = 1.1
            max_zoom = 8.0
            min_room_size = 30.0

            [history]
            max_depth = 50

            [frontend]
            default_plan = "plans/office.json"
            pretty_json = false
            "#,
        );

        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.editor.zoom_step, 1.1);
        assert_eq!(cfg.editor.max_zoom, 8.0);
        assert_eq!(cfg.editor.min_zoom, 0.2);
        assert_eq!(cfg.editor.min_room_size, 30.0);
        assert_eq!(cfg.history.max_depth, Some(50));
        assert_eq!(
            cfg.frontend.default_plan.as_deref(),
            Some(Path::new("plans/office.json"))
        );
        assert!(!cfg.frontend.pretty_json);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let file = write_config("[logging]\nlevel = \"warn\"");
        let cfg = AppConfig::from_file(file.path()).expect("load config");
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.editor, EditorConfig::default());
        assert_eq!(cfg.frontend, FrontendConfig::default());
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let file = write_config("[editor]\nmin_zoom = 4.0\nmax_zoom = 2.0");
        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let file = write_config("[editor]\nzoom_step = 0.9");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn zero_history_depth_is_rejected() {
        let file = write_config("[history]\nmax_depth = 0");
        match AppConfig::from_file(file.path()) {
            Err(ConfigError::Invalid { message, .. }) => assert!(message.contains("max_depth")),
            other => panic!("unexpected result: {other:?}"),
        }

        let file = write_config("[history]\nmax_depth = 1");
        let cfg = AppConfig::from_file(file.path()).expect("depth of one is valid");
        assert_eq!(cfg.history.max_depth, Some(1));
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let file = write_config("[editor\nzoom_step = ");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let missing = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
