use std::fs;
use std::path::{Path, PathBuf};

use fplan_core::plan::FloorPlan;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
    #[error("failed to serialize plan: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub trait PlanLoader {
    fn load(&self, path: &Path) -> Result<FloorPlan, IoError>;
}

pub trait PlanSaver {
    fn save(&self, plan: &FloorPlan, path: &Path) -> Result<(), IoError>;
}

/// 以 JSON 格式读写平面图。
#[derive(Debug, Clone, Copy)]
pub struct JsonFacade {
    pretty: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// `pretty = false` 时输出单行 JSON。
    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<FloorPlan, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = parse_plan(&data).inspect_err(|err| {
            warn!(path = %path.display(), error = %err, "平面图文件无效");
        })?;
        debug!(
            path = %path.display(),
            plan = %plan.id,
            rooms = plan.rooms().len(),
            "已读取平面图"
        );
        Ok(plan)
    }
}

impl PlanSaver for JsonFacade {
    fn save(&self, plan: &FloorPlan, path: &Path) -> Result<(), IoError> {
        let mut text = to_json(plan, self.pretty)?;
        text.push('\n');
        fs::write(path, text).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), plan = %plan.id, "已写出平面图");
        Ok(())
    }
}

/// 解析 JSON 文本。
///
/// 顶层必须是对象且包含 `rooms` 数组；其余顶层字段缺省时取默认值。
/// 解析成功后还会检查 ID 唯一性与房间尺寸。
pub fn parse_plan(text: &str) -> Result<FloorPlan, IoError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| IoError::InvalidDocument(format!("malformed JSON: {err}")))?;

    let Some(object) = value.as_object() else {
        return Err(IoError::InvalidDocument(
            "top-level value must be an object".to_string(),
        ));
    };
    match object.get("rooms") {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(IoError::InvalidDocument(
                "`rooms` must be an array".to_string(),
            ));
        }
        None => {
            return Err(IoError::InvalidDocument(
                "missing `rooms` array".to_string(),
            ));
        }
    }

    let plan: FloorPlan =
        serde_json::from_value(value).map_err(|err| IoError::InvalidDocument(err.to_string()))?;
    plan.check_integrity()
        .map_err(|err| IoError::InvalidDocument(err.to_string()))?;
    Ok(plan)
}

pub fn to_json(plan: &FloorPlan, pretty: bool) -> Result<String, IoError> {
    let result = if pretty {
        serde_json::to_string_pretty(plan)
    } else {
        serde_json::to_string(plan)
    };
    result.map_err(IoError::Serialize)
}

/// 导出时建议的文件名：`layout-<名称>.json`，名称转小写、空白替换为 `-`。
pub fn suggested_file_name(plan: &FloorPlan) -> String {
    let slug = plan
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("layout-{slug}.json")
}
