use std::path::PathBuf;

use fplan_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("命令 `{command}` 执行失败: {message}")]
    Command { command: String, message: String },
    #[error("保存平面图到 {path:?} 失败: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: IoError,
    },
}
