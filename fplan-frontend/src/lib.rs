pub mod cli;
pub mod errors;
pub mod loader;

use errors::FrontendError;
use fplan_config::AppConfig;
use tracing::info;

pub use cli::CliOptions;
pub use loader::LoadOptions;

/// 运行无界面前端：加载、执行命令脚本、打印概览。
pub fn run_cli(options: &CliOptions, config: &AppConfig) -> Result<(), FrontendError> {
    info!(commands = options.commands.len(), "启动 CLI 前端");
    cli::run(options, config)
}
