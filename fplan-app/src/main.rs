use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fplan_config::{AppConfig, ConfigError};
use fplan_frontend::{CliOptions, LoadOptions};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "fplan")]
#[command(version, about = "Headless floor-plan editor")]
#[command(long_about = "Load a floor plan, run editor commands against it and print a report.\n\n\
    Examples:\n  \
    fplan --demo                                   Inspect the demo apartment\n  \
    fplan --plan home.json --exec \"rotate_room r1\"  Edit a saved plan\n  \
    fplan --exec \"add_room kitchen\" --save out.json Build a plan from scratch")]
struct Cli {
    /// Configuration file (defaults to $FPLAN_CONFIG or ./config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON plan to load
    #[arg(long, conflicts_with = "demo")]
    plan: Option<PathBuf>,

    /// Start from the built-in demo apartment
    #[arg(long)]
    demo: bool,

    /// Editor command to run, e.g. "move_room r1 100 40" (repeatable)
    #[arg(long = "exec", value_name = "COMMAND")]
    commands: Vec<String>,

    /// Write the resulting plan as JSON
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = load_configuration(cli.config.as_deref());
    init_logging(&config);
    info!("启动平面图编辑器");

    let options = CliOptions {
        load: LoadOptions {
            plan: cli.plan,
            demo: cli.demo,
        },
        commands: cli.commands,
        save: cli.save,
    };
    match fplan_frontend::run_cli(&options, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "CLI 执行失败");
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_configuration(override_path: Option<&std::path::Path>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. }
                    | ConfigError::Parse { path, .. }
                    | ConfigError::Invalid { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
