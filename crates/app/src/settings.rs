use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use tally_core::config::AppConfig;

/// 未设置 `TALLY_CONFIG` 时尝试读取的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

/// # Summary
/// 分层加载应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 作为最底层。
/// 2. 叠加配置文件：显式指定时必须存在，否则可选读取 `tally.toml`。
/// 3. 叠加 `TALLY_` 前缀的环境变量，嵌套字段用 `__` 分隔（如 `TALLY_PIPELINE__WORKERS`）。
/// 4. 位置参数依次覆盖成交日志路径与权重文件路径。
///
/// # Arguments
/// * `config_file` - 显式指定的配置文件路径。
/// * `args` - 去掉程序名后的命令行参数。
///
/// # Returns
/// * `Result<AppConfig, ConfigError>` - 合并后的配置。
pub fn load(
    config_file: Option<&Path>,
    args: impl IntoIterator<Item = String>,
) -> Result<AppConfig, ConfigError> {
    let file = match config_file {
        Some(path) => File::from(path).required(true),
        None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
    };

    let mut args = args.into_iter();
    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(file)
        .add_source(
            Environment::with_prefix("TALLY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("input.trades_file", args.next())?
        .set_override_option("input.weights_file", args.next())?
        .build()?
        .try_deserialize()
}
