use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub pipeline: PipelineConfig,
    pub log: LogConfig,
}

/// 输入文件位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub trades_file: String,
    pub weights_file: String,
}

/// # Summary
/// 聚合流水线参数。
///
/// # Invariants
/// - `workers == 0` 表示按可用 CPU 数自动决定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // 成交写入的并发任务数
    pub workers: usize,
    // 是否输出首末日期之间没有任何成交的自然日
    pub include_idle_days: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // tracing EnvFilter 指令，RUST_LOG 优先
    pub filter: String,
    // 设置后按天滚动写入该目录，否则输出到 stderr
    pub directory: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            trades_file: "market_log.txt".to_string(),
            weights_file: "market_weights.txt".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            include_idle_days: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            directory: None,
        }
    }
}

impl PipelineConfig {
    /// # Summary
    /// 实际使用的并发任务数。
    ///
    /// # Logic
    /// 1. 显式配置大于 0 时直接使用。
    /// 2. 否则取 `available_parallelism`，获取失败按 1 处理。
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    }
}
