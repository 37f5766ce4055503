mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use tally_core::config::LogConfig;
use tally_core::feed::port::{TradeSource, WeightSource};
use tally_core::report::port::ReportSink;
use tally_feed::file::{FileTradeSource, FileWeightSource};
use tally_ledger::mem::MemLedger;
use tally_pipeline::pipeline::MarketPipeline;
use tally_report::text::TextReport;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. `RUST_LOG` 存在时优先使用，否则使用配置中的过滤指令。
/// 2. 配置了日志目录时按天滚动写文件，否则写到 stderr，保持 stdout 只有报告。
///
/// # Returns
/// 写文件时返回后台写线程的 guard，调用方需持有到进程结束。
fn init_tracing(config: &LogConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "tally.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到 MarketPipeline。
///
/// # Logic
/// 1. 加载分层配置并初始化日志。
/// 2. 实例化基础设施层（成交日志、权重表、报告输出）。
/// 3. 实例化账本并构造应用服务层（MarketPipeline）。
/// 4. 写入全部成交，逐日汇总并输出报告。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let config_file = std::env::var_os("TALLY_CONFIG").map(PathBuf::from);
    let config = settings::load(config_file.as_deref(), std::env::args().skip(1))?;
    let _guard = init_tracing(&config.log);
    info!("Tally starting with {:?}", config);

    // 2. 实例化基础设施层
    let trade_source: Arc<dyn TradeSource> =
        Arc::new(FileTradeSource::new(&config.input.trades_file));
    let weight_source: Arc<dyn WeightSource> =
        Arc::new(FileWeightSource::new(&config.input.weights_file));
    let sink: Arc<dyn ReportSink> = Arc::new(TextReport::stdout());

    // 3. 构造应用服务层（注入 Ledger 抽象）
    let pipeline = MarketPipeline::new(Arc::new(MemLedger::new()), &config.pipeline);

    // 4. 执行
    let trades = trade_source.load_trades().await?;
    let weights = weight_source.load_weights().await?;
    let summaries = pipeline.run(trades, &weights).await?;
    MarketPipeline::publish(&summaries, sink.as_ref()).await?;

    info!("Published {} daily summaries", summaries.len());
    Ok(())
}
