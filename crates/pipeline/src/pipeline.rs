use crate::ingest::ingest_concurrently;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tally_core::aggregation::entity::{DayAggregation, Trade};
use tally_core::aggregation::error::AggregationError;
use tally_core::aggregation::port::Ledger;
use tally_core::common::time::days_inclusive;
use tally_core::config::PipelineConfig;
use tally_core::index::entity::WeightTable;
use tally_core::index::error::IndexError;
use tally_core::report::entity::{DailySummary, TickerActivity};
use tally_core::report::error::ReportError;
use tally_core::report::port::ReportSink;
use tally_index::carry::CarryForwardIndex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// # Summary
/// Pipeline 层的统一错误类型。
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("Ingestion task failed: {0}")]
    Join(String),
}

/// # Summary
/// 行情汇总流水线，系统的应用服务层门面 (Facade)。
/// 先并发写入全部成交，再单线程按日期升序计算每日 OHLCV 与指数。
///
/// # Invariants
/// - 账本通过构造函数注入，流水线只依赖 `Ledger` 抽象。
/// - 指数阶段只在写入阶段全部结束后开始，且严格串行。
pub struct MarketPipeline {
    // 共享账本
    ledger: Arc<dyn Ledger>,
    // 写入阶段的并发任务数
    workers: usize,
    // 是否输出首末日期之间无成交的自然日
    include_idle_days: bool,
}

impl MarketPipeline {
    /// # Summary
    /// 创建流水线实例。
    ///
    /// # Arguments
    /// * `ledger` - 账本的具体实现。
    /// * `config` - 流水线参数，`workers == 0` 时按 CPU 数决定。
    pub fn new(ledger: Arc<dyn Ledger>, config: &PipelineConfig) -> Self {
        Self {
            ledger,
            workers: config.effective_workers(),
            include_idle_days: config.include_idle_days,
        }
    }

    /// # Summary
    /// 写入阶段：并发记录全部成交。
    ///
    /// # Returns
    /// * `Result<usize, PipelineError>` - 成功返回写入笔数。
    pub async fn ingest(&self, trades: Vec<Trade>) -> Result<usize, PipelineError> {
        let total = trades.len();
        let recorded = ingest_concurrently(self.ledger.clone(), trades, self.workers).await?;
        info!(
            "Recorded {}/{} trades with {} workers",
            recorded, total, self.workers
        );
        Ok(recorded)
    }

    /// # Summary
    /// 指数阶段：按日期升序生成每日汇总。
    ///
    /// # Logic
    /// 1. 账本为空时记录警告并返回空列表。
    /// 2. 确定遍历日期：包含空闲日时为 `[first_day, last_day]` 的每一天，否则只取有成交的日期。
    /// 3. 收集整个运行中出现过的全部证券。
    /// 4. 逐日取快照，推进沿用式指数，再为每个证券标记 Traded 或 Idle。
    ///
    /// # Arguments
    /// * `weights` - 指数权重表。
    ///
    /// # Returns
    /// * `Result<Vec<DailySummary>, PipelineError>` - 按日期升序的汇总。
    pub fn summarize(&self, weights: &WeightTable) -> Result<Vec<DailySummary>, PipelineError> {
        let first = match self.ledger.first_day() {
            Ok(day) => day,
            Err(AggregationError::EmptyLedger) => {
                warn!("Ledger is empty, no daily summaries produced");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let last = self.ledger.last_day()?;

        let days: Vec<NaiveDate> = if self.include_idle_days {
            days_inclusive(first, last).collect()
        } else {
            self.ledger.all_days().into_iter().collect()
        };
        let tickers = self.ledger.tickers();

        let total = weights.total();
        if !weights.is_empty() && total != Decimal::ONE {
            warn!("Index weights sum to {}, not 1", total);
        }
        let mut index = CarryForwardIndex::new(weights.clone());

        let mut summaries = Vec::with_capacity(days.len());
        for day in days {
            let mut aggregation = self.ledger.aggregation_for(day);
            let value = index.advance(&aggregation)?;
            debug!("{}: {} tickers traded, index {:?}", day, aggregation.len(), value);

            let activity = tickers
                .iter()
                .map(|ticker| {
                    let state = aggregation
                        .remove(ticker)
                        .map_or(TickerActivity::Idle, TickerActivity::Traded);
                    (ticker.clone(), state)
                })
                .collect();
            summaries.push(DailySummary {
                day,
                tickers: activity,
                index: value,
            });
        }
        info!("Summarized {} days from {} to {}", summaries.len(), first, last);
        Ok(summaries)
    }

    /// # Summary
    /// 完整运行：写入全部成交后生成每日汇总。
    pub async fn run(
        &self,
        trades: Vec<Trade>,
        weights: &WeightTable,
    ) -> Result<Vec<DailySummary>, PipelineError> {
        self.ingest(trades).await?;
        self.summarize(weights)
    }

    /// # Summary
    /// 按顺序将汇总发布到输出端，遇到第一个错误即停止。
    pub async fn publish(
        summaries: &[DailySummary],
        sink: &dyn ReportSink,
    ) -> Result<(), PipelineError> {
        for summary in summaries {
            sink.publish(summary).await?;
        }
        Ok(())
    }

    /// 某日的聚合快照。
    pub fn aggregation_for(&self, day: NaiveDate) -> DayAggregation {
        self.ledger.aggregation_for(day)
    }

    /// 有成交的全部日期。
    pub fn aggregation_days(&self) -> BTreeSet<NaiveDate> {
        self.ledger.all_days()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}
