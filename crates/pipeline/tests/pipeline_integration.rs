use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tally_core::aggregation::entity::{DayAggregation, Trade};
use tally_core::aggregation::error::AggregationError;
use tally_core::aggregation::port::Ledger;
use tally_core::config::PipelineConfig;
use tally_core::index::entity::{MarketIndex, WeightTable};
use tally_core::report::entity::{DailySummary, TickerActivity};
use tally_core::report::error::ReportError;
use tally_core::report::port::ReportSink;
use tally_core::testing::{day, trade, weights};
use tally_ledger::mem::MemLedger;
use tally_pipeline::pipeline::{MarketPipeline, PipelineError};
use tally_report::text::TextReport;

fn config(workers: usize, include_idle_days: bool) -> PipelineConfig {
    PipelineConfig {
        workers,
        include_idle_days,
    }
}

fn pipeline(workers: usize, include_idle_days: bool) -> MarketPipeline {
    MarketPipeline::new(Arc::new(MemLedger::new()), &config(workers, include_idle_days))
}

fn market_weights() -> WeightTable {
    weights(&[
        ("ABC", dec!(0.1)),
        ("MEGA", dec!(0.3)),
        ("NGL", dec!(0.4)),
        ("TRX", dec!(0.2)),
    ])
}

fn two_day_log() -> Vec<Trade> {
    vec![
        trade("2025-01-20 09:00:00", "ABC", dec!(9), 1),
        trade("2025-01-20 15:00:00", "ABC", dec!(10), 1),
        trade("2025-01-20 10:00:00", "MEGA", dec!(20), 2),
        trade("2025-01-20 11:00:00", "NGL", dec!(30), 3),
        trade("2025-01-20 12:00:00", "TRX", dec!(40), 4),
        trade("2025-01-21 09:30:00", "ABC", dec!(11), 1),
        trade("2025-01-21 09:31:00", "MEGA", dec!(21), 1),
        trade("2025-01-21 09:32:00", "NGL", dec!(31), 1),
    ]
}

#[tokio::test]
async fn test_daily_index_with_carried_price() -> anyhow::Result<()> {
    let summaries = pipeline(4, true).run(two_day_log(), &market_weights()).await?;

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].day, day("2025-01-20"));
    assert_eq!(summaries[0].index, MarketIndex::Computed(dec!(27)));
    assert_eq!(summaries[1].day, day("2025-01-21"));
    assert_eq!(summaries[1].index, MarketIndex::Computed(dec!(27.8)));

    // TRX 第二天没有成交，显式标记为 Idle
    assert_eq!(summaries[1].tickers["TRX"], TickerActivity::Idle);
    let abc = summaries[0].tickers["ABC"].record().unwrap();
    assert_eq!(abc.open_price(), Some(dec!(9)));
    assert_eq!(abc.close_price(), Some(dec!(10)));
    Ok(())
}

#[tokio::test]
async fn test_index_unavailable_until_complete() -> anyhow::Result<()> {
    let trades = vec![
        trade("2025-01-20 09:00:00", "ABC", dec!(10), 1),
        trade("2025-01-20 09:00:00", "MEGA", dec!(20), 1),
        trade("2025-01-21 09:00:00", "NGL", dec!(30), 1),
        trade("2025-01-22 09:00:00", "TRX", dec!(40), 1),
    ];
    let summaries = pipeline(2, true).run(trades, &market_weights()).await?;

    let indexes: Vec<MarketIndex> = summaries.iter().map(|s| s.index).collect();
    assert_eq!(
        indexes,
        vec![
            MarketIndex::Unavailable,
            MarketIndex::Unavailable,
            MarketIndex::Computed(dec!(27)),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_idle_calendar_days_are_emitted() -> anyhow::Result<()> {
    let trades = vec![
        trade("2025-01-20 09:00:00", "ABC", dec!(10), 1),
        trade("2025-01-23 09:00:00", "ABC", dec!(12), 1),
        trade("2025-01-23 10:00:00", "XYZ", dec!(5), 1),
    ];
    let table = weights(&[("ABC", dec!(1))]);

    let summaries = pipeline(2, true).run(trades.clone(), &table).await?;
    let days: Vec<NaiveDate> = summaries.iter().map(|s| s.day).collect();
    assert_eq!(
        days,
        vec![day("2025-01-20"), day("2025-01-21"), day("2025-01-22"), day("2025-01-23")]
    );
    let gap = &summaries[1];
    assert!(gap.tickers.values().all(|a| *a == TickerActivity::Idle));
    assert_eq!(gap.tickers.len(), 2);
    assert_eq!(gap.index, MarketIndex::Computed(dec!(10)));
    assert_eq!(summaries[3].index, MarketIndex::Computed(dec!(12)));

    let traded_only = pipeline(2, false).run(trades, &table).await?;
    let days: Vec<NaiveDate> = traded_only.iter().map(|s| s.day).collect();
    assert_eq!(days, vec![day("2025-01-20"), day("2025-01-23")]);
    Ok(())
}

#[tokio::test]
async fn test_empty_run_produces_nothing() -> anyhow::Result<()> {
    let p = pipeline(4, true);
    let summaries = p.run(Vec::new(), &market_weights()).await?;
    assert!(summaries.is_empty());
    assert!(p.aggregation_days().is_empty());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_count_does_not_change_results() -> anyhow::Result<()> {
    let tickers = ["ABC", "MEGA", "NGL", "TRX", "ZED"];
    let mut trades = Vec::new();
    for i in 0..1_500usize {
        let date = format!("2025-02-{:02}", 1 + i % 9);
        let ts = format!("{date} {:02}:{:02}:{:02}", 9 + i % 8, (i * 11) % 60, (i * 17) % 60);
        let price = Decimal::new(500 + i64::try_from(i % 113)?, 1);
        trades.push(trade(&ts, tickers[i % 5], price, u64::try_from(1 + i % 9)?));
    }

    let sequential = pipeline(1, true).run(trades.clone(), &market_weights()).await?;
    let concurrent = pipeline(16, true).run(trades, &market_weights()).await?;
    assert_eq!(concurrent, sequential);
    assert_eq!(sequential.len(), 9);
    Ok(())
}

#[tokio::test]
async fn test_aggregation_queries_pass_through() -> anyhow::Result<()> {
    let p = pipeline(3, true);
    assert_eq!(p.workers(), 3);
    assert_eq!(p.ingest(two_day_log()).await?, 8);

    assert_eq!(
        p.aggregation_days(),
        BTreeSet::from([day("2025-01-20"), day("2025-01-21")])
    );
    let first = p.aggregation_for(day("2025-01-20"));
    assert_eq!(first.len(), 4);
    assert_eq!(first, p.aggregation_for(day("2025-01-20")));
    assert!(p.aggregation_for(day("2025-03-01")).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_publish_writes_every_day() -> anyhow::Result<()> {
    let summaries = pipeline(2, true).run(two_day_log(), &market_weights()).await?;
    let report = TextReport::new(Vec::new());
    MarketPipeline::publish(&summaries, &report).await?;

    let output = String::from_utf8(report.into_inner())?;
    assert!(output.contains("Index for 2025-01-20: 27.0\n"));
    assert!(output.contains("Index for 2025-01-21: 27.8\n"));
    assert!(output.contains(
        "Ticker: TRX, Open: N/A, Close: N/A, High: N/A, Low: N/A, Volume: 0.00\n"
    ));
    Ok(())
}

/// 模拟路由错误的账本
struct MisroutingLedger;

impl Ledger for MisroutingLedger {
    fn record_trade(&self, trade: &Trade) -> Result<(), AggregationError> {
        Err(AggregationError::TickerMismatch {
            expected: "WRONG".to_string(),
            actual: trade.ticker.clone(),
        })
    }
    fn aggregation_for(&self, _day: NaiveDate) -> DayAggregation {
        DayAggregation::new()
    }
    fn all_days(&self) -> BTreeSet<NaiveDate> {
        BTreeSet::new()
    }
    fn tickers(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

#[tokio::test]
async fn test_ticker_mismatch_aborts_run() {
    let p = MarketPipeline::new(Arc::new(MisroutingLedger), &config(2, true));
    let err = p.run(two_day_log(), &market_weights()).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Aggregation(AggregationError::TickerMismatch { .. })
    ));
}

/// 总是写入失败的报告输出端
struct BrokenSink;

#[async_trait]
impl ReportSink for BrokenSink {
    async fn publish(&self, _summary: &DailySummary) -> Result<(), ReportError> {
        Err(ReportError::Io("disk full".to_string()))
    }
}

#[tokio::test]
async fn test_publish_propagates_sink_failure() -> anyhow::Result<()> {
    let summaries = pipeline(1, true).run(two_day_log(), &market_weights()).await?;
    let err = MarketPipeline::publish(&summaries, &BrokenSink).await.unwrap_err();
    assert!(matches!(err, PipelineError::Report(ReportError::Io(_))));
    Ok(())
}

/// 记录写入次数的账本，遇到 BAD 代码时报错
#[derive(Default)]
struct CountingLedger {
    writes: AtomicUsize,
}

impl Ledger for CountingLedger {
    fn record_trade(&self, trade: &Trade) -> Result<(), AggregationError> {
        std::thread::sleep(Duration::from_millis(1));
        if trade.ticker == "BAD" {
            return Err(AggregationError::TickerMismatch {
                expected: "GOOD".to_string(),
                actual: trade.ticker.clone(),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
    fn aggregation_for(&self, _day: NaiveDate) -> DayAggregation {
        DayAggregation::new()
    }
    fn all_days(&self) -> BTreeSet<NaiveDate> {
        BTreeSet::new()
    }
    fn tickers(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_ingest_leaves_no_running_batches() -> anyhow::Result<()> {
    let mut trades = vec![trade("2025-01-20 09:00:00", "BAD", dec!(1), 1)];
    for i in 0..200usize {
        let ts = format!("2025-01-20 10:{:02}:{:02}", i / 60, i % 60);
        trades.push(trade(&ts, "GOOD", dec!(1), 1));
    }

    let ledger = Arc::new(CountingLedger::default());
    let p = MarketPipeline::new(ledger.clone(), &config(4, true));
    let err = p.ingest(trades).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Aggregation(AggregationError::TickerMismatch { .. })
    ));

    // 返回后写入次数不再变化，且其余批次已提前停止
    let at_return = ledger.writes.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ledger.writes.load(Ordering::SeqCst), at_return);
    assert!(at_return < 150);
    Ok(())
}
