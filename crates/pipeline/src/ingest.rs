use crate::pipeline::PipelineError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tally_core::aggregation::entity::Trade;
use tally_core::aggregation::error::AggregationError;
use tally_core::aggregation::port::Ledger;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// # Summary
/// 将成交并发写入账本，所有批次结束后才返回。
///
/// # Logic
/// 1. 按 `workers` 将成交均分为若干批（保持批内顺序，批间无顺序要求）。
/// 2. 每批通过 `spawn_blocking` 在阻塞线程池上逐笔调用 `Ledger::record_trade`。
/// 3. 收齐 JoinSet 中的全部结果，形成写入阶段与指数阶段之间的屏障。
/// 4. 任一批出错时置位共享的失败标记，其余批次在下一笔前停止；仍等待全部批次退出后再返回第一个错误。
/// 5. 任务 panic 映射为 `PipelineError::Join`。
///
/// # Arguments
/// * `ledger`: 共享账本。
/// * `trades`: 全部成交。
/// * `workers`: 并发批数，至少为 1。
///
/// # Returns
/// 成功写入的成交笔数。
///
/// # Invariants
/// - 返回时（无论成败）不再有批次写入账本。
pub async fn ingest_concurrently(
    ledger: Arc<dyn Ledger>,
    trades: Vec<Trade>,
    workers: usize,
) -> Result<usize, PipelineError> {
    if trades.is_empty() {
        return Ok(0);
    }
    let chunk_size = trades.len().div_ceil(workers.max(1));
    let failed = Arc::new(AtomicBool::new(false));

    let mut batches: JoinSet<Result<usize, AggregationError>> = JoinSet::new();
    let mut remaining = trades.into_iter();
    loop {
        let batch: Vec<Trade> = remaining.by_ref().take(chunk_size).collect();
        if batch.is_empty() {
            break;
        }
        let ledger = ledger.clone();
        let failed = failed.clone();
        batches.spawn_blocking(move || {
            let mut recorded = 0;
            for trade in &batch {
                if failed.load(Ordering::Acquire) {
                    break;
                }
                if let Err(e) = ledger.record_trade(trade) {
                    failed.store(true, Ordering::Release);
                    return Err(e);
                }
                recorded += 1;
            }
            Ok(recorded)
        });
    }
    debug!("Ingesting with {} tasks of up to {} trades", batches.len(), chunk_size);

    let mut recorded = 0;
    let mut first_error: Option<PipelineError> = None;
    while let Some(joined) = batches.join_next().await {
        let error = match joined {
            Ok(Ok(count)) => {
                recorded += count;
                continue;
            }
            Ok(Err(e)) => PipelineError::Aggregation(e),
            Err(e) => {
                failed.store(true, Ordering::Release);
                PipelineError::Join(e.to_string())
            }
        };
        if first_error.is_none() {
            first_error = Some(error);
        }
    }

    match first_error {
        Some(e) => {
            warn!("Ingestion stopped after {} trades: {}", recorded, e);
            Err(e)
        }
        None => Ok(recorded),
    }
}
