use crate::report::entity::DailySummary;
use crate::report::error::ReportError;
use async_trait::async_trait;

/// # Summary
/// 汇总结果的输出端接口。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync`。
/// - 调用方按日期升序逐日发布，实现无需重新排序。
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// # Summary
    /// 发布一天的汇总。
    ///
    /// # Logic
    /// 1. 按输出介质要求格式化 OHLCV 与指数。
    /// 2. 写出到底层介质。
    ///
    /// # Arguments
    /// * `summary` - 单日汇总。
    ///
    /// # Returns
    /// * 成功返回 `Ok(())`。
    /// * 失败返回 `Err(ReportError)`。
    async fn publish(&self, summary: &DailySummary) -> Result<(), ReportError>;
}
