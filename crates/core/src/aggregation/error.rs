use thiserror::Error;

/// # Summary
/// 聚合域错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `TickerMismatch` 属于程序路由错误，调用方不应重试。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    // 成交被路由到了其他证券的聚合记录
    #[error("Ticker mismatch: cannot aggregate {actual} into record of {expected}")]
    TickerMismatch { expected: String, actual: String },
    // 账本尚未记录任何成交，无法给出首末日期
    #[error("Aggregation window is empty")]
    EmptyLedger,
}
