use crate::aggregation::entity::{DayAggregation, Trade};
use crate::aggregation::error::AggregationError;
use crate::common::Ticker;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// # Summary
/// 成交账本行为契约：维护 `自然日 → 证券 → AggregationRecord` 的映射。
///
/// # Invariants
/// - 实现必须是 `Send + Sync`，允许多个工作协程并发写入。
/// - 同一 (日期, 证券) 键在任意时刻至多一个写入者；不同键之间互不阻塞，禁止全局锁。
/// - 查询返回的都是副本，调用方无法通过返回值修改账本。
pub trait Ledger: Send + Sync {
    /// # Summary
    /// 记录一笔成交。
    ///
    /// # Logic
    /// 1. 由成交时间推导自然日。
    /// 2. 获取或创建当日的证券映射。
    /// 3. 获取或创建该证券的聚合记录并并入成交，第 2、3 步对同一键原子。
    ///
    /// # Arguments
    /// * `trade`: 待记录的成交。
    ///
    /// # Returns
    /// 成功返回 Ok，路由错误返回 `AggregationError::TickerMismatch`。
    fn record_trade(&self, trade: &Trade) -> Result<(), AggregationError>;

    /// # Summary
    /// 获取指定日期的聚合快照。
    ///
    /// # Returns
    /// 当日无成交时返回空映射。
    fn aggregation_for(&self, day: NaiveDate) -> DayAggregation;

    /// 至少有一笔成交的全部日期，升序。
    fn all_days(&self) -> BTreeSet<NaiveDate>;

    /// 整个账本中出现过的全部证券代码，升序。
    fn tickers(&self) -> BTreeSet<Ticker>;

    /// # Summary
    /// 最早的成交日期。
    ///
    /// # Logic
    /// 每次调用都由当前键集合重新推导，不缓存。
    ///
    /// # Returns
    /// 账本为空时返回 `AggregationError::EmptyLedger`。
    fn first_day(&self) -> Result<NaiveDate, AggregationError> {
        self.all_days()
            .first()
            .copied()
            .ok_or(AggregationError::EmptyLedger)
    }

    /// # Summary
    /// 最晚的成交日期。
    ///
    /// # Returns
    /// 账本为空时返回 `AggregationError::EmptyLedger`。
    fn last_day(&self) -> Result<NaiveDate, AggregationError> {
        self.all_days()
            .last()
            .copied()
            .ok_or(AggregationError::EmptyLedger)
    }
}
