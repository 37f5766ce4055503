use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tally_core::aggregation::entity::{AggregationRecord, DayAggregation, Trade};
use tally_core::aggregation::error::AggregationError;
use tally_core::aggregation::port::Ledger;
use tally_core::common::Ticker;
use tracing::trace;

// 单日的证券 → 聚合记录表
type TickerBook = DashMap<Ticker, AggregationRecord>;

/// # Summary
/// 基于 DashMap 的内存账本实现。
///
/// # Invariants
/// - 外层按日期分段加锁，只在首次创建某日映射时短暂持有写锁。
/// - 内层按证券分段加锁，同一 (日期, 证券) 的创建与更新在同一把分段写锁内完成。
/// - 不同键的写入落在不同分段上并行执行，没有全局锁。
/// - 记录只增不删，生命周期与账本一致。
pub struct MemLedger {
    // 日期 → 当日证券表，Arc 使取出后可以立即释放外层分段锁
    days: DashMap<NaiveDate, Arc<TickerBook>>,
}

impl MemLedger {
    /// # Summary
    /// 创建一个空账本。
    pub fn new() -> Self {
        Self {
            days: DashMap::new(),
        }
    }

    /// # Summary
    /// 获取或创建某日的证券表。
    ///
    /// # Logic
    /// 1. 读锁命中直接克隆 Arc 返回。
    /// 2. 未命中时通过 entry 原子地插入空表，再克隆 Arc。
    ///
    /// # Arguments
    /// * `day`: 自然日。
    ///
    /// # Returns
    /// 当日证券表的共享指针；外层锁在返回前已经释放。
    fn book_for(&self, day: NaiveDate) -> Arc<TickerBook> {
        if let Some(book) = self.days.get(&day) {
            return Arc::clone(book.value());
        }
        Arc::clone(self.days.entry(day).or_default().value())
    }

    /// 已记录的成交总笔数。
    pub fn trade_count(&self) -> u64 {
        self.days
            .iter()
            .map(|day| {
                day.value()
                    .iter()
                    .map(|record| record.trade_count())
                    .sum::<u64>()
            })
            .sum()
    }
}

impl Default for MemLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for MemLedger {
    /// # Logic
    /// 1. 由成交时间推导自然日，取得当日证券表。
    /// 2. 在证券表的分段写锁内获取或创建记录并并入成交。
    fn record_trade(&self, trade: &Trade) -> Result<(), AggregationError> {
        let book = self.book_for(trade.day());
        {
            let mut record = book
                .entry(trade.ticker.clone())
                .or_insert_with(|| AggregationRecord::new(trade.ticker.clone()));
            record.record_trade(trade)?;
        }
        trace!(
            "Recorded trade {} {} x {} at {}",
            trade.ticker, trade.price, trade.quantity, trade.timestamp
        );
        Ok(())
    }

    fn aggregation_for(&self, day: NaiveDate) -> DayAggregation {
        let Some(book) = self.days.get(&day).map(|b| Arc::clone(b.value())) else {
            return DayAggregation::new();
        };
        book.iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    fn all_days(&self) -> BTreeSet<NaiveDate> {
        self.days.iter().map(|entry| *entry.key()).collect()
    }

    fn tickers(&self) -> BTreeSet<Ticker> {
        let mut tickers = BTreeSet::new();
        for day in self.days.iter() {
            tickers.extend(day.value().iter().map(|entry| entry.key().clone()));
        }
        tickers
    }
}
