use crate::aggregation::error::AggregationError;
use crate::common::Ticker;
use crate::common::time::calendar_day;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// 单笔成交记录，由外部解析层产生，进入核心后不可变。
///
/// # Invariants
/// - `ticker` 非空。
/// - `price` 使用十进制定点数，避免二进制浮点误差累积。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    // 成交时间（精确到秒）
    pub timestamp: NaiveDateTime,
    // 证券代码
    pub ticker: Ticker,
    // 成交价格
    pub price: Decimal,
    // 成交数量
    pub quantity: u64,
}

impl Trade {
    pub fn new(
        timestamp: NaiveDateTime,
        ticker: impl Into<Ticker>,
        price: Decimal,
        quantity: u64,
    ) -> Self {
        Self {
            timestamp,
            ticker: ticker.into(),
            price,
            quantity,
        }
    }

    /// 成交所属的自然日。
    pub fn day(&self) -> NaiveDate {
        calendar_day(&self.timestamp)
    }

    /// 成交额：价格 × 数量。
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// # Summary
/// 带时间的价格点，用于确定开盘与收盘。
///
/// # Invariants
/// - 排序先比较 `time`，时间相同再比较 `price`，保证全序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: NaiveDateTime,
    pub price: Decimal,
}

/// # Summary
/// 单个证券在单个自然日内的 OHLCV 累加器。
///
/// # Invariants
/// - `ticker` 在创建后不可变，只接受同一证券的成交。
/// - 开盘/收盘由成交时间决定，与写入顺序无关；时间相同则开盘取低价、收盘取高价。
/// - `volume_of_trades` 严格累加 `price × quantity`。
/// - 任意两笔成交以任意顺序写入，最终状态相同。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRecord {
    ticker: Ticker,
    // 时间最早的成交
    open: Option<PricePoint>,
    // 时间最晚的成交
    close: Option<PricePoint>,
    highest_price: Option<Decimal>,
    lowest_price: Option<Decimal>,
    volume_of_trades: Decimal,
    trade_count: u64,
}

impl AggregationRecord {
    /// # Summary
    /// 创建一个绑定到指定证券的空记录。
    ///
    /// # Arguments
    /// * `ticker`: 证券代码。
    ///
    /// # Returns
    /// 尚未记录任何成交的 AggregationRecord。
    pub fn new(ticker: impl Into<Ticker>) -> Self {
        Self {
            ticker: ticker.into(),
            open: None,
            close: None,
            highest_price: None,
            lowest_price: None,
            volume_of_trades: Decimal::ZERO,
            trade_count: 0,
        }
    }

    /// # Summary
    /// 将一笔成交并入当日统计。
    ///
    /// # Logic
    /// 1. 校验成交证券与记录证券一致，不一致视为路由错误直接拒绝。
    /// 2. 开盘点取 (时间, 价格) 最小者，收盘点取最大者。
    /// 3. 更新最高价、最低价。
    /// 4. 累加成交额与成交笔数。
    ///
    /// # Arguments
    /// * `trade`: 待并入的成交。
    ///
    /// # Returns
    /// 成功返回 Ok；证券不匹配返回 `AggregationError::TickerMismatch`，记录保持不变。
    pub fn record_trade(&mut self, trade: &Trade) -> Result<(), AggregationError> {
        if trade.ticker != self.ticker {
            return Err(AggregationError::TickerMismatch {
                expected: self.ticker.clone(),
                actual: trade.ticker.clone(),
            });
        }

        let point = PricePoint {
            time: trade.timestamp,
            price: trade.price,
        };
        self.open = Some(self.open.map_or(point, |open| open.min(point)));
        self.close = Some(self.close.map_or(point, |close| close.max(point)));

        self.highest_price = Some(
            self.highest_price
                .map_or(trade.price, |high| high.max(trade.price)),
        );
        self.lowest_price = Some(
            self.lowest_price
                .map_or(trade.price, |low| low.min(trade.price)),
        );

        self.volume_of_trades += trade.notional();
        self.trade_count += 1;
        Ok(())
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn open_time(&self) -> Option<NaiveDateTime> {
        self.open.map(|p| p.time)
    }

    pub fn open_price(&self) -> Option<Decimal> {
        self.open.map(|p| p.price)
    }

    pub fn close_time(&self) -> Option<NaiveDateTime> {
        self.close.map(|p| p.time)
    }

    pub fn close_price(&self) -> Option<Decimal> {
        self.close.map(|p| p.price)
    }

    pub fn highest_price(&self) -> Option<Decimal> {
        self.highest_price
    }

    pub fn lowest_price(&self) -> Option<Decimal> {
        self.lowest_price
    }

    pub fn volume_of_trades(&self) -> Decimal {
        self.volume_of_trades
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    /// 尚未记录任何成交。
    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }
}

/// # Summary
/// 单日聚合快照：证券代码 → 当日统计，按代码排序。
/// 由账本按值返回，调用方持有的是副本，无法借此修改账本。
pub type DayAggregation = BTreeMap<Ticker, AggregationRecord>;
