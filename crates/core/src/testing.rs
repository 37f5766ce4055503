//! 跨 crate 共享的测试夹具，仅在 `test-utils` 特性下编译。
#![allow(clippy::expect_used)]

use crate::aggregation::entity::Trade;
use crate::common::time::parse_timestamp;
use crate::index::entity::WeightTable;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// 解析 `yyyy-MM-dd HH:mm:ss` 格式的时间戳。
pub fn at(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).expect("fixture timestamp must be yyyy-MM-dd HH:mm:ss")
}

/// 解析 `yyyy-MM-dd` 格式的日期。
pub fn day(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("fixture day must be yyyy-MM-dd")
}

/// 构造一笔成交。
pub fn trade(timestamp: &str, ticker: &str, price: Decimal, quantity: u64) -> Trade {
    Trade::new(at(timestamp), ticker, price, quantity)
}

/// 由 (代码, 权重) 列表构造权重表。
pub fn weights(entries: &[(&str, Decimal)]) -> WeightTable {
    entries
        .iter()
        .map(|(ticker, weight)| (ticker.to_string(), *weight))
        .collect()
}
