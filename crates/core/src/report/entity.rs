use crate::aggregation::entity::AggregationRecord;
use crate::common::Ticker;
use crate::index::entity::MarketIndex;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Summary
/// 某证券在某一天的交易情况。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickerActivity {
    // 当日有成交
    Traded(AggregationRecord),
    // 当日无成交
    Idle,
}

impl TickerActivity {
    pub fn record(&self) -> Option<&AggregationRecord> {
        match self {
            TickerActivity::Traded(record) => Some(record),
            TickerActivity::Idle => None,
        }
    }
}

/// # Summary
/// 单日汇总输出，交给报告层消费。
///
/// # Invariants
/// - `tickers` 覆盖本次运行中出现过的全部证券，当日无成交的标记为 `Idle`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub tickers: BTreeMap<Ticker, TickerActivity>,
    pub index: MarketIndex,
}
