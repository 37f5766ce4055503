use crate::common::Ticker;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// # Summary
/// 指数权重表：证券代码 → 权重。
///
/// # Invariants
/// - 每次运行只提供一次，之后只读。
/// - 不校验权重之和，由调用方决定是否接受。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    weights: BTreeMap<Ticker, Decimal>,
}

impl WeightTable {
    pub fn new(weights: BTreeMap<Ticker, Decimal>) -> Self {
        Self { weights }
    }

    pub fn get(&self, ticker: &str) -> Option<Decimal> {
        self.weights.get(ticker).copied()
    }

    /// 按证券代码升序遍历。
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    /// 全部权重之和。
    pub fn total(&self) -> Decimal {
        self.weights.values().copied().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl FromIterator<(Ticker, Decimal)> for WeightTable {
    fn from_iter<I: IntoIterator<Item = (Ticker, Decimal)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// # Summary
/// 严格模式计算的输入：证券代码 → 价格（可能缺失）。
pub type PriceMap = HashMap<Ticker, Option<Decimal>>;

/// # Summary
/// 单日指数结果。
///
/// # Invariants
/// - `Unavailable` 是合法输出，必须与 `Computed(0)` 区分。
/// - `Carried` 只在当日数据不完整、且此前已算出过指数时出现，值为上一次计算结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketIndex {
    // 当日数据完整，按最新或沿用的收盘价重新计算
    Computed(Decimal),
    // 当日数据不完整，沿用上一个计算出的指数
    Carried(Decimal),
    // 从未具备完整数据，指数不可用
    Unavailable,
}

impl MarketIndex {
    /// 指数数值；不可用时为 None。
    pub fn value(&self) -> Option<Decimal> {
        match self {
            MarketIndex::Computed(v) | MarketIndex::Carried(v) => Some(*v),
            MarketIndex::Unavailable => None,
        }
    }
}
