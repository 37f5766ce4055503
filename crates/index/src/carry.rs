use crate::strict::IndexCalculator;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tally_core::aggregation::entity::{AggregationRecord, DayAggregation};
use tally_core::common::Ticker;
use tally_core::index::entity::{MarketIndex, PriceMap, WeightTable};
use tally_core::index::error::IndexError;
use tracing::debug;

/// # Summary
/// 单个加权证券对指数的价格状态。
///
/// # Invariants
/// - 只允许 `NeverTraded → HasPrice` 单向迁移。
/// - `HasPrice` 的值只在出现新收盘价的日期被覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceState {
    NeverTraded,
    HasPrice(Decimal),
}

impl PriceState {
    pub fn price(&self) -> Option<Decimal> {
        match self {
            PriceState::NeverTraded => None,
            PriceState::HasPrice(price) => Some(*price),
        }
    }
}

/// # Summary
/// 按日推进的沿用式指数计算器。
/// 证券当日无成交时沿用其最近收盘价；从未成交过的证券使当日数据不完整。
///
/// # Invariants
/// - 必须按日期升序逐日调用 `advance`，不可并行。
/// - 数据不完整的日期不计算部分和：此前算出过指数则沿用上一个值，否则为不可用。
/// - 数据完整的日期总是用（新鲜或沿用的）收盘价重新计算，并成为新的“上一个指数”。
pub struct CarryForwardIndex {
    calculator: IndexCalculator,
    weights: WeightTable,
    // 每个加权证券的最近收盘价状态
    states: BTreeMap<Ticker, PriceState>,
    // 最近一次计算出的指数
    last_index: Option<Decimal>,
}

impl CarryForwardIndex {
    /// # Summary
    /// 以给定权重表创建计算器，所有加权证券初始为 `NeverTraded`。
    pub fn new(weights: WeightTable) -> Self {
        let states = weights
            .tickers()
            .map(|ticker| (ticker.to_string(), PriceState::NeverTraded))
            .collect();
        Self {
            calculator: IndexCalculator::new(),
            weights,
            states,
            last_index: None,
        }
    }

    /// # Summary
    /// 推进一天并给出当日指数。
    ///
    /// # Logic
    /// 1. 对每个加权证券：当日有收盘价则采用并更新状态；否则沿用已有状态。
    /// 2. 任一证券仍为 `NeverTraded` 时当日不完整：返回 `Carried(上一个指数)` 或 `Unavailable`。
    /// 3. 否则以解析出的价格调用严格计算器，记录并返回 `Computed`。
    ///
    /// # Arguments
    /// * `day`: 当日聚合快照。
    ///
    /// # Returns
    /// 当日指数；严格计算失败时返回 IndexError（完整数据下不会发生）。
    pub fn advance(&mut self, day: &DayAggregation) -> Result<MarketIndex, IndexError> {
        let mut prices = PriceMap::with_capacity(self.weights.len());
        let mut never_traded = Vec::new();

        for ticker in self.weights.tickers() {
            let state = self
                .states
                .entry(ticker.to_string())
                .or_insert(PriceState::NeverTraded);
            if let Some(close) = day.get(ticker).and_then(AggregationRecord::close_price) {
                *state = PriceState::HasPrice(close);
            }
            if *state == PriceState::NeverTraded {
                never_traded.push(ticker);
            }
            prices.insert(ticker.to_string(), state.price());
        }

        if !never_traded.is_empty() {
            debug!(
                "Index incomplete, never traded: {}",
                never_traded.join(",")
            );
            return Ok(match self.last_index {
                Some(previous) => MarketIndex::Carried(previous),
                None => MarketIndex::Unavailable,
            });
        }

        let value = self.calculator.calculate(&prices, &self.weights)?;
        self.last_index = Some(value);
        Ok(MarketIndex::Computed(value))
    }

    /// 某加权证券的当前价格状态；未加权证券返回 None。
    pub fn state(&self, ticker: &str) -> Option<PriceState> {
        self.states.get(ticker).copied()
    }

    /// 最近一次计算出的指数。
    pub fn last_index(&self) -> Option<Decimal> {
        self.last_index
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }
}
