use rust_decimal::Decimal;
use tally_core::index::entity::{PriceMap, WeightTable};
use tally_core::index::error::IndexError;

/// # Summary
/// 严格模式的加权指数计算器，无状态。
/// 要求权重表中的每一个证券都有价格，否则拒绝计算。
pub struct IndexCalculator;

impl Default for IndexCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexCalculator {
    pub fn new() -> Self {
        Self
    }

    /// # Summary
    /// 计算 Σ(weight × price)。
    ///
    /// # Logic
    /// 1. 按证券代码升序遍历权重表。
    /// 2. 价格映射中缺少该证券或价格为空时立即失败，不返回部分和。
    /// 3. 价格映射中多出的证券忽略。
    ///
    /// # Arguments
    /// * `prices`: 证券 → 价格。
    /// * `weights`: 权重表。
    ///
    /// # Returns
    /// 成功返回指数值；缺价返回 `IndexError::MissingPriceOrWeight`，携带第一个缺价的证券。
    pub fn calculate(&self, prices: &PriceMap, weights: &WeightTable) -> Result<Decimal, IndexError> {
        weights.iter().try_fold(Decimal::ZERO, |acc, (ticker, weight)| {
            let price = prices
                .get(ticker)
                .copied()
                .flatten()
                .ok_or_else(|| IndexError::MissingPriceOrWeight(ticker.to_string()))?;
            Ok(acc + weight * price)
        })
    }
}
