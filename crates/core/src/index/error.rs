use thiserror::Error;

/// # Summary
/// 指数计算错误枚举。
///
/// # Invariants
/// - 只在严格模式下出现；指数不可用不是错误，见 `MarketIndex::Unavailable`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    // 加权证券缺少价格或权重
    #[error("Missing price or weight for ticker {0}")]
    MissingPriceOrWeight(String),
}
