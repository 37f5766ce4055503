use crate::aggregation::entity::Trade;
use crate::feed::error::FeedError;
use crate::index::entity::WeightTable;
use async_trait::async_trait;

/// # Summary
/// 成交数据来源接口。
///
/// # Invariants
/// - 返回的成交已完成类型校验，核心层不再解析原始文本。
#[async_trait]
pub trait TradeSource: Send + Sync {
    /// # Summary
    /// 读取全部成交。
    ///
    /// # Logic
    /// 1. 读取底层介质。
    /// 2. 逐行解析为 Trade，遇到非法行立即失败。
    ///
    /// # Returns
    /// 成功返回成交列表（保持输入顺序），失败返回 FeedError。
    async fn load_trades(&self) -> Result<Vec<Trade>, FeedError>;
}

/// # Summary
/// 指数权重来源接口。
#[async_trait]
pub trait WeightSource: Send + Sync {
    /// # Summary
    /// 读取权重表。
    ///
    /// # Returns
    /// 成功返回 WeightTable，失败返回 FeedError。
    async fn load_weights(&self) -> Result<WeightTable, FeedError>;
}
