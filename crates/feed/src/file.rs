use crate::parse::{parse_trades, parse_weights};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tally_core::aggregation::entity::Trade;
use tally_core::feed::error::FeedError;
use tally_core::feed::port::{TradeSource, WeightSource};
use tally_core::index::entity::WeightTable;
use tracing::info;

/// # Summary
/// 异步读取整个文本文件。
///
/// # Returns
/// 成功返回文件内容，失败返回带路径的 `FeedError::Io`。
async fn read_text(path: &Path) -> Result<String, FeedError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FeedError::Io(format!("{}: {}", path.display(), e)))
}

/// # Summary
/// 基于本地文件的成交日志来源。
///
/// # Invariants
/// - 文件格式为每行 `yyyy-MM-dd HH:mm:ss;代码;价格;数量`。
#[derive(Debug, Clone)]
pub struct FileTradeSource {
    path: PathBuf,
}

impl FileTradeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TradeSource for FileTradeSource {
    /// # Logic
    /// 1. 通过 tokio::fs 读取整个文件。
    /// 2. 交给 `parse_trades` 逐行解析。
    async fn load_trades(&self) -> Result<Vec<Trade>, FeedError> {
        info!("Loading trades from {}", self.path.display());
        let content = read_text(&self.path).await?;
        parse_trades(&content)
    }
}

/// # Summary
/// 基于本地文件的指数权重来源，每行 `代码:权重`。
#[derive(Debug, Clone)]
pub struct FileWeightSource {
    path: PathBuf,
}

impl FileWeightSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WeightSource for FileWeightSource {
    async fn load_weights(&self) -> Result<WeightTable, FeedError> {
        info!("Loading index weights from {}", self.path.display());
        let content = read_text(&self.path).await?;
        parse_weights(&content)
    }
}
