use rust_decimal::Decimal;
use std::str::FromStr;
use tally_core::aggregation::entity::Trade;
use tally_core::common::time::parse_timestamp;
use tally_core::feed::error::FeedError;
use tally_core::index::entity::WeightTable;
use tracing::{debug, info};

/// # Summary
/// 判断一行是否需要跳过。
///
/// # Logic
/// 空行、`#` 注释行、以 `date` 开头（忽略大小写）的表头行均跳过。
fn is_skipped(line: &str, header_prefix: Option<&str>) -> bool {
    if line.is_empty() || line.starts_with('#') {
        return true;
    }
    header_prefix.is_some_and(|prefix| {
        line.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

fn invalid(line: usize, content: &str, reason: impl Into<String>) -> FeedError {
    FeedError::InvalidLine {
        line,
        content: content.to_string(),
        reason: reason.into(),
    }
}

/// # Summary
/// 解析成交日志文本。
///
/// # Logic
/// 1. 逐行去除首尾空白，跳过空行、注释与表头。
/// 2. 以 `;` 分隔为 `时间;代码;价格;数量` 四段，多余字段忽略。
/// 3. 任一字段非法即返回带行号的 `FeedError::InvalidLine`。
///
/// # Arguments
/// * `content`: 完整的日志文本。
///
/// # Returns
/// 按出现顺序排列的成交列表。
pub fn parse_trades(content: &str) -> Result<Vec<Trade>, FeedError> {
    let mut trades = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if is_skipped(line, Some("date")) {
            continue;
        }
        trades.push(parse_trade(line_no, line)?);
        debug!("Parsed line {}: {}", line_no, line);
    }
    info!("Parsed {} trades", trades.len());
    Ok(trades)
}

fn parse_trade(line_no: usize, line: &str) -> Result<Trade, FeedError> {
    let parts: Vec<&str> = line.split(';').map(str::trim).collect();
    let [timestamp, ticker, price, quantity, ..] = parts.as_slice() else {
        return Err(invalid(line_no, line, "expected date;ticker;price;quantity"));
    };

    let timestamp = parse_timestamp(timestamp)
        .map_err(|e| invalid(line_no, line, format!("timestamp: {e}")))?;
    if ticker.is_empty() {
        return Err(invalid(line_no, line, "empty ticker"));
    }
    let price =
        Decimal::from_str(price).map_err(|e| invalid(line_no, line, format!("price: {e}")))?;
    let quantity = quantity
        .parse::<u64>()
        .map_err(|e| invalid(line_no, line, format!("quantity: {e}")))?;

    Ok(Trade::new(timestamp, *ticker, price, quantity))
}

/// # Summary
/// 解析权重文件文本。
///
/// # Logic
/// 1. 逐行去除首尾空白，跳过空行与注释。
/// 2. 以第一个 `:` 分隔为 `代码:权重`。
/// 3. 同一代码重复出现时以后者为准。
///
/// # Arguments
/// * `content`: 完整的权重文本。
///
/// # Returns
/// 权重表；不校验权重之和。
pub fn parse_weights(content: &str) -> Result<WeightTable, FeedError> {
    let mut entries = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if is_skipped(line, None) {
            continue;
        }
        let Some((ticker, weight)) = line.split_once(':') else {
            return Err(invalid(line_no, line, "expected ticker:weight"));
        };
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(invalid(line_no, line, "empty ticker"));
        }
        let weight = Decimal::from_str(weight.trim())
            .map_err(|e| invalid(line_no, line, format!("weight: {e}")))?;
        entries.push((ticker.to_string(), weight));
    }
    let table: WeightTable = entries.into_iter().collect();
    info!("Parsed {} index weights", table.len());
    Ok(table)
}
