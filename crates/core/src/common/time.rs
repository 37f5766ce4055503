use chrono::{NaiveDate, NaiveDateTime};

/// 成交日志使用的时间戳格式，精确到秒。
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// # Summary
/// 计算成交时间戳所属的自然日，作为账本的分桶键。
///
/// # Arguments
/// * `timestamp`: 成交时间（本地时间，无时区）。
///
/// # Returns
/// 时间戳对应的日期部分。
pub fn calendar_day(timestamp: &NaiveDateTime) -> NaiveDate {
    timestamp.date()
}

/// # Summary
/// 按 `TIMESTAMP_FORMAT` 解析成交时间戳。
///
/// # Logic
/// 1. 去除首尾空白。
/// 2. 按固定格式解析。
///
/// # Arguments
/// * `raw`: 原始文本，例如 `2025-01-20 09:00:01`。
///
/// # Returns
/// 成功返回时间戳，格式不符返回 chrono 的解析错误。
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
}

/// # Summary
/// 生成闭区间 `[first, last]` 内的全部自然日。
///
/// # Logic
/// 1. 从 `first` 开始逐日递增。
/// 2. 越过 `last` 后停止；`first > last` 时不产生任何日期。
pub fn days_inclusive(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take_while(move |day| *day <= last)
}
