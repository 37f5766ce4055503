use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::{Stdout, Write};
use std::sync::Mutex;
use tally_core::aggregation::entity::AggregationRecord;
use tally_core::report::entity::{DailySummary, TickerActivity};
use tally_core::report::error::ReportError;
use tally_core::report::port::ReportSink;

const SEPARATOR: &str = "--------------------------------------------------";

/// # Summary
/// 纯文本报告输出端，逐日写出 OHLCV 与指数。
///
/// # Invariants
/// - 写出端由 Mutex 保护，多次 `publish` 的输出不会交错。
/// - 价格保留一位小数，成交额保留两位小数，缺失值输出 `N/A`。
pub struct TextReport<W: Write + Send> {
    out: Mutex<W>,
}

impl TextReport<Stdout> {
    /// 输出到标准输出。
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// 取回底层写出端。
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// 四舍五入到 `dp` 位小数，0.5 远离零进位。
/// 直接用 `{:.N}` 格式化 Decimal 只截断不进位。
fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

fn price(value: Option<Decimal>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.1}", round_half_up(v, 1)))
}

fn ticker_line(ticker: &str, record: &AggregationRecord) -> String {
    format!(
        "Ticker: {}, Open: {}, Close: {}, High: {}, Low: {}, Volume: {:.2}",
        ticker,
        price(record.open_price()),
        price(record.close_price()),
        price(record.highest_price()),
        price(record.lowest_price()),
        round_half_up(record.volume_of_trades(), 2)
    )
}

/// # Summary
/// 将单日汇总渲染为文本块。
///
/// # Logic
/// 1. 首行输出日期。
/// 2. 按代码升序逐个输出证券，无成交的证券输出 `N/A` 与零成交额。
/// 3. 输出指数行（不可用为 `N/A`）和分隔线。
pub fn render(summary: &DailySummary) -> String {
    let mut text = format!("Date: {}\n", summary.day);
    for (ticker, activity) in &summary.tickers {
        match activity {
            TickerActivity::Traded(record) => text.push_str(&ticker_line(ticker, record)),
            TickerActivity::Idle => text.push_str(&format!(
                "Ticker: {ticker}, Open: N/A, Close: N/A, High: N/A, Low: N/A, Volume: 0.00"
            )),
        }
        text.push('\n');
    }
    match summary.index.value() {
        Some(value) => text.push_str(&format!(
            "Index for {}: {:.1}\n",
            summary.day,
            round_half_up(value, 1)
        )),
        None => text.push_str(&format!("Index for {}: N/A\n", summary.day)),
    }
    text.push_str(SEPARATOR);
    text.push('\n');
    text
}

#[async_trait]
impl<W: Write + Send> ReportSink for TextReport<W> {
    async fn publish(&self, summary: &DailySummary) -> Result<(), ReportError> {
        let text = render(summary);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
