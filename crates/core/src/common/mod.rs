pub mod time;

/// # Summary
/// 证券代码类型别名，例如 `ABC`、`MEGA`。
///
/// # Invariants
/// - 非空字符串，由上游解析层保证。
pub type Ticker = String;
