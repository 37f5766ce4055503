use thiserror::Error;

/// # Summary
/// 输入源错误枚举，处理读取失败与行格式错误。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 行号从 1 开始计数。
#[derive(Error, Debug)]
pub enum FeedError {
    // 底层读取失败，如文件不存在
    #[error("IO error: {0}")]
    Io(String),
    // 某一行无法解析
    #[error("Invalid line {line} ({reason}): {content}")]
    InvalidLine {
        line: usize,
        content: String,
        reason: String,
    },
}
