use thiserror::Error;

/// # Summary
/// 报告输出错误枚举。
#[derive(Error, Debug)]
pub enum ReportError {
    // 写出失败
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err.to_string())
    }
}
