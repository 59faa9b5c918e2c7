//! 错误处理模块

use thiserror::Error;

/// weekly-report 库的统一错误类型
///
/// 传输失败、流读取失败与配置问题都在这里分类，调用方据此决定如何提示用户
#[derive(Debug, Error)]
pub enum ReportError {
    /// HTTP 请求相关错误（连接失败、读取响应体失败等）
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务端返回非成功状态码
    #[error("请求失败，状态码 {status}: {reason}")]
    Status { status: u16, reason: String },

    /// JSON 序列化/反序列化错误
    #[error("JSON处理错误: {0}")]
    Json(String),

    /// 流处理相关错误
    #[error("流处理错误: {0}")]
    StreamError(String),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 本地化文案加载错误
    #[error("文案加载失败: {0}")]
    Messages(String),

    /// 剪贴板写入失败
    #[error("剪贴板错误: {0}")]
    Clipboard(String),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// weekly-report 库的 Result 类型别名
pub type Result<T> = std::result::Result<T, ReportError>;

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Json(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ReportError::Status {
            status: 502,
            reason: "Bad Gateway".into(),
        };
        assert_eq!(err.to_string(), "请求失败，状态码 502: Bad Gateway");
    }

    #[test]
    fn test_json_error_conversion() {
        let err: ReportError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ReportError::Json(_)));
    }
}
