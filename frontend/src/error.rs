use std::fmt;

// =========================================================
// 错误类型枚举
// =========================================================

/// 客户端错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 网络 / 传输层失败（fetch 被拒、无法构建请求）
    Network,
    /// 401: 会话过期或令牌无效
    Unauthorized,
    /// 其他非 2xx 响应
    Http,
    /// 响应解析失败
    Decode,
    /// 本地输入校验失败（请求未发出）
    Validation,
    /// 信封 `success:false`，由调用方决定是否升级为错误
    Business,
}

impl ApiErrorKind {
    /// 机器可读的错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::Http => "HTTP_ERROR",
            ApiErrorKind::Decode => "DECODE_ERROR",
            ApiErrorKind::Validation => "INVALID_INPUT",
            ApiErrorKind::Business => "BUSINESS_FAILURE",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "comments.load", "session.fetch_profile"
    pub operation: String,
    /// 额外的细节信息，如评论 ID、请求路径
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端统一错误
///
/// - kind: 错误分类
/// - message: 面向用户的消息（已从错误载荷中挑选最合适的字段）
/// - status: HTTP 状态码（传输层失败时为空）
/// - source: 原始错误（可选，用于错误链）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message).with_status(401)
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Http, message).with_status(status)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Business, message)
    }

    // --- Context builders ---

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    /// 设置原始错误源
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::decode(e.to_string()).with_source(e)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_trace() {
        let err = ApiError::http(500, "服务器错误")
            .in_op_with("http.send", "/comment/7")
            .in_op("comments.delete");

        assert_eq!(
            err.to_string(),
            "[HTTP_ERROR] 服务器错误 (HTTP 500) | trace: http.send(/comment/7) -> comments.delete"
        );
    }

    #[test]
    fn unauthorized_carries_401() {
        let err = ApiError::unauthorized("expired");
        assert!(err.is_unauthorized());
        assert_eq!(err.status, Some(401));
    }

    #[test]
    fn serde_error_converts_to_decode() {
        let err: ApiError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind, ApiErrorKind::Decode);
        assert!(std::error::Error::source(&err).is_some());
    }
}
