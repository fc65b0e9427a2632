use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod date;
pub mod id;
pub mod model;
pub mod protocol;

pub use date::Timestamp;
pub use id::{CommentId, UserId, VideoId};
pub use model::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// =========================================================
// 响应信封 (Envelope)
// =========================================================

/// 统一业务响应 `{ code, msg, data, success, trace_id }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: Option<T>,
    pub success: bool,
    #[serde(default)]
    pub trace_id: Option<String>,
}

/// 解码后的响应
///
/// 只有同时带数字 `code` 与布尔 `success` 的对象才按信封解码，
/// 其余载荷（如验证码图片）原样透传。
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Envelope(ApiResponse<T>),
    Bare(T),
}

impl<T: DeserializeOwned> Reply<T> {
    /// 从 JSON 值解码，自动识别是否为信封
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        if is_envelope(&value) {
            serde_json::from_value(value).map(Reply::Envelope)
        } else {
            serde_json::from_value(value).map(Reply::Bare)
        }
    }
}

impl<T> Reply<T> {
    /// 业务是否成功（透传载荷视为成功）
    pub fn is_success(&self) -> bool {
        match self {
            Reply::Envelope(env) => env.success,
            Reply::Bare(_) => true,
        }
    }

    /// 业务消息
    pub fn message(&self) -> Option<&str> {
        match self {
            Reply::Envelope(env) => env.msg.as_deref(),
            Reply::Bare(_) => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Reply::Envelope(env) => env.data.as_ref(),
            Reply::Bare(data) => Some(data),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Reply::Envelope(env) => env.data,
            Reply::Bare(data) => Some(data),
        }
    }

    /// 仅在业务成功时取出数据
    pub fn into_success_data(self) -> Option<T> {
        if self.is_success() { self.into_data() } else { None }
    }
}

/// 是否满足信封形态：数字 `code` 且布尔 `success`
pub fn is_envelope(value: &Value) -> bool {
    value.as_object().is_some_and(|obj| {
        obj.get("code").is_some_and(Value::is_number)
            && obj.get("success").is_some_and(Value::is_boolean)
    })
}

// =========================================================
// 分页
// =========================================================

/// 分页响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "id::null_as_default")]
    pub items: Vec<T>,
    #[serde(default, deserialize_with = "id::null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "id::null_as_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "id::null_as_default")]
    pub size: u32,
    #[serde(default, deserialize_with = "id::null_as_default")]
    pub pages: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 0,
            size: 0,
            pages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_detected_only_with_numeric_code_and_bool_success() {
        assert!(is_envelope(&json!({ "code": 0, "success": true, "data": 1 })));
        assert!(!is_envelope(&json!({ "code": "0", "success": true })));
        assert!(!is_envelope(&json!({ "code": 0, "success": "true" })));
        assert!(!is_envelope(&json!({ "captcha_id": "x", "image_base64": "y" })));
        assert!(!is_envelope(&json!([1, 2, 3])));
    }

    #[test]
    fn reply_unwraps_envelope() {
        let reply: Reply<Page<u32>> = Reply::from_value(json!({
            "code": 200,
            "msg": "ok",
            "success": true,
            "data": { "items": [1, 2], "total": 9 }
        }))
        .unwrap();

        assert!(reply.is_success());
        assert_eq!(reply.message(), Some("ok"));
        let page = reply.into_data().unwrap();
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total, 9);
    }

    #[test]
    fn reply_passes_bare_payload_through() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Captcha {
            captcha_id: String,
        }

        let reply: Reply<Captcha> = Reply::from_value(json!({ "captcha_id": "abc" })).unwrap();
        assert!(matches!(reply, Reply::Bare(_)));
        assert_eq!(reply.into_data().unwrap().captcha_id, "abc");
    }

    #[test]
    fn soft_failure_keeps_message_and_hides_data() {
        let reply: Reply<u32> = Reply::from_value(json!({
            "code": 4001,
            "msg": "already liked",
            "success": false,
            "data": 3
        }))
        .unwrap();

        assert!(!reply.is_success());
        assert_eq!(reply.message(), Some("already liked"));
        assert_eq!(reply.into_success_data(), None);
    }
}
