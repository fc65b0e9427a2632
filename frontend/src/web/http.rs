//! HTTP 传输层
//!
//! `Transport` 是请求发送的抽象接口，生产环境使用 `web_sys::fetch` 实现，
//! 测试使用内存中的 `MockTransport`。

use crate::error::{ApiError, ApiResult};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};
use yun_shared::protocol::HttpMethod;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// multipart 表单字段
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// 请求体
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Text(String),
    Multipart(Vec<FormPart>),
}

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(RequestBody::Text(body));
        self
    }

    pub fn with_multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输接口
///
/// (?Send) 是因为浏览器环境下的 Future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 实现层: fetch 客户端 (Production)
// =========================================================

/// 基于 `window.fetch` 的传输实现
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    fn build_form(parts: &[FormPart]) -> Result<FormData, JsValue> {
        let form = FormData::new()?;
        for part in parts {
            match part {
                FormPart::Text { name, value } => form.append_with_str(name, value)?,
                FormPart::File {
                    name,
                    filename,
                    mime,
                    bytes,
                } => {
                    let chunk = js_sys::Uint8Array::from(bytes.as_slice());
                    let options = BlobPropertyBag::new();
                    options.set_type(mime);
                    let blob = Blob::new_with_u8_array_sequence_and_options(
                        &js_sys::Array::of1(&chunk),
                        &options,
                    )?;
                    form.append_with_blob_and_filename(name, &blob, filename)?;
                }
            }
        }
        Ok(form)
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let headers = Headers::new()
            .map_err(|e| ApiError::network(format!("创建 Headers 失败: {:?}", e)))?;

        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| ApiError::network(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        match &req.body {
            Some(RequestBody::Text(body)) => opts.set_body(&JsValue::from_str(body)),
            Some(RequestBody::Multipart(parts)) => {
                // Content-Type 由浏览器根据 FormData 自动生成（含 boundary）
                let form = Self::build_form(parts)
                    .map_err(|e| ApiError::network(format!("构建表单失败: {:?}", e)))?;
                opts.set_body(&form.into());
            }
            None => {}
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| ApiError::network(format!("{:?}", e)).in_op_with("http.build", &req.url))?;

        let window =
            web_sys::window().ok_or_else(|| ApiError::network("无法获取 window 对象"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::network(format!("{:?}", e)).in_op_with("http.fetch", &req.url))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| ApiError::decode(format!("Response 类型转换失败: {:?}", e)))?;

        let status = response.status();
        let promise = response
            .text()
            .map_err(|e| ApiError::decode(format!("{:?}", e)))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| ApiError::decode(format!("{:?}", e)))?;

        Ok(HttpResponse {
            status,
            body: text.as_string().unwrap_or_default(),
        })
    }
}

// =========================================================
// 测试工具: MockTransport
// =========================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// 测试用 API 根地址
    pub const MOCK_BASE: &str = "http://api.test";

    /// 内存中的传输实现
    ///
    /// 按 "METHOD /path" 匹配预设响应（忽略查询串）。同一端点的响应按预设顺序依次返回，
    /// 用完后重复最后一个。
    pub struct MockTransport {
        responses: Mutex<HashMap<String, Canned>>,
        pub requests: Mutex<Vec<HttpRequest>>,
        /// 发送前让出一次执行权，用于模拟在途请求
        yield_before_reply: bool,
    }

    #[derive(Default)]
    struct Canned {
        queued: VecDeque<(u16, String)>,
        last: Option<(u16, String)>,
    }

    impl Canned {
        fn next(&mut self) -> Option<(u16, String)> {
            match self.queued.pop_front() {
                Some(reply) => {
                    self.last = Some(reply.clone());
                    Some(reply)
                }
                None => self.last.clone(),
            }
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                requests: Mutex::new(Vec::new()),
                yield_before_reply: false,
            }
        }

        pub fn yielding() -> Self {
            Self {
                yield_before_reply: true,
                ..Self::new()
            }
        }

        fn key(method: HttpMethod, path: &str) -> String {
            format!("{} {}", method.as_str(), path)
        }

        pub fn mock_response(&self, method: HttpMethod, path: &str, status: u16, body: serde_json::Value) {
            self.mock_raw(method, path, status, &body.to_string());
        }

        pub fn mock_raw(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .entry(Self::key(method, path))
                .or_default()
                .queued
                .push_back((status, body.to_string()));
        }

        /// 统一信封形式的成功响应
        pub fn mock_ok(&self, method: HttpMethod, path: &str, data: serde_json::Value) {
            self.mock_response(
                method,
                path,
                200,
                serde_json::json!({ "code": 200, "msg": "ok", "success": true, "data": data }),
            );
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.lock().unwrap().last().cloned()
        }

        pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && Self::path_of(&r.url) == path)
                .cloned()
                .collect()
        }

        fn path_of(url: &str) -> &str {
            let path = url.strip_prefix(MOCK_BASE).unwrap_or(url);
            path.split('?').next().unwrap_or(path)
        }
    }

    #[async_trait::async_trait(?Send)]
    impl Transport for MockTransport {
        async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
            let key = Self::key(req.method, Self::path_of(&req.url));
            self.requests.lock().unwrap().push(req);

            if self.yield_before_reply {
                tokio::task::yield_now().await;
            }

            let mut responses = self.responses.lock().unwrap();
            let reply = responses.get_mut(&key).and_then(Canned::next);

            match reply {
                Some((status, body)) => Ok(HttpResponse { status, body }),
                None => Err(ApiError::network(format!("no mock for {}", key))),
            }
        }
    }
}
