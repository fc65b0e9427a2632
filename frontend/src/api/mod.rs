//! API 客户端
//!
//! 所有出站请求都经过 `ApiClient`：
//! - 自动附加 `Authorization: Bearer <token>`
//! - 按请求声明的编码方式序列化参数（查询串 / JSON 请求体 / multipart）
//! - 识别统一响应信封，业务失败（`success:false`）原样返回给调用方
//! - 401 清除令牌并跳转登录页；其余错误写入提示通道

mod auth;
mod comment;
mod history;
mod user;
mod video;

pub use user::UploadFile;
pub use video::VideoUpload;

use crate::auth::TokenStore;
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::notify::Notifier;
use crate::web::http::{FormPart, HttpRequest, Transport};
use crate::web::navigate::Navigate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use yun_shared::protocol::{ApiRequest, Encoding, HttpMethod};
use yun_shared::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE, Reply};

const FALLBACK_ERROR: &str = "请求错误";
const LOGIN_PATH: &str = "/login";

struct ClientInner {
    config: AppConfig,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    notifier: Notifier,
    navigator: Mutex<Option<Arc<dyn Navigate>>>,
}

/// API 客户端
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        config: AppConfig,
        transport: Arc<dyn Transport>,
        tokens: TokenStore,
        notifier: Notifier,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                tokens,
                notifier,
                navigator: Mutex::new(None),
            }),
        }
    }

    /// 注入导航器（路由服务创建后调用）
    pub fn set_navigator(&self, navigator: Arc<dyn Navigate>) {
        *self
            .inner
            .navigator
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(navigator);
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    pub fn notifier(&self) -> Notifier {
        self.inner.notifier
    }

    // =========================================================
    // 请求入口
    // =========================================================

    /// 发送一个类型化请求
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ApiResult<Reply<R::Response>> {
        let path = req.path();
        let url = self.inner.config.url(&path);

        let http = match req.encoding() {
            Encoding::Query => {
                let query = encode_query(req)?;
                let url = if query.is_empty() {
                    url
                } else {
                    format!("{}?{}", url, query)
                };
                HttpRequest::new(url, R::METHOD)
            }
            Encoding::Json => HttpRequest::new(url, R::METHOD)
                .with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
                .with_body(serde_json::to_string(req)?),
            Encoding::Empty => HttpRequest::new(url, R::METHOD),
        };

        let value = self.execute(http, &path).await?;
        self.decode(value, &path)
    }

    /// multipart 上传（头像、视频）
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> ApiResult<Reply<T>> {
        let http = HttpRequest::new(self.inner.config.url(path), HttpMethod::Post)
            .with_multipart(parts);
        let value = self.execute(http, path).await?;
        self.decode(value, path)
    }

    fn decode<T: DeserializeOwned>(&self, value: Value, path: &str) -> ApiResult<Reply<T>> {
        Reply::from_value(value).map_err(|e| {
            let err = ApiError::from(e).in_op_with("api.decode", path);
            log::error!("{}", err);
            self.inner.notifier.error(FALLBACK_ERROR);
            err
        })
    }

    /// 发送并处理传输层 / HTTP 层错误，返回响应 JSON
    async fn execute(&self, mut http: HttpRequest, path: &str) -> ApiResult<Value> {
        if let Some(token) = self.inner.tokens.get() {
            http = http.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        let method = http.method;
        log::debug!("[Api] {} {}", method.as_str(), path);

        let response = match self.inner.transport.send(http).await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.message().is_empty() {
                    FALLBACK_ERROR.to_string()
                } else {
                    e.message().to_string()
                };
                self.inner.notifier.error(message);
                return Err(e.in_op_with("api.send", path));
            }
        };

        let body = parse_body(&response.body);

        if response.status == 401 {
            self.handle_unauthorized();
            let message = error_message(body.as_ref().ok())
                .unwrap_or_else(|| "登录已过期，请重新登录".to_string());
            return Err(ApiError::unauthorized(message).in_op_with("api.send", path));
        }

        if !response.ok() {
            let message = error_message(body.as_ref().ok()).unwrap_or_else(|| {
                format!("Request failed with status code {}", response.status)
            });
            self.inner.notifier.error(message.clone());
            return Err(ApiError::http(response.status, message).in_op_with("api.send", path));
        }

        body.map_err(|e| {
            let err = e.in_op_with("api.decode", path);
            self.inner.notifier.error(FALLBACK_ERROR);
            err
        })
    }

    /// 401：清除令牌并带上当前路径跳转登录页
    fn handle_unauthorized(&self) {
        self.inner.tokens.remove();

        let navigator = self
            .inner
            .navigator
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let Some(navigator) = navigator else {
            log::warn!("[Api] 401 received before navigator was attached");
            return;
        };

        let current = navigator.current_path();
        if current == LOGIN_PATH {
            return;
        }
        let redirect: String = url::form_urlencoded::byte_serialize(current.as_bytes()).collect();
        log::info!("[Api] 401, redirecting to login from {}", current);
        navigator.navigate(&format!("{}?redirect={}", LOGIN_PATH, redirect));
    }
}

/// 业务失败升级为错误，成功时取出（可能为空的）数据
pub fn ensure_success<T>(reply: Reply<T>, fallback: &str) -> ApiResult<Option<T>> {
    if reply.is_success() {
        Ok(reply.into_data())
    } else {
        Err(ApiError::business(reply.message().unwrap_or(fallback).to_string()))
    }
}

// =========================================================
// 编码 / 解码工具
// =========================================================

/// 把请求字段编码为查询串，`null` 字段跳过
fn encode_query<T: Serialize + ?Sized>(req: &T) -> ApiResult<String> {
    let value = serde_json::to_value(req)?;
    let mut query = url::form_urlencoded::Serializer::new(String::new());

    match value {
        Value::Null => {}
        Value::Object(fields) => {
            for (key, field) in fields {
                match field {
                    Value::Null => {}
                    Value::String(s) => {
                        query.append_pair(&key, &s);
                    }
                    Value::Array(items) => {
                        for item in items {
                            query.append_pair(&key, &scalar_text(&item));
                        }
                    }
                    other => {
                        query.append_pair(&key, &scalar_text(&other));
                    }
                }
            }
        }
        other => {
            return Err(ApiError::validation(format!(
                "query parameters must be an object, got {}",
                other
            )));
        }
    }

    Ok(query.finish())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 空响应体视为 `null`
fn parse_body(body: &str) -> ApiResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(ApiError::from)
}

/// 从错误载荷中挑选最合适的提示：`detail` 优先，其次 `msg`
fn error_message(body: Option<&Value>) -> Option<String> {
    let body = body?;

    match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        // 校验错误：`detail: [{ msg, loc, ... }]`
        Some(Value::Array(items)) => {
            if let Some(msg) = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .find(|s| !s.is_empty())
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }

    body.get("msg")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
