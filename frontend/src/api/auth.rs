//! 认证接口

use super::ApiClient;
use crate::error::ApiResult;
use serde_json::Value;
use yun_shared::Reply;
use yun_shared::protocol::{
    CaptchaImage, CaptchaRequest, LoginRequest, LoginResponse, RegisterRequest,
    SendEmailCodeRequest,
};

impl ApiClient {
    /// 图形验证码（非信封响应，原样透传）
    pub async fn captcha(&self) -> ApiResult<Reply<CaptchaImage>> {
        self.call(&CaptchaRequest).await
    }

    pub async fn login(&self, form: &LoginRequest) -> ApiResult<Reply<LoginResponse>> {
        self.call(form).await
    }

    pub async fn register(&self, form: &RegisterRequest) -> ApiResult<Reply<Value>> {
        self.call(form).await
    }

    /// 发送注册邮箱验证码
    pub async fn send_email_code(&self, email: &str) -> ApiResult<Reply<Value>> {
        self.call(&SendEmailCodeRequest::register(email)).await
    }
}
