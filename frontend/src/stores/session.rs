//! 会话 store
//!
//! 持有当前用户、令牌和资料拉取时间。资料在缓存窗口内直接复用，
//! 登录后订阅关注事件，登出时取消订阅。

use crate::api::{ApiClient, UploadFile, ensure_success};
use crate::error::{ApiError, ApiResult};
use crate::events::{AppEvent, EventBus, EventKind, SubscriptionId};
use crate::web::navigate::Navigate;
use leptos::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use yun_shared::protocol::{CaptchaImage, LoginRequest, RegisterRequest};
use yun_shared::{ProfilePatch, Timestamp, UserId, UserProfile};

const LOGIN_PATH: &str = "/login";

/// 会话状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub token: String,
    /// 最近一次成功拉取资料的时间
    pub last_fetch: Option<Timestamp>,
}

/// 会话 store
#[derive(Clone)]
pub struct SessionStore {
    state: RwSignal<SessionState>,
    follow_subscription: Arc<Mutex<Option<SubscriptionId>>>,
    api: ApiClient,
    events: EventBus,
}

impl SessionStore {
    /// 创建 store，令牌从存储中恢复
    pub fn new(api: ApiClient, events: EventBus) -> Self {
        let token = api.tokens().get().unwrap_or_default();
        Self {
            state: RwSignal::new(SessionState {
                token,
                ..Default::default()
            }),
            follow_subscription: Arc::new(Mutex::new(None)),
            api,
            events,
        }
    }

    // --- 读取 ---

    pub fn state(&self) -> RwSignal<SessionState> {
        self.state
    }

    /// 认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| !s.token.is_empty()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with_untracked(|s| !s.token.is_empty())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.with(|s| s.user.clone())
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.with_untracked(|s| s.user.as_ref().map(|u| u.id))
    }

    // =========================================================
    // 登录 / 注册
    // =========================================================

    /// 登录：保存令牌、强制拉取资料并订阅关注事件
    pub async fn login(&self, form: LoginRequest) -> ApiResult<UserProfile> {
        let remember = form.remember.unwrap_or(false);
        let reply = self
            .api
            .login(&form)
            .await
            .map_err(|e| e.in_op("session.login"))?;
        let data = ensure_success(reply, "登录失败")?
            .ok_or_else(|| ApiError::decode("登录响应缺少令牌").in_op("session.login"))?;

        let ttl = data
            .expires_in
            .unwrap_or(self.api.config().token_ttl_secs);
        self.set_token(&data.access_token, Duration::from_secs(ttl), remember);

        let user = self.fetch_profile(true).await?;
        self.subscribe_follow_events();
        log::info!("[Session] {} logged in", user.username);
        Ok(user)
    }

    pub fn set_token(&self, token: &str, ttl: Duration, remember: bool) {
        self.api.tokens().set(token, ttl, remember);
        self.state.update(|s| s.token = token.to_string());
    }

    pub async fn register(&self, form: &RegisterRequest) -> ApiResult<()> {
        let reply = self.api.register(form).await?;
        ensure_success(reply, "注册失败").map(|_| ())
    }

    pub async fn captcha(&self) -> ApiResult<CaptchaImage> {
        let reply = self.api.captcha().await?;
        ensure_success(reply, "获取验证码失败")?
            .ok_or_else(|| ApiError::decode("验证码响应为空"))
    }

    pub async fn send_email_code(&self, email: &str) -> ApiResult<()> {
        if email.trim().is_empty() {
            return Err(ApiError::validation("请输入邮箱"));
        }
        let reply = self.api.send_email_code(email).await?;
        ensure_success(reply, "发送验证码失败").map(|_| ())
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ApiResult<()> {
        let reply = self.api.change_password(old_password, new_password).await?;
        ensure_success(reply, "修改密码失败").map(|_| ())
    }

    // =========================================================
    // 资料
    // =========================================================

    /// 拉取当前用户资料
    ///
    /// 非强制刷新且距上次拉取不足缓存窗口时直接返回缓存；401 时登出。
    pub async fn fetch_profile(&self, force: bool) -> ApiResult<UserProfile> {
        if !force {
            if let Some(user) = self.cached_user(Timestamp::now()) {
                log::debug!("[Session] using cached profile");
                return Ok(user);
            }
        }

        log::debug!("[Session] fetching profile from server");
        let result = match self.api.profile().await {
            Ok(reply) => ensure_success(reply, "获取用户资料失败").and_then(|data| {
                data.ok_or_else(|| ApiError::business("获取用户资料失败"))
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                self.state.update(|s| {
                    s.user = Some(user.clone());
                    s.last_fetch = Some(Timestamp::now());
                });
                Ok(user)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.logout(None);
                }
                Err(e.in_op("session.fetch_profile"))
            }
        }
    }

    fn cached_user(&self, now: Timestamp) -> Option<UserProfile> {
        let window = self.api.config().profile_cache_window;
        self.state.with_untracked(|s| {
            let fetched = s.last_fetch?;
            if now.since(fetched) < window {
                s.user.clone()
            } else {
                None
            }
        })
    }

    /// 更新资料并替换缓存中的用户
    pub async fn update_profile(&self, patch: ProfilePatch) -> ApiResult<UserProfile> {
        let reply = self
            .api
            .update_profile(patch.clone())
            .await
            .map_err(|e| e.in_op("session.update_profile"))?;
        let returned = ensure_success(reply, "更新资料失败")?;

        self.state.update(|s| match returned {
            Some(user) => {
                s.user = Some(user);
                s.last_fetch = Some(Timestamp::now());
            }
            None => {
                if let Some(user) = s.user.as_mut() {
                    apply_patch(user, patch);
                }
            }
        });

        let user = self
            .state
            .with_untracked(|s| s.user.clone())
            .unwrap_or_default();
        self.events.emit(&AppEvent::ProfileUpdated(user.clone()));
        Ok(user)
    }

    /// 上传头像，返回新的头像地址
    pub async fn upload_avatar(&self, file: UploadFile) -> ApiResult<String> {
        let reply = self
            .api
            .upload_avatar(file)
            .await
            .map_err(|e| e.in_op("session.upload_avatar"))?;
        let uploaded = ensure_success(reply, "上传头像失败")?
            .ok_or_else(|| ApiError::decode("上传响应缺少头像地址"))?;

        let url = uploaded.avatar_url;
        self.state.update(|s| {
            if let Some(user) = s.user.as_mut() {
                user.avatar = Some(url.clone());
                user.profile_picture = Some(url.clone());
            }
        });
        if let Some(user) = self.state.with_untracked(|s| s.user.clone()) {
            self.events.emit(&AppEvent::ProfileUpdated(user));
        }
        Ok(url)
    }

    /// 关注操作后直接更新统计，不重新拉取资料
    pub fn update_follow_stats(&self, following_count: u64, follower_count: u64) {
        self.state.update(|s| {
            if let Some(user) = s.user.as_mut() {
                user.following_count = following_count;
                user.follower_count = follower_count;
            }
        });
    }

    pub fn clear_profile_cache(&self) {
        self.state.update(|s| s.last_fetch = None);
    }

    // =========================================================
    // 事件订阅
    // =========================================================

    /// 订阅关注事件（重复调用只保留一个订阅）
    pub fn subscribe_follow_events(&self) {
        let mut slot = self
            .follow_subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return;
        }

        let state = self.state;
        let id = self.events.subscribe(EventKind::FollowUpdated, move |event| {
            if let AppEvent::FollowUpdated(update) = event {
                state.update(|s| {
                    handle_follow_event(s, update.target_user_id, update.target_follower_count)
                });
            }
        });
        *slot = Some(id);
    }

    fn unsubscribe_follow_events(&self) {
        let taken = self
            .follow_subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(id) = taken {
            self.events.unsubscribe(id);
        }
    }

    // =========================================================
    // 登出
    // =========================================================

    /// 清除会话与令牌，取消事件订阅，可选跳转登录页
    pub fn logout(&self, navigator: Option<&dyn Navigate>) {
        self.state.set(SessionState::default());
        self.api.tokens().remove();
        self.unsubscribe_follow_events();
        log::info!("[Session] logged out");

        if let Some(navigator) = navigator {
            navigator.navigate(LOGIN_PATH);
        }
    }
}

/// 其他用户关注 / 取关了当前用户时更新粉丝数
fn handle_follow_event(state: &mut SessionState, target: UserId, target_follower_count: u64) {
    if let Some(user) = state.user.as_mut() {
        if user.id == target {
            user.follower_count = target_follower_count;
        }
    }
}

fn apply_patch(user: &mut UserProfile, patch: ProfilePatch) {
    if let Some(username) = patch.username {
        user.username = username;
    }
    if let Some(email) = patch.email {
        user.email = Some(email);
    }
    if let Some(signature) = patch.signature {
        user.signature = Some(signature);
    }
}
