//! 导航守卫
//!
//! 纯函数，不触碰 DOM，由 `RouterService` 在 push / replace / popstate 时按顺序调用：
//! 1. `before_each`: 认证检查
//! 2. 元信息（见 `meta`）
//! 3. `token_needs_logout`: 导航完成后的令牌过期检查

use super::route::AppRoute;
use crate::auth::token_expired;
use yun_shared::Timestamp;

/// 前置守卫的结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// 改道；`pending` 为登录成功后应回到的路径
    Redirect {
        to: AppRoute,
        pending: Option<String>,
    },
}

/// 认证守卫
///
/// # 参数
/// - `target`: 目标路由
/// - `target_path`: 原始目标路径（含查询串），被拦截时记为待回跳目标
/// - `has_token`: 是否持有未过期的令牌
pub fn before_each(target: AppRoute, target_path: &str, has_token: bool) -> GuardDecision {
    if target.requires_auth() && !has_token {
        return GuardDecision::Redirect {
            to: AppRoute::auth_failure_redirect(),
            pending: Some(target_path.to_string()),
        };
    }
    if target.should_redirect_when_authenticated() && has_token {
        return GuardDecision::Redirect {
            to: AppRoute::auth_success_redirect(),
            pending: None,
        };
    }
    GuardDecision::Allow
}

/// 进入个人资料页前预取资料
pub fn wants_profile_preload(target: AppRoute) -> bool {
    target == AppRoute::UserProfile
}

/// 后置守卫：持有的令牌已过期（或无法解析）时需要登出
pub fn token_needs_logout(token: Option<&str>, now: Timestamp) -> bool {
    token.is_some_and(|t| token_expired(t, now))
}

/// 从登录页查询串中取出 `redirect`，只接受站内路径
pub fn redirect_from_query(query: &str) -> Option<String> {
    let query = query.trim_start_matches('?');
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "redirect")
        .map(|(_, value)| value.into_owned())
        .filter(|path| is_internal(path))
}

fn is_internal(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}
