//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其属性（认证要求、页面元信息）。

use std::fmt::Display;
use yun_shared::{UserId, VideoId};

/// 页面元信息，缺省字段由应用配置补齐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub description: Option<&'static str>,
    pub keywords: Option<&'static str>,
}

impl RouteMeta {
    const fn titled(title: &'static str) -> Self {
        Self {
            title: Some(title),
            description: None,
            keywords: None,
        }
    }
}

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    Login,
    Register,
    /// 首页（精选）
    #[default]
    Featured,
    /// 刷视频
    Swipe,
    UserCenter,
    /// 当前用户的个人资料
    UserProfile,
    /// 他人主页
    UserOther(UserId),
    VideoDetail(VideoId),
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举（查询串与结尾斜杠忽略）
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Self::Featured,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["shuashipin"] => Self::Swipe,
            ["user"] => Self::UserCenter,
            ["user", "profile"] => Self::UserProfile,
            ["user", id] => id
                .parse()
                .map(|id| Self::UserOther(UserId(id)))
                .unwrap_or(Self::NotFound),
            ["video", id] => id
                .parse()
                .map(|id| Self::VideoDetail(VideoId(id)))
                .unwrap_or(Self::NotFound),
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Featured => "/".into(),
            Self::Swipe => "/shuashipin".into(),
            Self::UserCenter => "/user".into(),
            Self::UserProfile => "/user/profile".into(),
            Self::UserOther(id) => format!("/user/{}", id),
            Self::VideoDetail(id) => format!("/video/{}", id),
            Self::NotFound => "/404".into(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Register | Self::NotFound)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 是否显示顶部导航栏
    pub fn shows_nav_bar(&self) -> bool {
        !matches!(self, Self::Login | Self::Register | Self::NotFound)
    }

    pub fn meta(&self) -> RouteMeta {
        match self {
            Self::Featured => RouteMeta::titled("精选"),
            Self::Swipe => RouteMeta::titled("刷视频"),
            Self::UserProfile => RouteMeta {
                title: Some("个人资料 - YUN 社交媒体平台"),
                description: Some("查看并编辑您的个人资料，包括用户名、签名和头像。"),
                keywords: Some("YUN, 个人资料, 用户中心, 社交平台, 账号设置"),
            },
            _ => RouteMeta::default(),
        }
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Featured
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
