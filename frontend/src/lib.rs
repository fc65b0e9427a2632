//! YUN 短视频社区前端
//!
//! 采用 Context-Driven 的架构：
//! - `api`: 类型化 HTTP 客户端（令牌注入、信封识别、401 处理）
//! - `stores`: 会话、评论、视频互动、视频列表
//! - `web`: 浏览器 API 封装、路由定义与守卫
//! - `components`: UI 组件层

pub mod api;
pub mod auth;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod notify;
pub mod stores;
pub mod web;

#[cfg(test)]
mod test_support;

use crate::api::ApiClient;
use crate::auth::TokenStore;
use crate::components::feed::FeedPage;
use crate::components::login::LoginPage;
use crate::components::notice::NoticeBar;
use crate::components::profile::{MyProfilePage, UserPage};
use crate::components::register::RegisterPage;
use crate::components::video::VideoPage;
use crate::config::AppConfig;
use crate::events::EventBus;
use crate::notify::Notifier;
use crate::stores::session::SessionStore;
use crate::stores::video::InteractionLedger;
use crate::web::confirm::{BrowserConfirm, Confirm};
use crate::web::http::FetchTransport;
use crate::web::route::AppRoute;
use crate::web::router::{RouterHooks, RouterOutlet, provide_router};

use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::Arc;
use yun_shared::protocol::FeedKind;

/// 应用级服务，由根组件创建并放入 Context
#[derive(Clone)]
pub struct AppServices {
    pub api: ApiClient,
    pub session: SessionStore,
    pub ledger: InteractionLedger,
    pub events: EventBus,
    pub confirm: Arc<dyn Confirm>,
}

/// 从 Context 获取应用级服务
pub fn use_services() -> AppServices {
    use_context::<AppServices>().expect("AppServices should be provided")
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Featured => view! { <FeedPage kind=FeedKind::Recommend /> }.into_any(),
        AppRoute::Swipe => view! { <FeedPage kind=FeedKind::Hot /> }.into_any(),
        AppRoute::UserCenter | AppRoute::UserProfile => view! { <MyProfilePage /> }.into_any(),
        AppRoute::UserOther(id) => view! { <UserPage user_id=id /> }.into_any(),
        AppRoute::VideoDetail(id) => view! { <VideoPage video_id=id /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 基础设施
    let config = AppConfig::from_env();
    let tokens = TokenStore::browser(config.token_key.clone());
    let notifier = Notifier::new();
    let events = EventBus::new();
    let api = ApiClient::new(
        config.clone(),
        Arc::new(FetchTransport),
        tokens.clone(),
        notifier,
    );

    // 2. 会话（从浏览器存储恢复令牌）
    let session = SessionStore::new(api.clone(), events.clone());
    if session.is_authenticated() {
        session.subscribe_follow_events();
    }

    provide_context(notifier);
    provide_context(AppServices {
        api: api.clone(),
        session: session.clone(),
        ledger: InteractionLedger::new(),
        events,
        confirm: Arc::new(BrowserConfirm),
    });

    // 3. 路由：注入认证信号与守卫回调
    let hooks = RouterHooks {
        tokens,
        config,
        on_expired: Box::new({
            let session = session.clone();
            move || session.logout(None)
        }),
        on_profile_enter: Box::new({
            let session = session.clone();
            move || {
                let session = session.clone();
                spawn_local(async move {
                    if let Err(e) = session.fetch_profile(false).await {
                        log::warn!("[App] profile preload failed: {}", e);
                    }
                });
            }
        }),
    };
    let router = provide_router(session.is_authenticated_signal(), hooks);
    api.set_navigator(Arc::new(router));

    view! {
        <NoticeBar />
        <RouterOutlet matcher=route_matcher />
    }
}
