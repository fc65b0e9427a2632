//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 导航流程："请求 -> 前置守卫 -> 元信息 -> 加载 -> 后置守卫"，
//! 守卫本身是 `guards` 中的纯函数。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::guards::{self, GuardDecision};
use super::meta::{PageMeta, apply_meta};
use super::navigate::Navigate;
use super::route::AppRoute;
use crate::auth::TokenStore;
use crate::config::AppConfig;
use yun_shared::Timestamp;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 当前查询串（含 `?`）
fn current_search() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
}

/// 写入 History 状态（内部工具函数）
fn write_history(path: &str, mode: HistoryMode) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let result = match mode {
        HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(path)),
    };
    if let Err(e) = result {
        log::warn!("[Router] history update failed for {}: {:?}", path, e);
    }
}

/// 路由服务的外部依赖
pub struct RouterHooks {
    pub tokens: TokenStore,
    pub config: AppConfig,
    /// 导航后发现令牌过期时调用（清理会话状态）
    pub on_expired: Box<dyn Fn() + Send + Sync>,
    /// 进入个人资料页时调用（预取资料）
    pub on_profile_enter: Box<dyn Fn() + Send + Sync>,
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 认证状态以信号注入，令牌与回调通过 `RouterHooks` 注入。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证状态（注入的信号）
    is_authenticated: Signal<bool>,
    /// 被拦截的目标路径，登录成功后回跳
    pending_redirect: RwSignal<Option<String>>,
    hooks: StoredValue<RouterHooks>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>, hooks: RouterHooks) -> Self {
        let (current_route, set_route) = signal(AppRoute::from_path(&current_path()));

        Self {
            current_route,
            set_route,
            is_authenticated,
            pending_redirect: RwSignal::new(None),
            hooks: StoredValue::new(hooks),
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str) {
        self.navigate_to(path, HistoryMode::Push);
    }

    /// 登录成功后的去向：被拦截的目标，其次 `?redirect=`，最后首页
    pub fn take_login_redirect(&self) -> String {
        self.pending_redirect
            .try_update(Option::take)
            .flatten()
            .or_else(|| guards::redirect_from_query(&current_search()))
            .filter(|path| !AppRoute::from_path(path).should_redirect_when_authenticated())
            .unwrap_or_else(|| AppRoute::auth_success_redirect().to_path())
    }

    fn has_token(&self) -> bool {
        self.hooks.with_value(|h| h.tokens.has_token())
    }

    fn navigate_to(&self, path: &str, mode: HistoryMode) {
        let target = AppRoute::from_path(path);

        // --- Step 1: 前置守卫 ---
        match guards::before_each(target, path, self.has_token()) {
            GuardDecision::Allow => self.commit(target, path, mode),
            GuardDecision::Redirect { to, pending } => {
                log::info!("[Router] {} rejected, redirecting to {}", path, to);
                if pending.is_some() {
                    self.pending_redirect.set(pending);
                }
                let redirect = if to == AppRoute::auth_success_redirect() {
                    self.take_login_redirect()
                } else {
                    to.to_path()
                };
                self.commit(AppRoute::from_path(&redirect), &redirect, mode);
            }
        }
    }

    fn commit(&self, route: AppRoute, path: &str, mode: HistoryMode) {
        // --- Step 2: 元信息 ---
        self.hooks.with_value(|h| {
            apply_meta(&PageMeta::resolve(route.meta(), &h.config));
            if guards::wants_profile_preload(route) {
                (h.on_profile_enter)();
            }
        });

        // --- Step 3: 加载页面 ---
        write_history(path, mode);
        self.set_route.set(route);

        // --- Step 4: 后置守卫 ---
        self.check_token_expiry();
    }

    fn check_token_expiry(&self) {
        let expired = self.hooks.with_value(|h| {
            guards::token_needs_logout(h.tokens.get().as_deref(), Timestamp::now())
        });
        if !expired {
            return;
        }
        log::warn!("[Router] token expired, logging out");
        self.hooks.with_value(|h| {
            h.tokens.remove();
            (h.on_expired)();
        });
        self.navigate_to(&AppRoute::auth_failure_redirect().to_path(), HistoryMode::Push);
    }

    /// 初始化浏览器后退/前进按钮监听（执行同一套守卫）
    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let path = format!("{}{}", current_path(), current_search());
            router.navigate_to(&path, HistoryMode::Replace);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            let route = router.current_route.get_untracked();

            if is_auth && route.should_redirect_when_authenticated() {
                // 刚登录：回到被拦截的页面
                let target = router.take_login_redirect();
                log::info!("[Router] logged in, redirecting to {}", target);
                router.navigate_to(&target, HistoryMode::Push);
            } else if !is_auth && route.requires_auth() {
                log::info!("[Router] logged out, redirecting to login");
                router.navigate_to(&AppRoute::auth_failure_redirect().to_path(), HistoryMode::Push);
            }
        });
    }

    /// 首次进入时对当前地址执行一次守卫
    fn guard_initial(&self) {
        let path = format!("{}{}", current_path(), current_search());
        self.navigate_to(&path, HistoryMode::Replace);
    }
}

impl Navigate for RouterService {
    fn navigate(&self, path: &str) {
        RouterService::navigate(self, path);
    }

    fn current_path(&self) -> String {
        current_path()
    }
}

/// 创建路由服务、注册监听器并放入 Context
pub fn provide_router(is_authenticated: Signal<bool>, hooks: RouterHooks) -> RouterService {
    let router = RouterService::new(is_authenticated, hooks);

    router.init_popstate_listener();
    router.setup_auth_redirect();
    router.guard_initial();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure provide_router was called.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to on:click=on_click>
            {children()}
        </a>
    }
}
