//! 个人资料页与他人主页

use crate::use_services;
use crate::api::ensure_success;
use crate::components::feed::FeedPage;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use yun_shared::protocol::FeedKind;
use yun_shared::{UserId, UserProfile};

#[component]
fn ProfileCard(profile: UserProfile) -> impl IntoView {
    let services = use_services();
    let avatar = services.api.config().resolve_asset(profile.avatar_path());

    view! {
        <div class="flex items-center gap-4 p-4">
            <img class="w-16 h-16 rounded-full" src=avatar />
            <div>
                <h1 class="text-xl font-bold">{profile.username}</h1>
                <p class="opacity-70">{profile.signature.unwrap_or_default()}</p>
                <p class="text-sm">
                    {format!(
                        "关注 {} · 粉丝 {} · 作品 {}",
                        profile.following_count,
                        profile.follower_count,
                        profile.video_count,
                    )}
                </p>
            </div>
        </div>
    }
}

/// 当前用户（`/user`、`/user/profile`）
#[component]
pub fn MyProfilePage() -> impl IntoView {
    let services = use_services();
    let router = use_router();
    let session = services.session.clone();
    let state = session.state();

    {
        let session = session.clone();
        spawn_local(async move {
            if let Err(e) = session.fetch_profile(false).await {
                log::warn!("[Profile] {}", e);
            }
        });
    }

    let on_logout = move |_: leptos::ev::MouseEvent| session.logout(Some(&router));

    view! {
        {move || state.with(|s| s.user.clone()).map(|profile| view! { <ProfileCard profile=profile /> })}
        <button class="btn btn-sm m-4" on:click=on_logout>"退出登录"</button>
        <FeedPage kind=FeedKind::Mine />
    }
}

/// 他人主页（`/user/:id`）
#[component]
pub fn UserPage(user_id: UserId) -> impl IntoView {
    let services = use_services();
    let profile = RwSignal::new(Option::<UserProfile>::None);

    {
        let api = services.api.clone();
        spawn_local(async move {
            let result = api
                .user_profile(user_id)
                .await
                .and_then(|reply| ensure_success(reply, "获取用户资料失败"));
            match result {
                Ok(data) => profile.set(data),
                Err(e) => log::warn!("[Profile] {}", e.in_op_with("profile.other", user_id.to_string())),
            }
        });
    }

    view! {
        {move || profile.get().map(|profile| view! { <ProfileCard profile=profile /> })}
        <FeedPage kind=FeedKind::User(user_id) />
    }
}
