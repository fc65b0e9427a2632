//! 视频列表页（精选 / 刷视频 / 个人作品）

use crate::use_services;
use crate::stores::feed::FeedStore;
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;
use yun_shared::protocol::FeedKind;

#[component]
pub fn FeedPage(kind: FeedKind) -> impl IntoView {
    let services = use_services();
    let store = FeedStore::new(kind, services.api.clone());
    let subscriptions = store.follow_interactions(&services.events);

    let events = services.events.clone();
    on_cleanup(move || {
        for id in subscriptions {
            events.unsubscribe(id);
        }
    });

    {
        let store = store.clone();
        spawn_local(async move {
            store.load(true).await;
        });
    }

    let config = services.api.config().clone();
    let state = store.state();
    let load_more = move |_: leptos::ev::MouseEvent| {
        let store = store.clone();
        spawn_local(async move {
            store.load_more().await;
        });
    };

    view! {
        <div class="grid grid-cols-2 md:grid-cols-4 gap-4 p-4">
            <For
                each=move || state.get().items
                key=|video| video.id
                children=move |video| {
                    let cover = config.resolve_asset(video.cover_path());
                    view! {
                        <Link to=format!("/video/{}", video.id)>
                            <div class="card bg-base-100 shadow">
                                <figure><img src=cover /></figure>
                                <div class="card-body p-2">
                                    <h2 class="card-title text-sm">{video.title.clone()}</h2>
                                    <span class="text-xs">{format!("♥ {}", video.like_count)}</span>
                                </div>
                            </div>
                        </Link>
                    }
                }
            />
        </div>
        <Show when=move || state.with(|s| s.has_more())>
            <button
                class="btn btn-ghost w-full"
                disabled=move || state.with(|s| s.loading)
                on:click=load_more.clone()
            >
                "加载更多"
            </button>
        </Show>
    }
}
