//! 视频详情页：播放、点赞 / 收藏 / 关注、评论区

use crate::use_services;
use crate::stores::comments::CommentsStore;
use crate::stores::comments::tree::CommentNode;
use crate::stores::open_video_page;
use crate::stores::video::VideoDetailStore;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use yun_shared::{CommentId, CommentOrder, VideoId};

#[component]
pub fn VideoPage(video_id: VideoId) -> impl IntoView {
    let services = use_services();
    let router = use_router();

    let detail = VideoDetailStore::new(
        video_id,
        services.api.clone(),
        services.session.clone(),
        services.ledger,
        services.events.clone(),
        services.confirm.clone(),
    );
    let comments = CommentsStore::new(video_id, services.api.clone(), services.confirm.clone());

    {
        let detail = detail.clone();
        let comments = comments.clone();
        spawn_local(async move {
            let (loaded, _) = open_video_page(&detail, &comments).await;
            match loaded {
                Ok(()) => {
                    if let Err(e) = detail.record_view(None).await {
                        log::warn!("[Video] view not recorded: {}", e);
                    }
                }
                Err(e) => log::error!("[Video] {}", e),
            }
        });
    }

    let state = detail.state();
    let on_like = spawn_on_click(&detail, |s| async move {
        s.like().await;
    });
    let on_favorite = spawn_on_click(&detail, |s| async move {
        s.favorite().await;
    });
    let on_follow = spawn_on_click(&detail, |s| async move {
        s.follow().await;
    });
    let on_author = {
        let detail = detail.clone();
        move |_: leptos::ev::MouseEvent| {
            if let Some(path) = detail.author_profile_path() {
                router.navigate(&path);
            }
        }
    };

    let source = {
        let detail = detail.clone();
        move || detail.source_url()
    };
    let poster = {
        let detail = detail.clone();
        move || detail.preview_url()
    };
    let author_name = {
        let detail = detail.clone();
        move || detail.author().map(|a| a.username).unwrap_or_default()
    };
    let is_self = {
        let detail = detail.clone();
        move || detail.is_self()
    };

    view! {
        <div class="max-w-4xl mx-auto p-4 flex flex-col gap-4">
            <Show when=move || state.with(|s| s.loading)>
                <span class="loading loading-spinner loading-lg"></span>
            </Show>
            <video class="w-full rounded" controls src=source poster=poster></video>
            <h1 class="text-xl font-bold">
                {move || state.with(|s| s.video.as_ref().map(|v| v.title.clone()).unwrap_or_default())}
            </h1>
            <div class="flex items-center gap-2">
                <button class="link" on:click=on_author>{author_name}</button>
                <Show when=move || !is_self()>
                    <button class="btn btn-sm" on:click=on_follow.clone()>
                        {move || {
                            let i = state.with(|s| s.interaction);
                            if i.is_mutual {
                                "互相关注"
                            } else if i.is_followed {
                                "已关注"
                            } else {
                                "关注"
                            }
                        }}
                    </button>
                </Show>
            </div>
            <div class="flex gap-2">
                <button class="btn btn-sm" on:click=on_like>
                    {move || {
                        let liked = state.with(|s| s.interaction.is_liked);
                        let count = state.with(|s| s.video.as_ref().map_or(0, |v| v.like_count));
                        format!("{} {}", if liked { "♥" } else { "♡" }, count)
                    }}
                </button>
                <button class="btn btn-sm" on:click=on_favorite>
                    {move || {
                        let favorited = state.with(|s| s.interaction.is_favorited);
                        let count = state.with(|s| s.video.as_ref().map_or(0, |v| v.collect_count));
                        format!("{} {}", if favorited { "★" } else { "☆" }, count)
                    }}
                </button>
            </div>
            <CommentSection store=comments />
        </div>
    }
}

/// 点击后在后台执行一次 store 操作
fn spawn_on_click<F, Fut>(
    store: &VideoDetailStore,
    run: F,
) -> impl Fn(leptos::ev::MouseEvent) + Clone + Send + Sync + 'static + use<F, Fut>
where
    F: Fn(VideoDetailStore) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let store = store.clone();
    move |_| spawn_local(run(store.clone()))
}

#[component]
fn CommentSection(store: CommentsStore) -> impl IntoView {
    let (draft, set_draft) = signal(String::new());
    let (reply_to, set_reply_to) = signal(Option::<CommentId>::None);
    let thread = store.thread();

    let submit = {
        let store = store.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let store = store.clone();
            spawn_local(async move {
                if store.submit(&draft.get_untracked(), reply_to.get_untracked()).await {
                    set_draft.set(String::new());
                    set_reply_to.set(None);
                }
            });
        }
    };
    let order = {
        let store = store.clone();
        move |order: CommentOrder| {
            let store = store.clone();
            move |_: leptos::ev::MouseEvent| {
                let store = store.clone();
                spawn_local(async move {
                    store.change_order(order).await;
                });
            }
        }
    };
    let load_more = {
        let store = store.clone();
        move |_: leptos::ev::MouseEvent| {
            let store = store.clone();
            spawn_local(async move {
                store.load_more().await;
            });
        }
    };

    view! {
        <section class="flex flex-col gap-2">
            <div class="flex items-center gap-2">
                <h2 class="font-bold">{move || format!("评论 ({})", thread.with(|t| t.total))}</h2>
                <button class="btn btn-xs" on:click=order(CommentOrder::Latest)>"最新"</button>
                <button class="btn btn-xs" on:click=order(CommentOrder::Hottest)>"最热"</button>
            </div>
            <form class="flex gap-2" on:submit=submit>
                <input
                    class="input input-bordered flex-1"
                    placeholder=move || if reply_to.get().is_some() { "回复..." } else { "说点什么..." }
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    prop:value=draft
                />
                <button class="btn btn-primary">"发送"</button>
            </form>
            {
                let store = store.clone();
                move || {
                    thread
                        .get()
                        .items
                        .into_iter()
                        .map(|node| comment_view(node, store.clone(), set_reply_to))
                        .collect_view()
                }
            }
            <Show when=move || thread.with(|t| t.has_more())>
                <button class="btn btn-ghost btn-sm" on:click=load_more.clone()>"更多评论"</button>
            </Show>
        </section>
    }
}

/// 递归渲染评论及其回复
fn comment_view(
    node: CommentNode,
    store: CommentsStore,
    set_reply_to: WriteSignal<Option<CommentId>>,
) -> AnyView {
    let id = node.id;
    let react = |like: bool| {
        let store = store.clone();
        move |_: leptos::ev::MouseEvent| {
            let store = store.clone();
            spawn_local(async move {
                if like {
                    store.like(id).await;
                } else {
                    store.dislike(id).await;
                }
            });
        }
    };
    let on_delete = {
        let store = store.clone();
        move |_: leptos::ev::MouseEvent| {
            let store = store.clone();
            spawn_local(async move {
                store.delete(id).await;
            });
        }
    };
    let children = node
        .replies
        .into_iter()
        .chain(node.children)
        .map(|child| comment_view(child, store.clone(), set_reply_to))
        .collect_view();

    view! {
        <div class="border-l pl-3 flex flex-col gap-1">
            <div class="flex items-center gap-2 text-sm">
                <img class="w-6 h-6 rounded-full" src=node.avatar />
                <span class="font-semibold">{node.username}</span>
                <span class="opacity-60">{node.time}</span>
            </div>
            <p>{node.content}</p>
            <div class="flex gap-2 text-xs">
                <button on:click=react(true)>{format!("👍 {}", node.like_count)}</button>
                <button on:click=react(false)>{format!("👎 {}", node.dislike_count)}</button>
                <button on:click=move |_| set_reply_to.set(Some(id))>"回复"</button>
                <button on:click=on_delete>"删除"</button>
            </div>
            {children}
        </div>
    }
    .into_any()
}
