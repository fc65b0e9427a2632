//! 视频列表 store（推荐 / 热门 / 最新 / 我的 / 点赞 / 收藏 / 他人作品 / 观看历史）

use crate::api::{ApiClient, ensure_success};
use crate::events::{AppEvent, EventBus, EventKind, SubscriptionId};
use crate::notify::Notifier;
use leptos::prelude::*;
use yun_shared::protocol::{FeedKind, PageQuery};
use yun_shared::{Video, VideoId};

const MSG_LOAD_FAILED: &str = "加载视频失败";

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub kind: FeedKind,
    pub items: Vec<Video>,
    /// 最近一次成功加载的页码（0 表示尚未加载）
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub loading: bool,
}

impl FeedState {
    fn new(kind: FeedKind, size: u32) -> Self {
        Self {
            kind,
            items: Vec::new(),
            page: 0,
            size,
            total: 0,
            loading: false,
        }
    }

    pub fn has_more(&self) -> bool {
        self.page == 0 || (self.items.len() as u64) < self.total
    }

    fn find_mut(&mut self, id: VideoId) -> Option<&mut Video> {
        self.items.iter_mut().find(|v| v.id == id)
    }

    /// 把其他视图的互动结果同步到列表项
    fn apply_event(&mut self, event: &AppEvent) {
        match *event {
            AppEvent::VideoLiked {
                video_id,
                liked,
                like_count,
            } => {
                if let Some(video) = self.find_mut(video_id) {
                    video.is_liked = liked;
                    video.like_count = like_count;
                }
            }
            AppEvent::VideoCollected {
                video_id,
                collected,
                collect_count,
            } => {
                if let Some(video) = self.find_mut(video_id) {
                    video.is_collected = collected;
                    video.collect_count = collect_count;
                }
            }
            _ => {}
        }
    }
}

/// 视频列表 store
#[derive(Clone)]
pub struct FeedStore {
    state: RwSignal<FeedState>,
    api: ApiClient,
    notifier: Notifier,
}

impl FeedStore {
    pub fn new(kind: FeedKind, api: ApiClient) -> Self {
        let size = api.config().feed_page_size;
        Self {
            state: RwSignal::new(FeedState::new(kind, size)),
            notifier: api.notifier(),
            api,
        }
    }

    pub fn state(&self) -> RwSignal<FeedState> {
        self.state
    }

    pub fn items(&self) -> Vec<Video> {
        self.state.with(|s| s.items.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn has_more(&self) -> bool {
        self.state.with(FeedState::has_more)
    }

    /// 加载一页；`reset` 时从第 1 页重新开始
    pub async fn load(&self, reset: bool) -> bool {
        if self.state.with_untracked(|s| s.loading) {
            return false;
        }
        let (kind, page, size) = self.state.with_untracked(|s| {
            (s.kind, if reset { 1 } else { s.page + 1 }, s.size)
        });
        self.state.update(|s| s.loading = true);

        let result = self
            .api
            .feed(kind, PageQuery::new(page, size))
            .await
            .and_then(|reply| ensure_success(reply, MSG_LOAD_FAILED))
            .map(Option::unwrap_or_default);

        match result {
            Ok(data) => {
                self.state.update(|s| {
                    if reset {
                        s.items = data.items;
                    } else {
                        s.items.extend(data.items);
                    }
                    s.total = data.total;
                    s.page = page;
                    s.loading = false;
                });
                true
            }
            Err(e) => {
                log::error!("{}", e.in_op_with("feed.load", format!("{:?}", kind)));
                self.notifier.error(MSG_LOAD_FAILED);
                self.state.update(|s| s.loading = false);
                false
            }
        }
    }

    pub async fn load_more(&self) -> bool {
        if !self.state.with_untracked(|s| s.has_more() && !s.loading) {
            return false;
        }
        self.load(false).await
    }

    /// 订阅点赞 / 收藏事件，保持列表计数一致
    pub fn follow_interactions(&self, events: &EventBus) -> [SubscriptionId; 2] {
        let subscribe = |kind| {
            let state = self.state;
            events.subscribe(kind, move |event| {
                state.update(|s| s.apply_event(event));
            })
        };
        [
            subscribe(EventKind::VideoLiked),
            subscribe(EventKind::VideoCollected),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLevel;
    use crate::test_support::Harness;
    use serde_json::{Value, json};
    use yun_shared::UserId;
    use yun_shared::protocol::HttpMethod;

    fn page(ids: &[u64], total: u64) -> Value {
        let items: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        json!({ "items": items, "total": total })
    }

    fn ids(store: &FeedStore) -> Vec<u64> {
        store.items().iter().map(|v| v.id.get()).collect()
    }

    #[tokio::test]
    async fn pages_append_until_total() {
        let h = Harness::new();
        h.transport
            .mock_ok(HttpMethod::Get, "/video/hot", page(&[1, 2], 3));
        h.transport.mock_ok(HttpMethod::Get, "/video/hot", page(&[3], 3));
        let store = FeedStore::new(FeedKind::Hot, h.api.clone());

        assert!(store.has_more());
        assert!(store.load(true).await);
        assert_eq!(
            h.transport.last_request().unwrap().url,
            "http://api.test/video/hot?page=1&size=12"
        );
        assert!(store.load_more().await);
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert!(!store.has_more());
        assert!(!store.load_more().await);
        assert_eq!(h.transport.request_count(), 2);
    }

    #[tokio::test]
    async fn reset_replaces_items() {
        let h = Harness::new();
        h.transport
            .mock_ok(HttpMethod::Get, "/user/9/videos", page(&[1, 2], 10));
        h.transport
            .mock_ok(HttpMethod::Get, "/user/9/videos", page(&[5], 1));
        let store = FeedStore::new(FeedKind::User(UserId(9)), h.api.clone());

        store.load(true).await;
        store.load(true).await;
        assert_eq!(ids(&store), vec![5]);
        assert_eq!(store.state().get_untracked().page, 1);
    }

    #[tokio::test]
    async fn concurrent_loads_issue_one_request() {
        let h = Harness::yielding();
        h.transport
            .mock_ok(HttpMethod::Get, "/video/recommend", page(&[1], 1));
        let store = FeedStore::new(FeedKind::Recommend, h.api.clone());

        let (a, b) = futures::join!(store.load(true), store.load(true));
        assert!(a);
        assert!(!b);
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn failure_keeps_items() {
        let h = Harness::new();
        h.transport
            .mock_ok(HttpMethod::Get, "/interaction/my_likes", page(&[1], 2));
        let store = FeedStore::new(FeedKind::Liked, h.api.clone());
        store.load(true).await;

        h.transport
            .mock_response(HttpMethod::Get, "/interaction/my_likes", 500, json!({}));
        assert!(!store.load_more().await);
        assert_eq!(ids(&store), vec![1]);
        assert!(!store.is_loading());
        assert!(h.notice_is(NoticeLevel::Error, "加载视频失败"));
    }

    #[tokio::test]
    async fn interaction_events_update_listed_video() {
        let h = Harness::new();
        h.transport
            .mock_ok(HttpMethod::Get, "/video/latest", page(&[1, 2], 2));
        let store = FeedStore::new(FeedKind::Latest, h.api.clone());
        store.load(true).await;
        store.follow_interactions(&h.events);

        h.events.emit(&AppEvent::VideoLiked {
            video_id: VideoId(2),
            liked: true,
            like_count: 8,
        });
        h.events.emit(&AppEvent::VideoCollected {
            video_id: VideoId(7),
            collected: true,
            collect_count: 1,
        });

        let items = store.items();
        assert!(items[1].is_liked);
        assert_eq!(items[1].like_count, 8);
        assert!(!items[0].is_liked);
        assert!(items.iter().all(|v| !v.is_collected));
    }
}
