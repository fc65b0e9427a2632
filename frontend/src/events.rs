//! 应用事件总线
//!
//! 跨 store 的通知（关注变化、资料更新、视频点赞/收藏/上传）通过显式订阅分发。
//! 订阅返回 `SubscriptionId`，持有方负责在不再需要时取消订阅。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use yun_shared::{UserId, UserProfile, VideoId};

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    FollowUpdated,
    ProfileUpdated,
    VideoLiked,
    VideoCollected,
    VideoUploaded,
}

/// 关注关系变化
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpdate {
    /// `true` 为关注，`false` 为取消关注
    pub followed: bool,
    pub current_user_id: Option<UserId>,
    pub target_user_id: UserId,
    pub current_following_count: u64,
    pub current_follower_count: u64,
    pub target_follower_count: u64,
}

/// 应用事件
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    FollowUpdated(FollowUpdate),
    ProfileUpdated(UserProfile),
    VideoLiked {
        video_id: VideoId,
        liked: bool,
        like_count: u64,
    },
    VideoCollected {
        video_id: VideoId,
        collected: bool,
        collect_count: u64,
    },
    VideoUploaded {
        video_id: Option<VideoId>,
    },
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::FollowUpdated(_) => EventKind::FollowUpdated,
            AppEvent::ProfileUpdated(_) => EventKind::ProfileUpdated,
            AppEvent::VideoLiked { .. } => EventKind::VideoLiked,
            AppEvent::VideoCollected { .. } => EventKind::VideoCollected,
            AppEvent::VideoUploaded { .. } => EventKind::VideoUploaded,
        }
    }
}

/// 订阅句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

/// 事件总线
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅某一类事件
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscriber {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    /// 取消订阅，返回是否确实移除了订阅
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// 同步分发事件
    pub fn emit(&self, event: &AppEvent) {
        let kind = event.kind();
        // 先复制处理器列表再调用，处理器内部可以再订阅 / 取消订阅
        let handlers: Vec<Handler> = self
            .lock()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.handler.clone())
            .collect();

        log::debug!("[EventBus] {:?} -> {} handler(s)", kind, handlers.len());
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lock().iter().filter(|s| s.kind == kind).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}
