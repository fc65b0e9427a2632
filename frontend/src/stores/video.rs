//! 视频互动 store
//!
//! - `InteractionLedger`: 会话内已点赞 / 已收藏视频集合
//! - `VideoDetailStore`: 单个视频的详情与点赞、收藏、关注作者操作
//!
//! 点赞与收藏先乐观切换本地状态，再用服务端确认值覆盖；
//! 请求失败或业务失败时回滚到操作前的快照。

use crate::api::{ApiClient, ensure_success};
use crate::error::{ApiError, ApiResult};
use crate::events::{AppEvent, EventBus, FollowUpdate};
use crate::notify::Notifier;
use crate::stores::session::SessionStore;
use crate::web::confirm::Confirm;
use leptos::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use yun_shared::{Author, UserId, Video, VideoId};

const MSG_ACTION_FAILED: &str = "操作失败";
const MSG_CONFIRM_UNFOLLOW: &str = "确定要取消关注该用户吗？";

// =========================================================
// 互动记录
// =========================================================

/// 会话内的点赞 / 收藏集合
#[derive(Clone, Copy)]
pub struct InteractionLedger {
    liked: RwSignal<BTreeSet<VideoId>>,
    collected: RwSignal<BTreeSet<VideoId>>,
}

impl InteractionLedger {
    pub fn new() -> Self {
        Self {
            liked: RwSignal::new(BTreeSet::new()),
            collected: RwSignal::new(BTreeSet::new()),
        }
    }

    pub fn set_liked(&self, id: VideoId, liked: bool) {
        mirror(self.liked, id, liked);
    }

    pub fn set_collected(&self, id: VideoId, collected: bool) {
        mirror(self.collected, id, collected);
    }

    pub fn is_liked(&self, id: VideoId) -> bool {
        self.liked.with(|s| s.contains(&id))
    }

    pub fn is_collected(&self, id: VideoId) -> bool {
        self.collected.with(|s| s.contains(&id))
    }
}

impl Default for InteractionLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn mirror(set: RwSignal<BTreeSet<VideoId>>, id: VideoId, present: bool) {
    // 状态未变化时不触发更新
    if set.with_untracked(|s| s.contains(&id)) == present {
        return;
    }
    set.update(|s| {
        if present {
            s.insert(id);
        } else {
            s.remove(&id);
        }
    });
}

// =========================================================
// 视频详情
// =========================================================

/// 当前用户与视频 / 作者之间的互动状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub is_liked: bool,
    pub is_favorited: bool,
    pub is_followed: bool,
    pub is_mutual: bool,
    pub is_follower: bool,
}

impl InteractionState {
    fn from_video(video: &Video) -> Self {
        let uploader = video.uploader.as_ref();
        Self {
            is_liked: video.is_liked,
            is_favorited: video.is_collected,
            is_followed: uploader.is_some_and(|u| u.is_followed),
            is_mutual: uploader.is_some_and(|u| u.is_mutual),
            is_follower: uploader.is_some_and(|u| u.is_follower),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoDetailState {
    pub video: Option<Video>,
    pub interaction: InteractionState,
    pub loading: bool,
    liking: bool,
    favoriting: bool,
    following: bool,
}

/// 可乐观切换的互动
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Toggle {
    Like,
    Favorite,
}

impl Toggle {
    fn in_flight(self, state: &mut VideoDetailState) -> &mut bool {
        match self {
            Toggle::Like => &mut state.liking,
            Toggle::Favorite => &mut state.favoriting,
        }
    }

    /// 读取 (是否激活, 计数)
    fn read(self, state: &VideoDetailState) -> (bool, u64) {
        let count = state.video.as_ref().map_or(0, |v| match self {
            Toggle::Like => v.like_count,
            Toggle::Favorite => v.collect_count,
        });
        let active = match self {
            Toggle::Like => state.interaction.is_liked,
            Toggle::Favorite => state.interaction.is_favorited,
        };
        (active, count)
    }

    fn write(self, state: &mut VideoDetailState, active: bool, count: u64) {
        match self {
            Toggle::Like => state.interaction.is_liked = active,
            Toggle::Favorite => state.interaction.is_favorited = active,
        }
        if let Some(video) = state.video.as_mut() {
            match self {
                Toggle::Like => {
                    video.is_liked = active;
                    video.like_count = count;
                }
                Toggle::Favorite => {
                    video.is_collected = active;
                    video.collect_count = count;
                }
            }
        }
    }

    fn messages(self, active: bool) -> &'static str {
        match (self, active) {
            (Toggle::Like, true) => "点赞成功",
            (Toggle::Like, false) => "取消点赞",
            (Toggle::Favorite, true) => "收藏成功",
            (Toggle::Favorite, false) => "取消收藏",
        }
    }
}

/// 视频详情 store
#[derive(Clone)]
pub struct VideoDetailStore {
    video_id: VideoId,
    state: RwSignal<VideoDetailState>,
    api: ApiClient,
    notifier: Notifier,
    session: SessionStore,
    ledger: InteractionLedger,
    events: EventBus,
    confirm: Arc<dyn Confirm>,
}

impl VideoDetailStore {
    pub fn new(
        video_id: VideoId,
        api: ApiClient,
        session: SessionStore,
        ledger: InteractionLedger,
        events: EventBus,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            video_id,
            state: RwSignal::new(VideoDetailState::default()),
            notifier: api.notifier(),
            api,
            session,
            ledger,
            events,
            confirm,
        }
    }

    // --- 读取 ---

    pub fn state(&self) -> RwSignal<VideoDetailState> {
        self.state
    }

    pub fn video(&self) -> Option<Video> {
        self.state.with(|s| s.video.clone())
    }

    pub fn interaction(&self) -> InteractionState {
        self.state.with(|s| s.interaction)
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn like_count(&self) -> u64 {
        self.state.with(|s| s.video.as_ref().map_or(0, |v| v.like_count))
    }

    pub fn favorite_count(&self) -> u64 {
        self.state.with(|s| s.video.as_ref().map_or(0, |v| v.collect_count))
    }

    pub fn comment_count(&self) -> u64 {
        self.state.with(|s| s.video.as_ref().map_or(0, |v| v.comment_count))
    }

    /// 封面完整地址
    pub fn preview_url(&self) -> String {
        let config = self.api.config();
        self.state
            .with(|s| config.resolve_asset(s.video.as_ref().and_then(Video::cover_path)))
    }

    /// 视频文件完整地址
    pub fn source_url(&self) -> String {
        let config = self.api.config();
        self.state
            .with(|s| config.resolve_asset(s.video.as_ref().and_then(Video::media_path)))
    }

    /// 作者信息（头像已解析为完整地址）
    pub fn author(&self) -> Option<Author> {
        let config = self.api.config();
        self.state.with(|s| {
            let mut author = s.video.as_ref()?.uploader.clone()?;
            let avatar = config.resolve_asset(author.avatar_path());
            author.profile_picture = Some(avatar);
            Some(author)
        })
    }

    fn uploader_id(&self) -> Option<UserId> {
        self.state
            .with_untracked(|s| s.video.as_ref()?.uploader.as_ref().map(|u| u.id))
    }

    /// 作者是否为当前用户
    pub fn is_self(&self) -> bool {
        match (self.session.current_user_id(), self.uploader_id()) {
            (Some(me), Some(author)) => me == author,
            _ => false,
        }
    }

    /// 作者主页路径：自己跳转个人资料页
    pub fn author_profile_path(&self) -> Option<String> {
        let author = self.uploader_id()?;
        if self.is_self() {
            Some("/user/profile".to_string())
        } else {
            Some(format!("/user/{}", author))
        }
    }

    // =========================================================
    // 加载
    // =========================================================

    /// 拉取视频详情，业务失败视为错误
    pub async fn load_detail(&self) -> ApiResult<()> {
        self.state.update(|s| s.loading = true);

        let result = match self.api.video_detail(self.video_id).await {
            Ok(reply) => ensure_success(reply, "获取视频详情失败").and_then(|data| {
                data.ok_or_else(|| ApiError::business("获取视频详情失败"))
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(video) => {
                let interaction = InteractionState::from_video(&video);
                self.ledger.set_liked(self.video_id, interaction.is_liked);
                self.ledger
                    .set_collected(self.video_id, interaction.is_favorited);
                self.state.update(|s| {
                    s.video = Some(video);
                    s.interaction = interaction;
                    s.loading = false;
                });
                Ok(())
            }
            Err(e) => {
                self.state.update(|s| s.loading = false);
                Err(e.in_op_with("video.load_detail", self.video_id.to_string()))
            }
        }
    }

    // =========================================================
    // 点赞 / 收藏
    // =========================================================

    pub async fn like(&self) -> bool {
        self.toggle(Toggle::Like).await
    }

    pub async fn favorite(&self) -> bool {
        self.toggle(Toggle::Favorite).await
    }

    async fn toggle(&self, toggle: Toggle) -> bool {
        let mut snapshot = None;
        self.state.update(|s| {
            if s.video.is_none() || *toggle.in_flight(s) {
                return;
            }
            let (active, count) = toggle.read(s);
            snapshot = Some((active, count));
            // 乐观更新
            let next_count = if active {
                count.saturating_sub(1)
            } else {
                count + 1
            };
            toggle.write(s, !active, next_count);
            *toggle.in_flight(s) = true;
        });
        let Some((was_active, was_count)) = snapshot else {
            return false;
        };

        let confirmed = match toggle {
            Toggle::Like => self
                .api
                .like_video(self.video_id)
                .await
                .and_then(|r| ensure_success(r, "点赞失败"))
                .map(|d| d.map(|d| (d.is_liked, d.like_count))),
            Toggle::Favorite => self
                .api
                .collect_video(self.video_id)
                .await
                .and_then(|r| ensure_success(r, "收藏失败"))
                .map(|d| d.map(|d| (d.is_collected, d.collect_count))),
        };

        match confirmed {
            Ok(confirmed) => {
                let mut settled = (!was_active, 0);
                self.state.update(|s| {
                    if let Some((active, count)) = confirmed {
                        toggle.write(s, active, count);
                    }
                    settled = toggle.read(s);
                    *toggle.in_flight(s) = false;
                });
                let (active, count) = settled;

                let event = match toggle {
                    Toggle::Like => {
                        self.ledger.set_liked(self.video_id, active);
                        AppEvent::VideoLiked {
                            video_id: self.video_id,
                            liked: active,
                            like_count: count,
                        }
                    }
                    Toggle::Favorite => {
                        self.ledger.set_collected(self.video_id, active);
                        AppEvent::VideoCollected {
                            video_id: self.video_id,
                            collected: active,
                            collect_count: count,
                        }
                    }
                };
                self.events.emit(&event);
                self.notifier.success(toggle.messages(active));
                true
            }
            Err(e) => {
                // 回滚
                self.state.update(|s| {
                    toggle.write(s, was_active, was_count);
                    *toggle.in_flight(s) = false;
                });
                log::error!("{}", e.in_op_with("video.toggle", format!("{:?}", toggle)));
                self.notifier.error(MSG_ACTION_FAILED);
                false
            }
        }
    }

    // =========================================================
    // 关注作者
    // =========================================================

    /// 关注 / 取消关注作者（取消关注需要确认）
    pub async fn follow(&self) -> bool {
        let Some(author_id) = self.uploader_id() else {
            return false;
        };
        if self.is_self() {
            log::warn!("[Video] cannot follow yourself");
            return false;
        }
        if self.state.with_untracked(|s| s.following) {
            return false;
        }

        let is_unfollow = self
            .state
            .with_untracked(|s| s.interaction.is_followed || s.interaction.is_mutual);
        if is_unfollow && !self.confirm.confirm(MSG_CONFIRM_UNFOLLOW) {
            return false;
        }

        self.state.update(|s| s.following = true);
        let result = self
            .api
            .follow(author_id)
            .await
            .and_then(|r| ensure_success(r, "关注操作失败"));
        self.state.update(|s| s.following = false);

        let data = match result {
            Ok(Some(data)) => data,
            Ok(None) => return true,
            Err(e) => {
                log::error!("{}", e.in_op_with("video.follow", author_id.to_string()));
                self.notifier.error(MSG_ACTION_FAILED);
                return false;
            }
        };

        self.state.update(|s| {
            s.interaction.is_followed = data.is_followed;
            s.interaction.is_mutual = data.is_mutual;
            s.interaction.is_follower = data.is_follower;
            if let Some(uploader) = s.video.as_mut().and_then(|v| v.uploader.as_mut()) {
                uploader.is_followed = data.is_followed;
                uploader.is_mutual = data.is_mutual;
                uploader.is_follower = data.is_follower;
            }
        });
        self.session
            .update_follow_stats(data.following_count, data.follower_count);
        self.events.emit(&AppEvent::FollowUpdated(FollowUpdate {
            followed: data.is_followed,
            current_user_id: self.session.current_user_id(),
            target_user_id: author_id,
            current_following_count: data.following_count,
            current_follower_count: data.follower_count,
            target_follower_count: data.follower_count,
        }));

        if data.is_mutual {
            self.notifier.success("互相关注成功！");
        } else if data.is_followed && data.is_follower {
            self.notifier.success("回关成功！");
        } else if data.is_followed {
            self.notifier.success("关注成功！");
        } else {
            self.notifier.info("已取消关注");
        }
        true
    }

    // =========================================================
    // 观看记录
    // =========================================================

    /// 上报一次观看
    pub async fn record_view(&self, watch_duration: Option<u64>) -> ApiResult<()> {
        let reply = self
            .api
            .log_video_view(self.video_id, watch_duration)
            .await?;
        ensure_success(reply, "记录观看失败").map(|_| ())
    }
}

#[cfg(test)]
mod tests;
