//! 评论同步
//!
//! 负责一个视频下评论列表的分页加载、发表、点赞 / 踩、删除，
//! 所有修改都在本地评论树上完成，不做整表刷新。

pub mod tree;

use crate::api::{ApiClient, ensure_success};
use crate::notify::Notifier;
use crate::web::confirm::Confirm;
use leptos::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tree::{CommentNode, CommentThread};
use yun_shared::protocol::Reaction;
use yun_shared::{CommentId, CommentOrder, VideoId};

const MSG_LOAD_FAILED: &str = "加载评论失败";
const MSG_EMPTY_CONTENT: &str = "请输入评论内容";
const MSG_COMMENTED: &str = "评论成功！";
const MSG_REPLIED: &str = "回复成功！";
const MSG_COMMENT_FAILED: &str = "评论失败";
const MSG_LIKED: &str = "点赞成功！";
const MSG_DISLIKED: &str = "踩成功！";
const MSG_ACTION_FAILED: &str = "操作失败";
const MSG_CONFIRM_DELETE: &str = "确定要删除这条评论吗？";
const MSG_DELETED: &str = "删除成功！";
const MSG_DELETE_FAILED: &str = "删除失败";

/// 单条评论的反应占位，drop 时释放（包括 future 被中途丢弃）
struct ReactingGuard {
    set: Arc<Mutex<HashSet<CommentId>>>,
    id: CommentId,
}

impl ReactingGuard {
    fn acquire(set: &Arc<Mutex<HashSet<CommentId>>>, id: CommentId) -> Option<Self> {
        let inserted = set.lock().unwrap_or_else(|e| e.into_inner()).insert(id);
        inserted.then(|| Self {
            set: set.clone(),
            id,
        })
    }
}

impl Drop for ReactingGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

/// 评论 store
#[derive(Clone)]
pub struct CommentsStore {
    thread: RwSignal<CommentThread>,
    /// 正在进行点赞 / 踩的评论
    reacting: Arc<Mutex<HashSet<CommentId>>>,
    api: ApiClient,
    notifier: Notifier,
    confirm: Arc<dyn Confirm>,
}

impl CommentsStore {
    pub fn new(video_id: VideoId, api: ApiClient, confirm: Arc<dyn Confirm>) -> Self {
        let size = api.config().comment_page_size;
        Self {
            thread: RwSignal::new(CommentThread::new(video_id, size)),
            reacting: Arc::new(Mutex::new(HashSet::new())),
            notifier: api.notifier(),
            api,
            confirm,
        }
    }

    // --- 读取 ---

    pub fn thread(&self) -> RwSignal<CommentThread> {
        self.thread
    }

    pub fn video_id(&self) -> VideoId {
        self.thread.with_untracked(|t| t.video_id)
    }

    pub fn items(&self) -> Vec<CommentNode> {
        self.thread.with(|t| t.items.clone())
    }

    pub fn total(&self) -> u64 {
        self.thread.with(|t| t.total)
    }

    pub fn order(&self) -> CommentOrder {
        self.thread.with(|t| t.order)
    }

    pub fn is_loading(&self) -> bool {
        self.thread.with(|t| t.loading)
    }

    pub fn has_more(&self) -> bool {
        self.thread.with(CommentThread::has_more)
    }

    // =========================================================
    // 加载
    // =========================================================

    /// 加载一页顶层评论
    ///
    /// `reset` 时请求第 1 页并替换列表，否则请求下一页并追加。
    /// 已有加载在进行时直接返回 `false`，不发请求。
    pub async fn load(&self, reset: bool) -> bool {
        if self.thread.with_untracked(|t| t.loading) {
            log::debug!("[Comments] load skipped, already in flight");
            return false;
        }

        let (video_id, page, size, order) = self.thread.with_untracked(|t| {
            let page = if reset { 1 } else { t.page + 1 };
            (t.video_id, page, t.size, t.order)
        });
        // 重置时先清空列表与分页
        self.thread.update(|t| {
            if reset {
                t.clear();
            }
            t.loading = true;
        });

        let result = self
            .api
            .list_comments(video_id, page, size, order, None)
            .await
            .and_then(|reply| ensure_success(reply, MSG_LOAD_FAILED))
            .map(Option::unwrap_or_default);

        match result {
            Ok(data) => {
                let config = self.api.config();
                let nodes: Vec<CommentNode> = data
                    .items
                    .into_iter()
                    .map(|raw| CommentNode::from_raw(raw, video_id, config))
                    .collect();
                self.thread.update(|t| {
                    t.apply_page(nodes, data.total, page, reset);
                    t.loading = false;
                });
                true
            }
            Err(e) => {
                log::error!("{}", e.in_op_with("comments.load", video_id.to_string()));
                self.notifier.error(MSG_LOAD_FAILED);
                self.thread.update(|t| t.loading = false);
                false
            }
        }
    }

    /// 还有更多且空闲时加载下一页
    pub async fn load_more(&self) -> bool {
        let ready = self.thread.with_untracked(|t| t.has_more() && !t.loading);
        if !ready {
            return false;
        }
        self.load(false).await
    }

    /// 切换排序并重新加载
    pub async fn change_order(&self, order: CommentOrder) -> bool {
        self.thread.update(|t| t.order = order);
        self.load(true).await
    }

    // =========================================================
    // 发表
    // =========================================================

    /// 发表评论或回复，成功插入到本地树中时返回 `true`
    pub async fn submit(&self, content: &str, parent_id: Option<CommentId>) -> bool {
        if content.trim().is_empty() {
            self.notifier.warning(MSG_EMPTY_CONTENT);
            return false;
        }

        let video_id = self.video_id();
        let reply = match self.api.add_comment(video_id, content, parent_id).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("{}", e.in_op("comments.submit"));
                self.notifier.error(MSG_COMMENT_FAILED);
                return false;
            }
        };

        if !reply.is_success() {
            self.notifier
                .error(reply.message().unwrap_or(MSG_COMMENT_FAILED).to_string());
            return false;
        }

        let inserted = match reply.into_data() {
            Some(raw) => {
                let node = CommentNode::from_raw(raw, video_id, self.api.config());
                self.thread.update(|t| {
                    t.insert(node, parent_id);
                });
                true
            }
            None => false,
        };

        self.notifier.success(if parent_id.is_some() {
            MSG_REPLIED
        } else {
            MSG_COMMENTED
        });
        inserted
    }

    // =========================================================
    // 点赞 / 踩
    // =========================================================

    pub async fn like(&self, comment_id: CommentId) -> bool {
        self.react(comment_id, Reaction::Like).await
    }

    pub async fn dislike(&self, comment_id: CommentId) -> bool {
        self.react(comment_id, Reaction::Dislike).await
    }

    /// 发送反应并用服务端返回的计数覆盖目标节点（不做本地增减）
    ///
    /// 同一条评论已有反应在进行时忽略本次操作。
    async fn react(&self, comment_id: CommentId, reaction: Reaction) -> bool {
        let Some(_in_flight) = ReactingGuard::acquire(&self.reacting, comment_id) else {
            log::debug!("[Comments] reaction on {} already in flight", comment_id);
            return false;
        };

        let applied = match self.api.react_comment(comment_id, reaction).await {
            Ok(reply) if reply.is_success() => {
                // 载荷未携带 `success` 时视为成功
                if let Some(counts) = reply.data().filter(|c| c.success.unwrap_or(true)) {
                    self.thread.update(|t| {
                        t.apply_reaction(comment_id, counts);
                    });
                }
                self.notifier.success(match reaction {
                    Reaction::Like => MSG_LIKED,
                    Reaction::Dislike => MSG_DISLIKED,
                });
                true
            }
            Ok(reply) => {
                log::warn!(
                    "[Comments] reaction on {} rejected: {:?}",
                    comment_id,
                    reply.message()
                );
                self.notifier.error(MSG_ACTION_FAILED);
                false
            }
            Err(e) => {
                log::error!("{}", e.in_op_with("comments.react", comment_id.to_string()));
                self.notifier.error(MSG_ACTION_FAILED);
                false
            }
        };

        applied
    }

    // =========================================================
    // 删除
    // =========================================================

    /// 经用户确认后删除评论（任意层级）
    pub async fn delete(&self, comment_id: CommentId) -> bool {
        if !self.confirm.confirm(MSG_CONFIRM_DELETE) {
            return false;
        }

        match self.api.delete_comment(comment_id).await {
            Ok(reply) if reply.is_success() => {
                self.thread.update(|t| {
                    t.remove(comment_id);
                });
                self.notifier.success(MSG_DELETED);
                true
            }
            Ok(reply) => {
                self.notifier
                    .error(reply.message().unwrap_or(MSG_DELETE_FAILED).to_string());
                false
            }
            Err(e) => {
                log::error!("{}", e.in_op_with("comments.delete", comment_id.to_string()));
                self.notifier.error(MSG_DELETE_FAILED);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests;
