//! 评论树
//!
//! - `CommentNode`: 界面使用的评论节点（由后端原始结构映射而来）
//! - `locate` / `TreePath`: 唯一的树遍历工具，查找、插入、计数覆盖、删除都基于它
//! - `CommentThread`: 一个视频下的评论列表及分页状态

use crate::config::AppConfig;
use yun_shared::date::format_display;
use yun_shared::protocol::CommentReaction;
use yun_shared::{CommentId, CommentOrder, RawComment, UserId, VideoId};

// =========================================================
// 节点
// =========================================================

/// 界面评论节点
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentNode {
    pub id: CommentId,
    pub video_id: VideoId,
    pub user_id: Option<UserId>,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub username: String,
    /// 已解析为完整地址的头像
    pub avatar: String,
    pub created_at: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`，无法解析时为空
    pub time: String,
    pub like_count: u64,
    pub dislike_count: u64,
    pub reply_count: u64,
    pub replies: Vec<CommentNode>,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// 映射后端原始评论
    ///
    /// 作者信息优先取嵌套的 `user`，其次取扁平字段；`video_id` 统一使用当前视频。
    pub fn from_raw(raw: RawComment, video_id: VideoId, config: &AppConfig) -> Self {
        let user = raw.user.unwrap_or_default();
        let username = user
            .username
            .filter(|s| !s.is_empty())
            .or(raw.username)
            .unwrap_or_default();
        let avatar_path = user
            .profile_picture
            .filter(|s| !s.is_empty())
            .or(raw.avatar);
        let time = format_display(raw.created_at.as_deref().unwrap_or_default());

        let map_all = |nodes: Vec<RawComment>| -> Vec<CommentNode> {
            nodes
                .into_iter()
                .map(|n| CommentNode::from_raw(n, video_id, config))
                .collect()
        };

        Self {
            id: raw.id,
            video_id,
            user_id: user.id.or(raw.user_id),
            content: raw.content,
            parent_id: raw.parent_id,
            username,
            avatar: config.resolve_asset(avatar_path.as_deref()),
            created_at: raw.created_at,
            time,
            like_count: raw.like_count,
            dislike_count: raw.dislike_count,
            reply_count: raw.reply_count,
            replies: map_all(raw.replies),
            children: map_all(raw.children),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    fn branch(&self, branch: Branch) -> &[CommentNode] {
        match branch {
            Branch::Replies => &self.replies,
            Branch::Children => &self.children,
        }
    }

    fn branch_mut(&mut self, branch: Branch) -> &mut Vec<CommentNode> {
        match branch {
            Branch::Replies => &mut self.replies,
            Branch::Children => &mut self.children,
        }
    }
}

// =========================================================
// 遍历
// =========================================================

/// 子节点所在的列表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Replies,
    Children,
}

/// 节点在树中的位置：根列表下标 + 逐层下降的 (列表, 下标)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreePath {
    pub root: usize,
    pub steps: Vec<(Branch, usize)>,
}

impl TreePath {
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// 父节点位置（根节点没有父节点）
    pub fn parent(&self) -> Option<TreePath> {
        if self.steps.is_empty() {
            return None;
        }
        Some(TreePath {
            root: self.root,
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }
}

/// 深度优先查找节点位置（先 `replies` 后 `children`）
pub fn locate(nodes: &[CommentNode], id: CommentId) -> Option<TreePath> {
    nodes.iter().enumerate().find_map(|(root, node)| {
        let mut steps = Vec::new();
        search(node, id, &mut steps).then_some(TreePath { root, steps })
    })
}

fn search(node: &CommentNode, id: CommentId, steps: &mut Vec<(Branch, usize)>) -> bool {
    if node.id == id {
        return true;
    }
    for branch in [Branch::Replies, Branch::Children] {
        for (index, child) in node.branch(branch).iter().enumerate() {
            steps.push((branch, index));
            if search(child, id, steps) {
                return true;
            }
            steps.pop();
        }
    }
    false
}

pub fn node_at<'a>(nodes: &'a [CommentNode], path: &TreePath) -> Option<&'a CommentNode> {
    let mut node = nodes.get(path.root)?;
    for &(branch, index) in &path.steps {
        node = node.branch(branch).get(index)?;
    }
    Some(node)
}

pub fn node_mut<'a>(nodes: &'a mut [CommentNode], path: &TreePath) -> Option<&'a mut CommentNode> {
    let mut node = nodes.get_mut(path.root)?;
    for &(branch, index) in &path.steps {
        node = node.branch_mut(branch).get_mut(index)?;
    }
    Some(node)
}

pub fn find(nodes: &[CommentNode], id: CommentId) -> Option<&CommentNode> {
    locate(nodes, id).and_then(|path| node_at(nodes, &path))
}

pub fn find_mut(nodes: &mut [CommentNode], id: CommentId) -> Option<&mut CommentNode> {
    let path = locate(nodes, id)?;
    node_mut(nodes, &path)
}

/// 删除节点（任意深度），嵌套回复同时减少父节点的 `reply_count`
pub fn remove(nodes: &mut Vec<CommentNode>, id: CommentId) -> Option<CommentNode> {
    let path = locate(nodes, id)?;
    let Some(parent_path) = path.parent() else {
        return Some(nodes.remove(path.root));
    };

    let &(branch, index) = path.steps.last()?;
    let parent = node_mut(nodes, &parent_path)?;
    let removed = parent.branch_mut(branch).remove(index);
    parent.reply_count = parent.reply_count.saturating_sub(1);
    Some(removed)
}

// =========================================================
// 列表状态
// =========================================================

/// 一个视频的评论列表
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub video_id: VideoId,
    /// 顶层评论
    pub items: Vec<CommentNode>,
    /// 已加载的最后一页（首次加载前为 0）
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub order: CommentOrder,
    pub loading: bool,
    /// 最近一次分页加载后是否还有下一页
    more: bool,
}

impl CommentThread {
    pub fn new(video_id: VideoId, size: u32) -> Self {
        Self {
            video_id,
            items: Vec::new(),
            page: 0,
            size,
            total: 0,
            order: CommentOrder::default(),
            loading: false,
            more: true,
        }
    }

    /// 首次加载前视为还有更多
    ///
    /// 只在写入一页结果时更新，发表或删除评论不影响分页。
    pub fn has_more(&self) -> bool {
        self.more
    }

    /// 清空列表并回到未加载状态，下一次请求第 1 页
    pub fn clear(&mut self) {
        self.items.clear();
        self.page = 0;
        self.total = 0;
        self.more = true;
    }

    /// 写入一页结果
    ///
    /// `reset` 时替换列表，否则追加；`page` 为本次请求的页码。
    pub fn apply_page(&mut self, nodes: Vec<CommentNode>, total: u64, page: u32, reset: bool) {
        if reset {
            self.items = nodes;
        } else {
            self.items.extend(nodes);
        }
        self.total = total;
        self.page = page;
        self.more = (self.items.len() as u64) < total;
    }

    /// 插入新评论：顶层插到列表头部，回复插到父节点 `replies` 头部
    ///
    /// 父节点不在已加载的树中时不插入，但总数照常增加。返回是否插入到了树中。
    pub fn insert(&mut self, node: CommentNode, parent_id: Option<CommentId>) -> bool {
        self.total += 1;
        match parent_id {
            None => {
                self.items.insert(0, node);
                true
            }
            Some(parent_id) => match find_mut(&mut self.items, parent_id) {
                Some(parent) => {
                    parent.replies.insert(0, node);
                    parent.reply_count += 1;
                    true
                }
                None => false,
            },
        }
    }

    /// 用服务端确认的计数覆盖目标节点
    pub fn apply_reaction(&mut self, id: CommentId, counts: &CommentReaction) -> bool {
        match find_mut(&mut self.items, id) {
            Some(node) => {
                node.like_count = counts.like_count;
                node.dislike_count = counts.dislike_count;
                true
            }
            None => false,
        }
    }

    /// 删除评论，总数减一（不低于 0）
    pub fn remove(&mut self, id: CommentId) -> Option<CommentNode> {
        self.total = self.total.saturating_sub(1);
        remove(&mut self.items, id)
    }
}
