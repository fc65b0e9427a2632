//! 领域模型 (Domain Models)
//!
//! 与后端接口契约一一对应的原始结构。字段保持 snake_case，
//! 计数类字段对 `null` / 缺失一律按 0 处理。

use crate::id::{CommentId, UserId, VideoId, null_as_default};
use serde::{Deserialize, Serialize};

// =========================================================
// 用户
// =========================================================

/// 视频作者 / 评论作者等嵌入式用户信息
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follower_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fans_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_followed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_mutual: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_follower: bool,
}

impl Author {
    /// 头像路径（`profile_picture` 优先）
    pub fn avatar_path(&self) -> Option<&str> {
        first_non_empty(&[&self.profile_picture, &self.avatar])
    }
}

/// 用户资料（当前用户或他人主页）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follower_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_followed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_mutual: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_follower: bool,
}

impl UserProfile {
    pub fn avatar_path(&self) -> Option<&str> {
        first_non_empty(&[&self.profile_picture, &self.avatar])
    }
}

/// 资料更新（仅发送有值的字段）
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

// =========================================================
// 视频
// =========================================================

/// 视频详情 / 列表项
///
/// 后端字段（`cover_image`、`file_path`）与前端兼容字段（`cover_url`、`video_url`）
/// 可能同时出现，因此分别保留，通过访问器取值。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collect_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_liked: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_collected: bool,
    #[serde(default)]
    pub uploader: Option<Author>,
    #[serde(default)]
    pub uploader_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Video {
    pub fn cover_path(&self) -> Option<&str> {
        first_non_empty(&[&self.cover_image, &self.cover_url])
    }

    pub fn media_path(&self) -> Option<&str> {
        first_non_empty(&[&self.file_path, &self.video_url])
    }
}

// =========================================================
// 评论
// =========================================================

/// 评论排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrder {
    #[default]
    Latest,
    Hottest,
}

/// 评论中的用户信息（原始结构）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawCommentUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// 后端原始评论结构
///
/// 不同接口对嵌套回复使用 `replies` 或 `children`，两者都保留。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawComment {
    pub id: CommentId,
    #[serde(default)]
    pub video_id: Option<VideoId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dislike_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reply_count: u64,
    #[serde(default)]
    pub user: Option<RawCommentUser>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub replies: Vec<RawComment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RawComment>,
}

fn first_non_empty<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
}
