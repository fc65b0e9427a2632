//! 接口协议
//!
//! 每个 REST 端点对应一个请求结构体，通过 `ApiRequest` 描述方法、路径、
//! 参数编码方式和响应类型。路径中的 ID 字段标记 `#[serde(skip)]`，
//! 不会再出现在查询串或请求体里。

use crate::id::{CommentId, UserId, VideoId, null_as_default};
use crate::model::{CommentOrder, ProfilePatch, RawComment, UserProfile, Video};
use crate::Page;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 请求参数的编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 字段编码为查询串
    Query,
    /// 字段编码为 JSON 请求体
    Json,
    /// 不携带参数
    Empty,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The `data` type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// 相对于 API 根地址的路径
    fn path(&self) -> String;

    /// GET/DELETE 默认编码为查询串，其余默认编码为 JSON 请求体
    fn encoding(&self) -> Encoding {
        match Self::METHOD {
            HttpMethod::Get | HttpMethod::Delete => Encoding::Query,
            HttpMethod::Post | HttpMethod::Put => Encoding::Json,
        }
    }
}

/// 通用分页参数
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            order: None,
        }
    }
}

// =========================================================
// 认证 (auth)
// =========================================================

/// 获取图形验证码（非信封响应）
#[derive(Debug, Serialize)]
pub struct CaptchaRequest;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaptchaImage {
    pub captcha_id: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl CaptchaImage {
    /// 可直接用于 `<img src>` 的图片数据
    pub fn image_src(&self) -> Option<String> {
        if let Some(b64) = self.image_base64.as_deref().filter(|s| !s.is_empty()) {
            if b64.starts_with("data:") {
                return Some(b64.to_string());
            }
            return Some(format!("data:image/png;base64,{}", b64));
        }
        self.image.clone().filter(|s| !s.is_empty())
    }
}

impl ApiRequest for CaptchaRequest {
    type Response = CaptchaImage;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/user/captcha/image_verification_code".into()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
    pub captcha_id: String,
    pub captcha_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/user/auth/login".into()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
}

impl ApiRequest for RegisterRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/user/auth/register".into()
    }
}

/// 发送邮箱验证码（POST 但参数在查询串上）
#[derive(Debug, Clone, Serialize)]
pub struct SendEmailCodeRequest {
    pub email: String,
    /// 0 = 注册验证码
    #[serde(rename = "type")]
    pub kind: u8,
}

impl SendEmailCodeRequest {
    pub fn register(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            kind: 0,
        }
    }
}

impl ApiRequest for SendEmailCodeRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/user/captcha/send_email".into()
    }

    fn encoding(&self) -> Encoding {
        Encoding::Query
    }
}

// =========================================================
// 用户资料 (profile)
// =========================================================

#[derive(Debug, Serialize)]
pub struct ProfileRequest;

impl ApiRequest for ProfileRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/user/profile".into()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(flatten)]
    pub patch: ProfilePatch,
}

impl ApiRequest for UpdateProfileRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/user/update-profile".into()
    }
}

/// 头像上传路径（multipart，走 `upload`）
pub const UPLOAD_AVATAR_PATH: &str = "/user/upload-avatar";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvatarUploaded {
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl ApiRequest for ChangePasswordRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/user/change_password".into()
    }
}

/// 他人资料
#[derive(Debug, Clone, Serialize)]
pub struct UserProfileRequest {
    #[serde(skip)]
    pub user_id: UserId,
}

impl ApiRequest for UserProfileRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/user/profile/{}", self.user_id)
    }
}

// =========================================================
// 关注 (follow)
// =========================================================

/// 关注操作后的关系与计数
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FollowResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_followed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_mutual: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_follower: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub following_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follower_count: u64,
}

macro_rules! user_action {
    ($(#[$meta:meta])* $name:ident, $method:ident, $path:literal, $resp:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize)]
        pub struct $name {
            pub user_id: UserId,
        }

        impl ApiRequest for $name {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;

            fn path(&self) -> String {
                $path.into()
            }
        }
    };
}

user_action!(
    /// 关注（后端按当前关系切换）
    FollowRequest, Post, "/user/follow", FollowResult
);
user_action!(UnfollowRequest, Post, "/user/unfollow", Value);
user_action!(
    /// 移除粉丝
    RemoveFanRequest, Post, "/user/remove_fan", Value
);
user_action!(FollowStatusRequest, Get, "/user/follow_status", FollowStatus);
user_action!(FansCountRequest, Get, "/user/fans_count", CountResult);
user_action!(FollowingCountRequest, Get, "/user/following_count", CountResult);

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct FollowStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_following: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CountResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

/// 关注 / 粉丝列表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationList {
    Following,
    Fans,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationListRequest {
    #[serde(skip)]
    pub list: RelationList,
    #[serde(flatten)]
    pub page: PageQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl ApiRequest for RelationListRequest {
    type Response = Page<UserProfile>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.list {
            RelationList::Following => "/user/following_list".into(),
            RelationList::Fans => "/user/fans_list".into(),
        }
    }
}

// =========================================================
// 视频 (video)
// =========================================================

/// 视频上传路径（multipart，走 `upload`）
pub const UPLOAD_VIDEO_PATH: &str = "/video/upload_video";

/// 各类视频列表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedKind {
    #[default]
    Recommend,
    Hot,
    Latest,
    Mine,
    Liked,
    Collected,
    User(UserId),
    History,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedRequest {
    #[serde(skip)]
    pub kind: FeedKind,
    #[serde(flatten)]
    pub page: PageQuery,
}

impl ApiRequest for FeedRequest {
    type Response = Page<Video>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        match self.kind {
            FeedKind::Recommend => "/video/recommend".into(),
            FeedKind::Hot => "/video/hot".into(),
            FeedKind::Latest => "/video/latest".into(),
            FeedKind::Mine => "/video/my_list".into(),
            FeedKind::Liked => "/interaction/my_likes".into(),
            FeedKind::Collected => "/interaction/my_collections".into(),
            FeedKind::User(id) => format!("/user/{}/videos", id),
            FeedKind::History => "/analytics/user/watch-history-mysql".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoDetailRequest {
    #[serde(skip)]
    pub video_id: VideoId,
}

impl ApiRequest for VideoDetailRequest {
    type Response = Video;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/video/detail/{}", self.video_id)
    }
}

// =========================================================
// 互动 (interaction)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct VideoLikeResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct VideoCollectResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub collect_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_collected: bool,
}

/// 点赞（后端按当前状态切换）
#[derive(Debug, Clone, Serialize)]
pub struct LikeVideoRequest {
    pub video_id: VideoId,
}

impl ApiRequest for LikeVideoRequest {
    type Response = VideoLikeResult;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/interaction/like".into()
    }
}

/// 收藏（后端按当前状态切换）
#[derive(Debug, Clone, Serialize)]
pub struct CollectVideoRequest {
    pub video_id: VideoId,
}

impl ApiRequest for CollectVideoRequest {
    type Response = VideoCollectResult;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/interaction/collection".into()
    }
}

macro_rules! video_delete {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Serialize)]
        pub struct $name {
            #[serde(skip)]
            pub video_id: VideoId,
        }

        impl ApiRequest for $name {
            type Response = Value;
            const METHOD: HttpMethod = HttpMethod::Delete;

            fn path(&self) -> String {
                format!(concat!($prefix, "/{}"), self.video_id)
            }
        }
    };
}

video_delete!(DeleteLikeRequest, "/interaction/like");
video_delete!(DeleteCollectionRequest, "/interaction/collection");
video_delete!(DeleteHistoryRequest, "/analytics/watch-history");

// =========================================================
// 评论 (comment)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListCommentsRequest {
    #[serde(skip)]
    pub video_id: VideoId,
    pub page: u32,
    pub size: u32,
    pub order: CommentOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
}

impl ApiRequest for ListCommentsRequest {
    type Response = Page<RawComment>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/comment/video/{}", self.video_id)
    }
}

/// 整棵评论树（无限嵌套）
#[derive(Debug, Clone, Serialize)]
pub struct CommentTreeRequest {
    #[serde(skip)]
    pub video_id: VideoId,
}

impl ApiRequest for CommentTreeRequest {
    type Response = Vec<RawComment>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/comment/video/{}/tree", self.video_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddCommentRequest {
    pub video_id: VideoId,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

impl ApiRequest for AddCommentRequest {
    type Response = RawComment;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/comment/".into()
    }
}

/// 评论点赞 / 踩之后的计数
///
/// 部分接口不返回 `success`，此时为 `None`。
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CommentReaction {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dislike_count: u64,
}

/// 评论反应类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactCommentRequest {
    #[serde(skip)]
    pub comment_id: CommentId,
    #[serde(skip)]
    pub reaction: Reaction,
}

impl ApiRequest for ReactCommentRequest {
    type Response = CommentReaction;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        match self.reaction {
            Reaction::Like => format!("/comment/{}/like", self.comment_id),
            Reaction::Dislike => format!("/comment/{}/dislike", self.comment_id),
        }
    }

    fn encoding(&self) -> Encoding {
        Encoding::Empty
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteCommentRequest {
    #[serde(skip)]
    pub comment_id: CommentId,
}

impl ApiRequest for DeleteCommentRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/comment/{}", self.comment_id)
    }

    fn encoding(&self) -> Encoding {
        Encoding::Empty
    }
}

// =========================================================
// 观看记录 (history)
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct LogVideoViewRequest {
    pub video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_duration: Option<u64>,
}

impl ApiRequest for LogVideoViewRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/analytics/log_video_view".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_ids_are_not_serialized() {
        let req = ListCommentsRequest {
            video_id: VideoId(42),
            page: 1,
            size: 20,
            order: CommentOrder::Latest,
            parent_id: None,
        };
        assert_eq!(req.path(), "/comment/video/42");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "page": 1, "size": 20, "order": "latest" })
        );
        assert_eq!(req.encoding(), Encoding::Query);
    }

    #[test]
    fn reaction_paths() {
        let like = ReactCommentRequest {
            comment_id: CommentId(7),
            reaction: Reaction::Like,
        };
        let dislike = ReactCommentRequest {
            comment_id: CommentId(7),
            reaction: Reaction::Dislike,
        };
        assert_eq!(like.path(), "/comment/7/like");
        assert_eq!(dislike.path(), "/comment/7/dislike");
        assert_eq!(like.encoding(), Encoding::Empty);
    }

    #[test]
    fn add_comment_sends_explicit_null_parent() {
        let req = AddCommentRequest {
            video_id: VideoId(1),
            content: "hi".into(),
            parent_id: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "video_id": 1, "content": "hi", "parent_id": null })
        );
        assert_eq!(req.encoding(), Encoding::Json);
    }

    #[test]
    fn send_email_code_uses_query_on_post() {
        let req = SendEmailCodeRequest::register("a@b.c");
        assert_eq!(req.encoding(), Encoding::Query);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "email": "a@b.c", "type": 0 })
        );
    }

    #[test]
    fn feed_paths() {
        let feed = |kind| FeedRequest {
            kind,
            page: PageQuery::new(1, 10),
        };
        assert_eq!(feed(FeedKind::User(UserId(5))).path(), "/user/5/videos");
        assert_eq!(feed(FeedKind::Collected).path(), "/interaction/my_collections");
        assert_eq!(feed(FeedKind::History).path(), "/analytics/user/watch-history-mysql");
        assert_eq!(
            serde_json::to_value(feed(FeedKind::Hot)).unwrap(),
            json!({ "page": 1, "size": 10 })
        );
    }

    #[test]
    fn captcha_image_src_prefers_base64() {
        let c = CaptchaImage {
            captcha_id: "id".into(),
            image: Some("http://x/y.png".into()),
            image_base64: Some("AAAA".into()),
        };
        assert_eq!(c.image_src().unwrap(), "data:image/png;base64,AAAA");
    }
}
