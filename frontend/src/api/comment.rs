//! 评论接口

use super::ApiClient;
use crate::error::ApiResult;
use serde_json::Value;
use yun_shared::protocol::{
    AddCommentRequest, CommentReaction, CommentTreeRequest, DeleteCommentRequest,
    ListCommentsRequest, ReactCommentRequest, Reaction,
};
use yun_shared::{CommentId, CommentOrder, Page, RawComment, Reply, VideoId};

impl ApiClient {
    /// 一页顶层评论（`parent_id` 不为空时为某条评论的回复）
    pub async fn list_comments(
        &self,
        video_id: VideoId,
        page: u32,
        size: u32,
        order: CommentOrder,
        parent_id: Option<CommentId>,
    ) -> ApiResult<Reply<Page<RawComment>>> {
        self.call(&ListCommentsRequest {
            video_id,
            page,
            size,
            order,
            parent_id,
        })
        .await
    }

    /// 整棵评论树
    pub async fn comment_tree(&self, video_id: VideoId) -> ApiResult<Reply<Vec<RawComment>>> {
        self.call(&CommentTreeRequest { video_id }).await
    }

    pub async fn add_comment(
        &self,
        video_id: VideoId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> ApiResult<Reply<RawComment>> {
        self.call(&AddCommentRequest {
            video_id,
            content: content.to_string(),
            parent_id,
        })
        .await
    }

    pub async fn react_comment(
        &self,
        comment_id: CommentId,
        reaction: Reaction,
    ) -> ApiResult<Reply<CommentReaction>> {
        self.call(&ReactCommentRequest {
            comment_id,
            reaction,
        })
        .await
    }

    pub async fn delete_comment(&self, comment_id: CommentId) -> ApiResult<Reply<Value>> {
        self.call(&DeleteCommentRequest { comment_id }).await
    }
}
