//! 视频与互动接口

use super::ApiClient;
use super::user::UploadFile;
use crate::error::ApiResult;
use crate::web::http::FormPart;
use serde_json::Value;
use yun_shared::protocol::{
    CollectVideoRequest, DeleteCollectionRequest, DeleteLikeRequest, FeedKind, FeedRequest,
    LikeVideoRequest, PageQuery, UPLOAD_VIDEO_PATH, VideoCollectResult, VideoDetailRequest,
    VideoLikeResult,
};
use yun_shared::{Page, Reply, Video, VideoId};

/// 视频上传表单
#[derive(Debug, Clone, PartialEq)]
pub struct VideoUpload {
    pub title: String,
    pub description: Option<String>,
    pub file: UploadFile,
    pub cover: Option<UploadFile>,
}

impl VideoUpload {
    fn into_parts(self) -> Vec<FormPart> {
        let mut parts = vec![FormPart::Text {
            name: "title".into(),
            value: self.title,
        }];
        if let Some(description) = self.description {
            parts.push(FormPart::Text {
                name: "description".into(),
                value: description,
            });
        }
        parts.push(self.file.into_part("file"));
        if let Some(cover) = self.cover {
            parts.push(cover.into_part("cover"));
        }
        parts
    }
}

impl ApiClient {
    pub async fn upload_video(&self, form: VideoUpload) -> ApiResult<Reply<Video>> {
        self.upload(UPLOAD_VIDEO_PATH, form.into_parts()).await
    }

    /// 各类视频列表（推荐 / 热门 / 最新 / 我的 / 点赞 / 收藏 / 他人作品 / 观看历史）
    pub async fn feed(&self, kind: FeedKind, page: PageQuery) -> ApiResult<Reply<Page<Video>>> {
        self.call(&FeedRequest { kind, page }).await
    }

    pub async fn video_detail(&self, video_id: VideoId) -> ApiResult<Reply<Video>> {
        self.call(&VideoDetailRequest { video_id }).await
    }

    /// 点赞切换
    pub async fn like_video(&self, video_id: VideoId) -> ApiResult<Reply<VideoLikeResult>> {
        self.call(&LikeVideoRequest { video_id }).await
    }

    /// 收藏切换
    pub async fn collect_video(
        &self,
        video_id: VideoId,
    ) -> ApiResult<Reply<VideoCollectResult>> {
        self.call(&CollectVideoRequest { video_id }).await
    }

    pub async fn delete_like(&self, video_id: VideoId) -> ApiResult<Reply<Value>> {
        self.call(&DeleteLikeRequest { video_id }).await
    }

    pub async fn delete_collection(&self, video_id: VideoId) -> ApiResult<Reply<Value>> {
        self.call(&DeleteCollectionRequest { video_id }).await
    }
}
