//! 观看记录接口

use super::ApiClient;
use crate::error::ApiResult;
use serde_json::Value;
use yun_shared::protocol::{DeleteHistoryRequest, FeedKind, LogVideoViewRequest, PageQuery};
use yun_shared::{Page, Reply, Video, VideoId};

impl ApiClient {
    pub async fn watch_history(&self, page: PageQuery) -> ApiResult<Reply<Page<Video>>> {
        self.feed(FeedKind::History, page).await
    }

    pub async fn log_video_view(
        &self,
        video_id: VideoId,
        watch_duration: Option<u64>,
    ) -> ApiResult<Reply<Value>> {
        self.call(&LogVideoViewRequest {
            video_id,
            watch_duration,
        })
        .await
    }

    pub async fn delete_history(&self, video_id: VideoId) -> ApiResult<Reply<Value>> {
        self.call(&DeleteHistoryRequest { video_id }).await
    }
}
