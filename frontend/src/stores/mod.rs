//! 应用状态（由应用根组件创建并通过 context 提供）

pub mod comments;
pub mod feed;
pub mod session;
pub mod video;

use crate::error::ApiResult;
use comments::CommentsStore;
use video::VideoDetailStore;

/// 打开视频页：并发拉取详情与第一页评论
pub async fn open_video_page(
    detail: &VideoDetailStore,
    comments: &CommentsStore,
) -> (ApiResult<()>, bool) {
    futures::join!(detail.load_detail(), comments.load(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::session::SessionStore;
    use crate::stores::video::InteractionLedger;
    use crate::test_support::Harness;
    use crate::web::confirm::FixedConfirm;
    use serde_json::json;
    use std::sync::Arc;
    use yun_shared::VideoId;
    use yun_shared::protocol::HttpMethod;

    #[tokio::test]
    async fn video_page_loads_detail_and_comments() {
        let h = Harness::yielding();
        h.transport
            .mock_ok(HttpMethod::Get, "/video/detail/42", json!({ "id": 42, "title": "t" }));
        h.transport.mock_ok(
            HttpMethod::Get,
            "/comment/video/42",
            json!({ "items": [{ "id": 1 }], "total": 1 }),
        );
        let confirm = Arc::new(FixedConfirm::new(true));
        let session = SessionStore::new(h.api.clone(), h.events.clone());
        let detail = VideoDetailStore::new(
            VideoId(42),
            h.api.clone(),
            session,
            InteractionLedger::new(),
            h.events.clone(),
            confirm.clone(),
        );
        let comments = CommentsStore::new(VideoId(42), h.api.clone(), confirm);

        let (loaded, listed) = open_video_page(&detail, &comments).await;

        assert!(loaded.is_ok());
        assert!(listed);
        assert_eq!(detail.video().unwrap().title, "t");
        assert_eq!(comments.items().len(), 1);
    }
}
