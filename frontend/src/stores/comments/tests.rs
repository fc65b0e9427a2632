use super::*;
use crate::notify::NoticeLevel;
use crate::test_support::Harness;
use crate::web::confirm::FixedConfirm;
use serde_json::{Value, json};
use yun_shared::protocol::HttpMethod;

const LIST: &str = "/comment/video/42";

fn store(h: &Harness, confirm: bool) -> (CommentsStore, Arc<FixedConfirm>) {
    let confirm = Arc::new(FixedConfirm::new(confirm));
    (
        CommentsStore::new(VideoId(42), h.api.clone(), confirm.clone()),
        confirm,
    )
}

fn page(items: Value, total: u64) -> Value {
    json!({ "items": items, "total": total, "page": 1, "size": 20 })
}

/// 1 ─┬─ 2 ── 3
///    └─ 4
/// 5
fn nested() -> Value {
    json!([
        { "id": 1, "content": "a", "reply_count": 2, "replies": [
            { "id": 2, "parent_id": 1, "content": "b", "reply_count": 1, "replies": [
                { "id": 3, "parent_id": 2, "content": "c" }
            ]},
            { "id": 4, "parent_id": 1, "content": "d" }
        ]},
        { "id": 5, "content": "e" }
    ])
}

fn ids(nodes: &[CommentNode]) -> Vec<u64> {
    nodes.iter().map(|n| n.id.get()).collect()
}

async fn loaded(h: &Harness) -> CommentsStore {
    h.transport.mock_ok(HttpMethod::Get, LIST, page(nested(), 5));
    let (store, _) = store(h, true);
    assert!(store.load(true).await);
    store
}

#[tokio::test]
async fn first_page_maps_items_to_video() {
    let h = Harness::new();
    let store = loaded(&h).await;

    let req = h.transport.last_request().unwrap();
    assert_eq!(
        req.url,
        "http://api.test/comment/video/42?order=latest&page=1&size=20"
    );

    let items = store.items();
    assert_eq!(ids(&items), vec![1, 5]);
    assert!(items.iter().all(|n| n.video_id == VideoId(42)));
    assert_eq!(items[0].replies[0].replies[0].video_id, VideoId(42));
    assert_eq!(store.total(), 5);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn append_then_reset() {
    let h = Harness::new();
    h.transport
        .mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 1 }, { "id": 2 }]), 3));
    h.transport.mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 3 }]), 3));
    h.transport.mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 9 }]), 1));
    let (store, _) = store(&h, true);

    assert!(store.load(true).await);
    assert!(store.has_more());
    assert!(store.load_more().await);
    assert_eq!(ids(&store.items()), vec![1, 2, 3]);
    assert!(h.transport.last_request().unwrap().url.contains("page=2"));
    assert!(!store.has_more());
    // 没有更多时不再请求
    assert!(!store.load_more().await);
    assert_eq!(h.transport.request_count(), 2);

    assert!(store.change_order(CommentOrder::Hottest).await);
    let last = h.transport.last_request().unwrap();
    assert!(last.url.contains("order=hottest"));
    assert!(last.url.contains("page=1"));
    assert_eq!(ids(&store.items()), vec![9]);
    assert_eq!(store.thread().get_untracked().page, 1);
}

#[tokio::test]
async fn concurrent_loads_issue_one_request() {
    let h = Harness::yielding();
    h.transport.mock_ok(HttpMethod::Get, LIST, page(nested(), 5));
    let (store, _) = store(&h, true);

    let (first, second) = futures::join!(store.load(true), store.load(true));
    assert!(first);
    assert!(!second);
    assert_eq!(h.transport.request_count(), 1);
    assert_eq!(ids(&store.items()), vec![1, 5]);
}

#[tokio::test]
async fn failed_reset_clears_list_and_pagination() {
    let h = Harness::new();
    h.transport
        .mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 1 }]), 3));
    h.transport
        .mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 2 }]), 3));
    let (store, _) = store(&h, true);
    assert!(store.load(true).await);
    assert!(store.load_more().await);
    assert_eq!(store.thread().get_untracked().page, 2);

    h.transport
        .mock_response(HttpMethod::Get, LIST, 500, json!({ "msg": "down" }));
    assert!(!store.change_order(CommentOrder::Hottest).await);

    let thread = store.thread().get_untracked();
    assert!(thread.items.is_empty());
    assert_eq!((thread.page, thread.total), (0, 0));
    assert_eq!(thread.order, CommentOrder::Hottest);
    assert!(!store.is_loading());
    assert!(h.notice_is(NoticeLevel::Error, "加载评论失败"));

    // 下一次加载从新排序的第 1 页开始
    h.transport
        .mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 7 }]), 1));
    assert!(store.load_more().await);
    let last = h.transport.last_request().unwrap();
    assert!(last.url.contains("order=hottest"));
    assert!(last.url.contains("page=1"));
    assert_eq!(ids(&store.items()), vec![7]);
}

#[tokio::test]
async fn reply_does_not_open_another_page() {
    let h = Harness::new();
    h.transport.mock_ok(
        HttpMethod::Get,
        LIST,
        page(json!([{ "id": 1 }, { "id": 2 }]), 2),
    );
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/",
        json!({ "id": 30, "parent_id": 1, "content": "r" }),
    );
    let (store, _) = store(&h, true);
    assert!(store.load(true).await);
    assert!(!store.has_more());

    assert!(store.submit("r", Some(CommentId(1))).await);
    assert_eq!(store.total(), 3);
    assert!(!store.has_more());
    assert!(!store.load_more().await);
    assert_eq!(h.transport.request_count(), 2);
}

#[tokio::test]
async fn empty_content_is_rejected_locally() {
    let h = Harness::new();
    let (store, _) = store(&h, true);

    assert!(!store.submit("   ", None).await);
    assert_eq!(h.transport.request_count(), 0);
    assert!(h.notice_is(NoticeLevel::Warning, "请输入评论内容"));
}

#[tokio::test]
async fn reply_is_prepended_under_parent() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/",
        json!({ "id": 20, "parent_id": 2, "content": "new", "video_id": 7 }),
    );

    assert!(store.submit("new", Some(CommentId(2))).await);

    let items = store.items();
    let two = tree::find(&items, CommentId(2)).unwrap();
    assert_eq!(ids(&two.replies), vec![20, 3]);
    assert_eq!(two.reply_count, 2);
    assert_eq!(two.replies[0].video_id, VideoId(42));
    assert_eq!(store.total(), 6);
    assert!(h.notice_is(NoticeLevel::Success, "回复成功！"));
}

#[tokio::test]
async fn root_comment_is_prepended() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport
        .mock_ok(HttpMethod::Post, "/comment/", json!({ "id": 21, "content": "top" }));

    assert!(store.submit("top", None).await);

    let items = store.items();
    assert_eq!(ids(&items), vec![21, 1, 5]);
    assert_eq!(items[1].reply_count, 2);
    assert_eq!(tree::find(&items, CommentId(2)).unwrap().reply_count, 1);
    assert_eq!(store.total(), 6);
    assert!(h.notice_is(NoticeLevel::Success, "评论成功！"));
}

#[tokio::test]
async fn submit_failure_notifies() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport
        .mock_response(HttpMethod::Post, "/comment/", 500, json!({}));

    assert!(!store.submit("x", None).await);
    assert_eq!(store.total(), 5);
    assert!(h.notice_is(NoticeLevel::Error, "评论失败"));
}

#[tokio::test]
async fn like_overwrites_counts_of_target_only() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/3/like",
        json!({ "success": true, "like_count": 8, "dislike_count": 2 }),
    );

    assert!(store.like(CommentId(3)).await);

    let items = store.items();
    let three = tree::find(&items, CommentId(3)).unwrap();
    assert_eq!((three.like_count, three.dislike_count), (8, 2));
    for other in [1, 2, 4, 5] {
        assert_eq!(tree::find(&items, CommentId(other)).unwrap().like_count, 0);
    }
    assert!(h.notice_is(NoticeLevel::Success, "点赞成功！"));
    assert!(h.transport.last_request().unwrap().body.is_none());
}

#[tokio::test]
async fn reaction_without_success_flag_still_applies() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/5/dislike",
        json!({ "like_count": 0, "dislike_count": 4 }),
    );

    assert!(store.dislike(CommentId(5)).await);
    assert_eq!(store.items()[1].dislike_count, 4);
    assert!(h.notice_is(NoticeLevel::Success, "踩成功！"));
}

#[tokio::test]
async fn reaction_with_false_success_leaves_counts() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/5/like",
        json!({ "success": false, "like_count": 99, "dislike_count": 99 }),
    );

    store.like(CommentId(5)).await;
    assert_eq!(store.items()[1].like_count, 0);
}

#[tokio::test]
async fn duplicate_reaction_in_flight_is_ignored() {
    let h = Harness::yielding();
    h.transport.mock_ok(HttpMethod::Get, LIST, page(nested(), 5));
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/1/like",
        json!({ "like_count": 1, "dislike_count": 0 }),
    );
    let (store, _) = store(&h, true);
    store.load(true).await;

    let (a, b) = futures::join!(store.like(CommentId(1)), store.like(CommentId(1)));
    assert!(a);
    assert!(!b);
    assert_eq!(h.transport.requests_to(HttpMethod::Post, "/comment/1/like").len(), 1);

    // 完成后可以再次操作
    assert!(store.like(CommentId(1)).await);
}

#[tokio::test]
async fn abandoned_reaction_releases_comment() {
    use futures::FutureExt;

    let h = Harness::yielding();
    h.transport.mock_ok(HttpMethod::Get, LIST, page(nested(), 5));
    h.transport.mock_ok(
        HttpMethod::Post,
        "/comment/1/like",
        json!({ "like_count": 4, "dislike_count": 0 }),
    );
    let (store, _) = store(&h, true);
    store.load(true).await;

    // 请求发出后在回复前丢弃
    assert!(store.like(CommentId(1)).now_or_never().is_none());
    assert_eq!(h.transport.requests_to(HttpMethod::Post, "/comment/1/like").len(), 1);

    assert!(store.like(CommentId(1)).await);
    assert_eq!(h.transport.requests_to(HttpMethod::Post, "/comment/1/like").len(), 2);
    assert_eq!(store.items()[0].like_count, 4);
}

#[tokio::test]
async fn reaction_transport_error_notifies() {
    let h = Harness::new();
    let store = loaded(&h).await;

    assert!(!store.like(CommentId(1)).await);
    assert!(h.notice_is(NoticeLevel::Error, "操作失败"));
}

#[tokio::test]
async fn delete_nested_reply() {
    let h = Harness::new();
    h.transport.mock_ok(HttpMethod::Get, LIST, page(nested(), 5));
    h.transport.mock_ok(HttpMethod::Delete, "/comment/3", Value::Null);
    let (store, confirm) = store(&h, true);
    store.load(true).await;

    assert!(store.delete(CommentId(3)).await);

    let items = store.items();
    assert!(tree::find(&items, CommentId(3)).is_none());
    assert_eq!(tree::find(&items, CommentId(2)).unwrap().reply_count, 0);
    assert_eq!(store.total(), 4);
    assert_eq!(confirm.asked(), vec!["确定要删除这条评论吗？"]);
    assert!(h.notice_is(NoticeLevel::Success, "删除成功！"));
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let h = Harness::new();
    h.transport.mock_ok(HttpMethod::Get, LIST, page(nested(), 5));
    let (store, _) = store(&h, false);
    store.load(true).await;

    assert!(!store.delete(CommentId(1)).await);
    assert_eq!(h.transport.request_count(), 1);
    assert_eq!(store.total(), 5);
}

#[tokio::test]
async fn delete_business_failure_keeps_node() {
    let h = Harness::new();
    let store = loaded(&h).await;
    h.transport.mock_response(
        HttpMethod::Delete,
        "/comment/5",
        200,
        json!({ "code": 403, "msg": "无权删除", "success": false, "data": null }),
    );

    assert!(!store.delete(CommentId(5)).await);
    assert_eq!(ids(&store.items()), vec![1, 5]);
    assert_eq!(store.total(), 5);
    assert!(h.notice_is(NoticeLevel::Error, "无权删除"));
}

#[tokio::test]
async fn total_never_goes_negative() {
    let h = Harness::new();
    h.transport.mock_ok(HttpMethod::Get, LIST, page(json!([{ "id": 1 }]), 0));
    h.transport.mock_ok(HttpMethod::Delete, "/comment/1", Value::Null);
    let (store, _) = store(&h, true);
    store.load(true).await;

    assert!(store.delete(CommentId(1)).await);
    assert_eq!(store.total(), 0);
    assert!(store.items().is_empty());
}
