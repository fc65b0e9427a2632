use super::*;
use crate::events::EventKind;
use crate::notify::NoticeLevel;
use crate::test_support::Harness;
use crate::web::confirm::FixedConfirm;
use serde_json::{Value, json};
use std::sync::Mutex;
use yun_shared::UserProfile;
use yun_shared::protocol::HttpMethod;

const DETAIL: &str = "/video/detail/42";
const LIKE: &str = "/interaction/like";
const COLLECT: &str = "/interaction/collection";
const FOLLOW: &str = "/user/follow";

struct Fixture {
    h: Harness,
    store: VideoDetailStore,
    session: SessionStore,
    ledger: InteractionLedger,
    confirm: Arc<FixedConfirm>,
}

fn fixture(h: Harness, confirm: bool) -> Fixture {
    let session = SessionStore::new(h.api.clone(), h.events.clone());
    let ledger = InteractionLedger::new();
    let confirm = Arc::new(FixedConfirm::new(confirm));
    let store = VideoDetailStore::new(
        VideoId(42),
        h.api.clone(),
        session.clone(),
        ledger,
        h.events.clone(),
        confirm.clone(),
    );
    Fixture {
        h,
        store,
        session,
        ledger,
        confirm,
    }
}

fn detail(liked: bool, likes: u64, followed: bool) -> Value {
    json!({
        "id": 42,
        "title": "clip",
        "cover_image": "/static/c.jpg",
        "file_path": "static/v.mp4",
        "like_count": likes,
        "collect_count": 3,
        "comment_count": 7,
        "is_liked": liked,
        "is_collected": false,
        "uploader": {
            "id": 9,
            "username": "up",
            "avatar": "/static/a.png",
            "is_followed": followed,
            "is_mutual": false,
            "is_follower": false
        }
    })
}

async fn loaded(confirm: bool, body: Value) -> Fixture {
    let f = fixture(Harness::new(), confirm);
    f.h.transport.mock_ok(HttpMethod::Get, DETAIL, body);
    f.store.load_detail().await.unwrap();
    f
}

fn sign_in_as(session: &SessionStore, id: u64) {
    session.state().update(|s| {
        s.user = Some(UserProfile {
            id: UserId(id),
            ..Default::default()
        })
    });
}

fn record(bus: &EventBus, kind: EventKind) -> Arc<Mutex<Vec<AppEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.subscribe(kind, move |e| sink.lock().unwrap().push(e.clone()));
    seen
}

// =========================================================
// 加载
// =========================================================

#[tokio::test]
async fn detail_sets_interaction_flags_and_urls() {
    let f = loaded(true, detail(true, 10, true)).await;

    let flags = f.store.interaction();
    assert!(flags.is_liked);
    assert!(!flags.is_favorited);
    assert!(flags.is_followed);
    assert_eq!(f.store.like_count(), 10);
    assert_eq!(f.store.favorite_count(), 3);
    assert_eq!(f.store.comment_count(), 7);
    assert_eq!(f.store.preview_url(), "http://api.test/static/c.jpg");
    assert_eq!(f.store.source_url(), "http://api.test/static/v.mp4");
    assert_eq!(
        f.store.author().unwrap().profile_picture.as_deref(),
        Some("http://api.test/static/a.png")
    );
    assert!(f.ledger.is_liked(VideoId(42)));
    assert!(!f.store.is_loading());
}

#[tokio::test]
async fn detail_business_failure_is_error() {
    let f = fixture(Harness::new(), true);
    f.h.transport.mock_response(
        HttpMethod::Get,
        DETAIL,
        200,
        json!({ "code": 404, "msg": "视频不存在", "success": false, "data": null }),
    );

    let err = f.store.load_detail().await.unwrap_err();
    assert_eq!(err.message(), "视频不存在");
    assert!(f.store.video().is_none());
    assert!(!f.store.is_loading());
}

#[tokio::test]
async fn detail_without_data_is_error() {
    let f = fixture(Harness::new(), true);
    f.h.transport.mock_ok(HttpMethod::Get, DETAIL, Value::Null);

    assert!(f.store.load_detail().await.is_err());
}

// =========================================================
// 点赞 / 收藏
// =========================================================

#[tokio::test]
async fn like_applies_server_counts_and_emits() {
    let f = loaded(true, detail(false, 10, false)).await;
    let seen = record(&f.h.events, EventKind::VideoLiked);
    f.h.transport
        .mock_ok(HttpMethod::Post, LIKE, json!({ "is_liked": true, "like_count": 15 }));

    assert!(f.store.like().await);

    assert!(f.store.interaction().is_liked);
    assert_eq!(f.store.like_count(), 15);
    assert!(f.ledger.is_liked(VideoId(42)));
    assert!(f.h.notice_is(NoticeLevel::Success, "点赞成功"));
    let req = f.h.transport.last_request().unwrap();
    let body: Value = serde_json::from_str(req.body_text().unwrap()).unwrap();
    assert_eq!(body, json!({ "video_id": 42 }));
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[AppEvent::VideoLiked {
            video_id: VideoId(42),
            liked: true,
            like_count: 15
        }]
    );
}

#[tokio::test]
async fn like_is_applied_before_the_reply_arrives() {
    let f = fixture(Harness::yielding(), true);
    f.h.transport
        .mock_ok(HttpMethod::Get, DETAIL, detail(false, 10, false));
    f.store.load_detail().await.unwrap();
    f.h.transport
        .mock_ok(HttpMethod::Post, LIKE, json!({ "is_liked": true, "like_count": 20 }));

    // like 在传输层让出后才轮到 observe
    let observe = async { (f.store.interaction().is_liked, f.store.like_count()) };
    let (done, pending) = futures::join!(f.store.like(), observe);

    assert!(done);
    assert_eq!(pending, (true, 11));
    assert_eq!(f.store.like_count(), 20);
}

#[tokio::test]
async fn like_rolls_back_on_transport_error() {
    let f = loaded(true, detail(true, 10, false)).await;
    f.h.transport.mock_response(HttpMethod::Post, LIKE, 500, json!({}));

    assert!(!f.store.like().await);

    assert!(f.store.interaction().is_liked);
    assert_eq!(f.store.like_count(), 10);
    assert!(f.store.video().unwrap().is_liked);
    assert!(f.ledger.is_liked(VideoId(42)));
    assert!(f.h.notice_is(NoticeLevel::Error, "操作失败"));
}

#[tokio::test]
async fn favorite_rolls_back_on_business_failure() {
    let f = loaded(true, detail(false, 10, false)).await;
    let seen = record(&f.h.events, EventKind::VideoCollected);
    f.h.transport.mock_response(
        HttpMethod::Post,
        COLLECT,
        200,
        json!({ "code": 500, "msg": "busy", "success": false, "data": null }),
    );

    assert!(!f.store.favorite().await);

    assert!(!f.store.interaction().is_favorited);
    assert_eq!(f.store.favorite_count(), 3);
    assert!(!f.ledger.is_collected(VideoId(42)));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unfavorite_mirrors_ledger() {
    let mut body = detail(false, 10, false);
    body["is_collected"] = json!(true);
    let f = loaded(true, body).await;
    assert!(f.ledger.is_collected(VideoId(42)));
    f.h.transport.mock_ok(
        HttpMethod::Post,
        COLLECT,
        json!({ "is_collected": false, "collect_count": 2 }),
    );

    assert!(f.store.favorite().await);

    assert!(!f.store.interaction().is_favorited);
    assert_eq!(f.store.favorite_count(), 2);
    assert!(!f.ledger.is_collected(VideoId(42)));
    assert!(f.h.notice_is(NoticeLevel::Success, "取消收藏"));
}

#[tokio::test]
async fn duplicate_like_in_flight_is_ignored() {
    let f = fixture(Harness::yielding(), true);
    f.h.transport
        .mock_ok(HttpMethod::Get, DETAIL, detail(false, 10, false));
    f.store.load_detail().await.unwrap();
    f.h.transport
        .mock_ok(HttpMethod::Post, LIKE, json!({ "is_liked": true, "like_count": 11 }));

    let (a, b) = futures::join!(f.store.like(), f.store.like());
    assert!(a);
    assert!(!b);
    assert_eq!(f.h.transport.requests_to(HttpMethod::Post, LIKE).len(), 1);
    assert_eq!(f.store.like_count(), 11);
}

#[tokio::test]
async fn like_without_video_does_nothing() {
    let f = fixture(Harness::new(), true);

    assert!(!f.store.like().await);
    assert_eq!(f.h.transport.request_count(), 0);
}

// =========================================================
// 关注
// =========================================================

#[tokio::test]
async fn follow_updates_flags_stats_and_emits() {
    let f = loaded(true, detail(false, 0, false)).await;
    sign_in_as(&f.session, 1);
    let seen = record(&f.h.events, EventKind::FollowUpdated);
    f.h.transport.mock_ok(
        HttpMethod::Post,
        FOLLOW,
        json!({
            "is_followed": true, "is_mutual": false, "is_follower": false,
            "following_count": 4, "follower_count": 12
        }),
    );

    assert!(f.store.follow().await);

    assert!(f.confirm.asked().is_empty());
    assert!(f.store.interaction().is_followed);
    assert!(f.store.author().unwrap().is_followed);
    assert_eq!(f.session.user().unwrap().following_count, 4);
    assert!(f.h.notice_is(NoticeLevel::Success, "关注成功！"));

    let events = seen.lock().unwrap();
    let AppEvent::FollowUpdated(update) = &events[0] else {
        panic!("expected follow event");
    };
    assert!(update.followed);
    assert_eq!(update.current_user_id, Some(UserId(1)));
    assert_eq!(update.target_user_id, UserId(9));
}

#[tokio::test]
async fn follow_back_becomes_mutual() {
    let f = loaded(true, detail(false, 0, false)).await;
    f.h.transport.mock_ok(
        HttpMethod::Post,
        FOLLOW,
        json!({ "is_followed": true, "is_mutual": true, "is_follower": true }),
    );

    assert!(f.store.follow().await);
    assert!(f.store.interaction().is_mutual);
    assert!(f.h.notice_is(NoticeLevel::Success, "互相关注成功！"));
}

#[tokio::test]
async fn unfollow_requires_confirmation() {
    let f = loaded(false, detail(false, 0, true)).await;

    assert!(!f.store.follow().await);

    assert_eq!(f.confirm.asked(), vec!["确定要取消关注该用户吗？"]);
    assert!(f.h.transport.requests_to(HttpMethod::Post, FOLLOW).is_empty());
    assert!(f.store.interaction().is_followed);
}

#[tokio::test]
async fn confirmed_unfollow_clears_flags() {
    let f = loaded(true, detail(false, 0, true)).await;
    f.h.transport.mock_ok(
        HttpMethod::Post,
        FOLLOW,
        json!({ "is_followed": false, "is_mutual": false, "is_follower": false }),
    );

    assert!(f.store.follow().await);
    assert!(!f.store.interaction().is_followed);
    assert!(f.h.notice_is(NoticeLevel::Info, "已取消关注"));
}

#[tokio::test]
async fn own_video_cannot_be_followed() {
    let f = loaded(true, detail(false, 0, false)).await;
    sign_in_as(&f.session, 9);

    assert!(f.store.is_self());
    assert_eq!(f.store.author_profile_path().as_deref(), Some("/user/profile"));
    assert!(!f.store.follow().await);
    assert!(f.h.transport.requests_to(HttpMethod::Post, FOLLOW).is_empty());
}

#[tokio::test]
async fn other_author_profile_path() {
    let f = loaded(true, detail(false, 0, false)).await;
    sign_in_as(&f.session, 1);

    assert!(!f.store.is_self());
    assert_eq!(f.store.author_profile_path().as_deref(), Some("/user/9"));
}

// =========================================================
// 观看记录 / 互动记录
// =========================================================

#[tokio::test]
async fn record_view_posts_duration() {
    let f = fixture(Harness::new(), true);
    f.h.transport
        .mock_ok(HttpMethod::Post, "/analytics/log_video_view", Value::Null);

    f.store.record_view(Some(30)).await.unwrap();

    let req = f.h.transport.last_request().unwrap();
    let body: Value = serde_json::from_str(req.body_text().unwrap()).unwrap();
    assert_eq!(body, json!({ "video_id": 42, "watch_duration": 30 }));
}

#[test]
fn ledger_tracks_membership() {
    let ledger = InteractionLedger::new();
    ledger.set_liked(VideoId(1), true);
    ledger.set_liked(VideoId(1), true);
    ledger.set_collected(VideoId(2), true);
    assert!(ledger.is_liked(VideoId(1)));
    assert!(!ledger.is_liked(VideoId(2)));

    ledger.set_liked(VideoId(1), false);
    assert!(!ledger.is_liked(VideoId(1)));
    assert!(ledger.is_collected(VideoId(2)));
}
