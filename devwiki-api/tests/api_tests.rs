//! Integration tests for devwiki-api HTTP endpoints
//!
//! Every test builds the router over a fresh SQLite file and drives it with
//! `oneshot`, one request at a time.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use devwiki_api::{build_router, AppState};
use devwiki_common::db::SqliteStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app over a temp database; keep the TempDir alive
async fn setup_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("devwiki.db"))
        .await
        .expect("Should open test database");
    let app = build_router(AppState::new(Arc::new(store)));
    (dir, app)
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request and return status plus parsed JSON body
async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

async fn create_tag(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, json_request("POST", "/tags", json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn create_video(app: &Router, youtube_id: &str) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/videos",
            json!({ "youtubeId": youtube_id, "title": "Intro to async Rust" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

fn vote_body(user_id: i64, entity_type: &str, entity_id: i64, vote_type: &str) -> Value {
    json!({
        "userId": user_id,
        "entityType": entity_type,
        "entityId": entity_id,
        "voteType": vote_type,
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "devwiki-api");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
}

// =============================================================================
// Votes
// =============================================================================

#[tokio::test]
async fn test_create_vote_then_conflict() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, json_request("POST", "/votes", vote_body(1, "tutorial", 5, "up"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userId"], 1);
    assert_eq!(body["entityType"], "tutorial");
    assert_eq!(body["voteType"], "up");
    assert!(body["createdAt"].is_string());

    let (status, body) = send(&app, json_request("POST", "/votes", vote_body(1, "tutorial", 5, "down"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "user already voted on this entity");
}

#[tokio::test]
async fn test_change_vote_toggle_cycle() {
    let (_dir, app) = setup_app().await;

    let (status, created) = send(&app, json_request("POST", "/votes/change", vote_body(2, "video", 9, "up"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["voteType"], "up");

    let (_, switched) = send(&app, json_request("POST", "/votes/change", vote_body(2, "video", 9, "down"))).await;
    assert_eq!(switched["id"], created["id"]);
    assert_eq!(switched["voteType"], "down");

    let (status, removed) = send(&app, json_request("POST", "/votes/change", vote_body(2, "video", 9, "down"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, json!({ "removed": true }));

    let (status, _) = send(&app, request("GET", "/votes/user/2/entity/video/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_counts_endpoint() {
    let (_dir, app) = setup_app().await;

    for (user, vote_type) in [(1, "up"), (2, "up"), (3, "down")] {
        send(&app, json_request("POST", "/votes", vote_body(user, "product", 4, vote_type))).await;
    }

    let (status, body) = send(&app, request("GET", "/votes/entity/product/4/counts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "upvotes": 2, "downvotes": 1 }));

    let (_, listed) = send(&app, request("GET", "/votes/entity/product/4")).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_vote_lookup_update_and_delete() {
    let (_dir, app) = setup_app().await;

    let (_, vote) = send(&app, json_request("POST", "/votes", vote_body(3, "video", 1, "up"))).await;
    let id = vote["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, request("GET", &format!("/votes/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);

    let (status, updated) = send(
        &app,
        json_request("PATCH", &format!("/votes/{}", id), json!({ "voteType": "down" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["voteType"], "down");

    let (_, by_user) = send(&app, request("GET", "/votes/user/3")).await;
    assert_eq!(by_user.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, request("DELETE", &format!("/votes/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "deleted": true }));

    let (status, body) = send(&app, request("DELETE", &format!("/votes/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "vote not found");
}

#[tokio::test]
async fn test_remove_user_vote_on_entity() {
    let (_dir, app) = setup_app().await;
    send(&app, json_request("POST", "/votes", vote_body(6, "tutorial", 2, "down"))).await;

    let (status, _) = send(&app, request("GET", "/votes/user/6/entity/tutorial/2")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request("DELETE", "/votes/user/6/entity/tutorial/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = send(&app, request("DELETE", "/votes/user/6/entity/tutorial/2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_vote_paths_and_bodies_are_400() {
    let (_dir, app) = setup_app().await;

    let (status, body) = send(&app, request("GET", "/votes/entity/course/1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("course"));

    let (status, body) = send(&app, request("GET", "/votes/entity/video/abc/counts")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid entity id");

    let (status, _) = send(&app, request("GET", "/votes/xyz")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, json_request("POST", "/votes", json!({ "userId": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, json_request("POST", "/votes", vote_body(1, "video", 1, "sideways"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Tags
// =============================================================================

#[tokio::test]
async fn test_tag_crud() {
    let (_dir, app) = setup_app().await;

    let (status, tag) = send(
        &app,
        json_request("POST", "/tags", json!({ "name": "  Rust ", "description": "systems" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tag["name"], "rust");
    let id = tag["id"].as_i64().unwrap();

    let (status, body) = send(&app, json_request("POST", "/tags", json!({ "name": "RUST" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "tag with this name already exists");

    let (status, by_name) = send(&app, request("GET", "/tags/name/Rust")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name["id"], id);

    let (status, cleared) = send(
        &app,
        json_request("PATCH", &format!("/tags/{}", id), json!({ "description": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared.get("description").is_none());
    assert_eq!(cleared["name"], "rust");

    let (status, _) = send(&app, request("DELETE", &format!("/tags/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, request("GET", &format!("/tags/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "tag not found");
}

#[tokio::test]
async fn test_tag_name_validation() {
    let (_dir, app) = setup_app().await;

    let (status, _) = send(&app, json_request("POST", "/tags", json!({ "name": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "x".repeat(51);
    let (status, _) = send(&app, json_request("POST", "/tags", json!({ "name": long }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tag_search_endpoint() {
    let (_dir, app) = setup_app().await;
    for name in ["java", "javascript", "jazz", "go"] {
        create_tag(&app, name).await;
    }

    let (status, page) = send(&app, request("GET", "/tags/search?q=JA&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["java", "javascript"]);
    assert_eq!(page["nextCursor"], "javascript");

    let (_, rest) = send(&app, request("GET", "/tags/search?q=ja&limit=2&cursor=javascript")).await;
    assert_eq!(rest["items"].as_array().unwrap().len(), 1);
    assert_eq!(rest["items"][0]["name"], "jazz");
    assert!(rest["nextCursor"].is_null());

    let (_, short) = send(&app, request("GET", "/tags/search?q=j")).await;
    assert_eq!(short, json!({ "items": [], "nextCursor": null }));

    let (_, one_char) = send(&app, request("GET", "/tags/search?q=g&minChars=1")).await;
    assert_eq!(one_char["items"][0]["name"], "go");
}

#[tokio::test]
async fn test_tag_search_blank_parameters_use_defaults() {
    let (_dir, app) = setup_app().await;
    for name in ["java", "javascript", "jazz"] {
        create_tag(&app, name).await;
    }

    let (status, page) =
        send(&app, request("GET", "/tags/search?q=ja&limit=&cursor=&minChars=")).await;
    assert_eq!(status, StatusCode::OK, "{}", page);
    assert_eq!(page["items"].as_array().unwrap().len(), 3);
    assert!(page["nextCursor"].is_null());

    let (status, _) = send(&app, request("GET", "/tags/search?q=ja&limit=ten")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Videos and video tags
// =============================================================================

#[tokio::test]
async fn test_video_registry() {
    let (_dir, app) = setup_app().await;
    let id = create_video(&app, "dQw4w9WgXcQ").await;

    let (status, video) = send(&app, request("GET", &format!("/videos/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(video["youtubeId"], "dQw4w9WgXcQ");

    let (status, _) = send(
        &app,
        json_request("POST", "/videos", json!({ "youtubeId": "dQw4w9WgXcQ", "title": "again" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, request("GET", "/videos/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "video not found");
}

#[tokio::test]
async fn test_upsert_video_tags_endpoint() {
    let (_dir, app) = setup_app().await;
    let video = create_video(&app, "v1").await;
    let t1 = create_tag(&app, "one").await;
    let t2 = create_tag(&app, "two").await;
    let t3 = create_tag(&app, "three").await;
    let t4 = create_tag(&app, "four").await;
    let uri = format!("/videos/{}/tags", video);

    let (status, _) = send(&app, json_request("PATCH", &uri, json!({ "tagIds": [t1, t2, t3] }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, tags) = send(&app, json_request("PATCH", &uri, json!({ "tagIds": [t2, t3, t4, t4] }))).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<i64> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![t2, t3, t4]);

    let (_, listed) = send(&app, request("GET", &uri)).await;
    assert_eq!(listed, tags);

    let (status, body) = send(&app, json_request("PATCH", &uri, json!({ "tagIds": [t1, 424242] }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "one or more tags not found");

    let (status, _) = send(&app, json_request("PATCH", "/videos/9999/tags", json!({ "tagIds": [] }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attach_and_detach_single_tag() {
    let (_dir, app) = setup_app().await;
    let video = create_video(&app, "v2").await;
    let tag = create_tag(&app, "tokio").await;

    let attach = || {
        Request::builder()
            .method("POST")
            .uri("/video-tags")
            .header("content-type", "application/json")
            .header("X-User-ID", "17")
            .body(Body::from(json!({ "videoId": video, "tagId": tag }).to_string()))
            .unwrap()
    };

    let (status, row) = send(&app, attach()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(row["createdBy"], 17);

    let (status, body) = send(&app, attach()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "mapping already exists");

    let (_, videos) = send(&app, request("GET", &format!("/tags/{}/videos", tag))).await;
    assert_eq!(videos[0]["id"], video);

    let (_, by_name) = send(&app, request("GET", "/tags/name/tokio/videos")).await;
    assert_eq!(by_name.as_array().unwrap().len(), 1);

    let detach_uri = format!("/video-tags/{}/{}", video, tag);
    for _ in 0..2 {
        let (status, body) = send(&app, request("DELETE", &detach_uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "deleted": true }));
    }

    let (status, body) = send(
        &app,
        json_request("POST", "/video-tags", json!({ "videoId": video, "tagId": 5555 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "tag not found");
}
