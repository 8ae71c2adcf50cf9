use std::collections::BTreeMap;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::{Duration as ChronoDuration, NaiveDate};
use tower::ServiceExt;
use trendscope_core::{ChannelProfile, ChannelSnapshot, RollupError};

use super::*;

async fn temp_app() -> (tempfile::TempDir, Store, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(dir.path()).await.expect("open store");
    let app = build_app(
        AppState {
            store: store.clone(),
        },
        default_rate_limit_state(),
    );
    (dir, store, app)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn profile(id: &str, subscribers: u64, views: u64, created_days_ago: Option<i64>) -> ChannelProfile {
    ChannelProfile {
        channel_id: id.to_string(),
        title: format!("title {id}"),
        description: None,
        published_at: created_days_ago.map(|d| Utc::now() - ChronoDuration::days(d)),
        channel_url: format!("https://www.youtube.com/channel/{id}"),
        thumbnail: None,
        subscribers,
        views,
        videos: 1,
    }
}

fn snap(id: &str, subscribers: u64, day: u32) -> ChannelSnapshot {
    ChannelSnapshot {
        channel_id: id.to_string(),
        channel_title: format!("title {id}"),
        count: 1,
        subscribers,
        views_total: subscribers * 10,
        videos_total: 3,
        last_seen: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        created_at: None,
        custom_url: None,
    }
}

#[derive(Debug)]
struct SeedError;

impl From<StoreError> for SeedError {
    fn from(_: StoreError) -> Self {
        SeedError
    }
}

impl From<RollupError> for SeedError {
    fn from(_: RollupError) -> Self {
        SeedError
    }
}

async fn seed_history(store: &Store, id: &str, points: &[(u32, u64)]) {
    for &(day, subscribers) in points {
        store
            .modify_history::<_, SeedError, _>(id, |h| Ok(h.apply(&snap(id, subscribers, day))?))
            .await
            .expect("seed history");
    }
}

#[test]
fn api_error_not_found_maps_to_404() {
    let response = ApiError::not_found("req-1", "missing").into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn invalid_key_maps_to_not_found() {
    let error = map_store_error("req-1".into(), &StoreError::InvalidKey("a/b".into()));
    assert_eq!(error.error.code, "not_found");
}

#[tokio::test]
async fn index_lists_routes() {
    let (_dir, _store, app) = temp_app().await;
    let (status, json) = get_json(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["routes"].as_array().map(Vec::len), Some(ROUTES.len()));
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn health_reports_ok_for_live_store() {
    let (_dir, _store, app) = temp_app().await;
    let (status, json) = get_json(app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["store"], "ok");
}

#[tokio::test]
async fn health_degrades_when_data_dir_is_gone() {
    let (dir, _store, app) = temp_app().await;
    std::fs::remove_dir_all(dir.path()).expect("remove data dir");
    let (status, json) = get_json(app, "/api/v1/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["status"], "degraded");
}

#[tokio::test]
async fn channels_without_data_is_not_found() {
    let (_dir, _store, app) = temp_app().await;
    let (status, json) = get_json(app, "/api/v1/channels").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn channels_are_deduplicated_and_sorted() {
    let (_dir, store, app) = temp_app().await;
    store
        .modify_directory("AE", |p| {
            p.push(profile("a", 10, 900, None));
            p.push(profile("b", 50, 100, None));
        })
        .await
        .unwrap();
    store
        .modify_directory("US", |p| p.push(profile("a", 999, 999, None)))
        .await
        .unwrap();

    let (status, json) = get_json(app.clone(), "/api/v1/channels").await;
    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["channel_id"], "b");
    assert_eq!(data[1]["subscribers"], 10, "first region's record wins");

    let (_, json) = get_json(app.clone(), "/api/v1/channels?sort=views").await;
    assert_eq!(json["data"][0]["channel_id"], "a");

    let (_, json) = get_json(app, "/api/v1/channels?sort=likes").await;
    assert_eq!(json["data"][0]["channel_id"], "b", "unknown sort falls back to subscribers");
}

#[tokio::test]
async fn channels_filter_by_creation_window() {
    let (_dir, store, app) = temp_app().await;
    store
        .modify_directory("US", |p| {
            p.push(profile("fresh", 1, 1, Some(3)));
            p.push(profile("older", 2, 2, Some(45)));
            p.push(profile("undated", 3, 3, None));
        })
        .await
        .unwrap();

    let (_, json) = get_json(app.clone(), "/api/v1/channels?date=week").await;
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["channel_id"].as_str())
        .collect();
    assert_eq!(ids, vec!["fresh"]);

    let (_, json) = get_json(app.clone(), "/api/v1/channels?date=90days").await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(2));

    let (_, json) = get_json(app, "/api/v1/channels?date=decade").await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(3), "unknown window means no filter");
}

#[tokio::test]
async fn history_returns_stored_rollups() {
    let (_dir, store, app) = temp_app().await;
    seed_history(&store, "UC1", &[(15, 1000), (20, 1200)]).await;

    let (status, json) = get_json(app, "/api/v1/channels/UC1/history").await;
    assert_eq!(status, StatusCode::OK);
    let monthly = &json["data"]["history"]["monthly"][0];
    assert_eq!(monthly["month"], "2024-03");
    assert_eq!(monthly["subscribers_start"], 1000);
    assert_eq!(monthly["subscribers_end"], 1200);
    assert_eq!(monthly["subscribers_growth"], 200);
    assert_eq!(json["data"]["history"]["daily"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn history_for_unknown_or_malformed_channel_is_not_found() {
    let (_dir, _store, app) = temp_app().await;
    let (status, _) = get_json(app.clone(), "/api/v1/channels/UC404/history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get_json(app, "/api/v1/channels/bad.id/history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn growth_compares_last_two_days() {
    let (_dir, store, app) = temp_app().await;
    seed_history(&store, "UC1", &[(15, 1000), (20, 1200)]).await;

    let (status, json) = get_json(app, "/api/v1/channels/UC1/growth").await;
    assert_eq!(status, StatusCode::OK);
    let growth = &json["data"]["growth"];
    assert_eq!(growth["date_prev"], "2024-03-15");
    assert_eq!(growth["date_curr"], "2024-03-20");
    assert_eq!(growth["subscribers"]["growth_percent"], 20.0);
}

#[tokio::test]
async fn growth_is_null_with_one_day() {
    let (_dir, store, app) = temp_app().await;
    seed_history(&store, "UC1", &[(15, 1000)]).await;

    let (status, json) = get_json(app, "/api/v1/channels/UC1/growth").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["growth"].is_null());
    assert_eq!(json["data"]["channel_title"], "title UC1");
}

#[tokio::test]
async fn hashtags_sorted_by_popularity_with_limit() {
    let (_dir, store, app) = temp_app().await;
    store
        .modify_hashtags(|t| {
            t.merge(&BTreeMap::from([
                ("music".to_string(), 40.0),
                ("gaming".to_string(), 12.5),
                ("news".to_string(), 30.0),
            ]))
        })
        .await
        .unwrap();

    let (status, json) = get_json(app.clone(), "/api/v1/hashtags").await;
    assert_eq!(status, StatusCode::OK);
    let tags: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|h| h["tag"].as_str())
        .collect();
    assert_eq!(tags, vec!["music", "news", "gaming"]);

    let (_, json) = get_json(app, "/api/v1/hashtags?limit=1").await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["data"][0]["popularity"], 40.0);
}

#[tokio::test]
async fn hashtags_without_table_is_not_found() {
    let (_dir, _store, app) = temp_app().await;
    let (status, _) = get_json(app, "/api/v1/hashtags").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
