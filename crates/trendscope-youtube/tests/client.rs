//! Integration tests for `YoutubeClient` using wiremock HTTP mocks.

use trendscope_youtube::{ApiKeyPool, ClientSettings, YoutubeClient, YoutubeError};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_pages: u32) -> ClientSettings {
    ClientSettings {
        max_retries: 2,
        retry_backoff_base_ms: 0,
        max_pages,
        ..ClientSettings::default()
    }
}

fn test_client(base_url: &str, max_pages: u32) -> YoutubeClient {
    let keys = ApiKeyPool::new(["test-key"]).expect("pool");
    YoutubeClient::with_base_url(keys, settings(max_pages), base_url)
        .expect("client construction should not fail")
}

fn video(id: &str, channel: &str, tags: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "kind": "youtube#video",
        "id": id,
        "snippet": {
            "title": format!("video {id}"),
            "tags": tags,
            "channelId": channel,
            "channelTitle": format!("channel {channel}"),
            "categoryId": "10"
        },
        "statistics": {"viewCount": "1000", "likeCount": "5"}
    })
}

#[tokio::test]
async fn list_trending_returns_parsed_videos() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "kind": "youtube#videoListResponse",
        "items": [
            video("v1", "UC1", &["Music", "pop"]),
            video("v2", "UC2", &[]),
            {"id": "broken"}
        ]
    });

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("chart", "mostPopular"))
        .and(query_param("regionCode", "US"))
        .and(query_param("videoCategoryId", "10"))
        .and(query_param("maxResults", "50"))
        .and(query_param("part", "snippet,statistics"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let videos = client
        .list_trending("US", "10")
        .await
        .expect("should parse trending list");

    assert_eq!(videos.len(), 2, "malformed item is dropped");
    assert_eq!(videos[0].video_id, "v1");
    assert_eq!(videos[0].channel_id, "UC1");
    assert_eq!(videos[0].tags, vec!["Music", "pop"]);
    assert_eq!(videos[0].view_count, 1000);
    assert_eq!(videos[0].region, "US");
}

#[tokio::test]
async fn list_trending_follows_page_tokens_up_to_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [video("v1", "UC1", &[])],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [video("v2", "UC2", &[])],
            "nextPageToken": "p3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    let videos = client.list_trending("GB", "24").await.expect("pages");

    let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2"], "third page is beyond max_pages");
}

#[tokio::test]
async fn single_page_setting_ignores_next_page_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [video("v1", "UC1", &[])],
            "nextPageToken": "p2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let videos = client.list_trending("GB", "24").await.expect("page");
    assert_eq!(videos.len(), 1);
}

#[tokio::test]
async fn quota_exceeded_is_not_retried() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": 403,
            "message": "The request cannot be completed because you have exceeded your quota.",
            "errors": [{"reason": "quotaExceeded", "domain": "youtube.quota"}]
        }
    });

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(403).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let err = client.list_trending("US", "10").await.unwrap_err();
    assert!(matches!(err, YoutubeError::QuotaExceeded(_)), "got {err:?}");
}

#[tokio::test]
async fn unavailable_chart_surfaces_api_error() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "error": {
            "code": 404,
            "message": "The requested video chart is not supported or is not available.",
            "errors": [{"reason": "videoChartNotFound"}]
        }
    });

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let err = client.list_trending("JM", "19").await.unwrap_err();
    match err {
        YoutubeError::Api { status, reason, .. } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "videoChartNotFound");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [video("v1", "UC1", &[])]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let videos = client
        .list_trending("US", "10")
        .await
        .expect("should succeed after one retry");
    assert_eq!(videos.len(), 1);
}

#[tokio::test]
async fn channel_metadata_returns_statistics() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [{
            "id": "UC1",
            "snippet": {
                "title": "Channel One",
                "description": "about",
                "publishedAt": "2015-02-01T00:00:00Z",
                "thumbnails": {"high": {"url": "https://img/1.jpg"}}
            },
            "statistics": {
                "subscriberCount": "12000",
                "viewCount": "3400000",
                "videoCount": "210",
                "hiddenSubscriberCount": false
            }
        }]
    });

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UC1,UC2"))
        .and(query_param("part", "snippet,statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let ids = vec!["UC1".to_string(), "UC2".to_string()];
    let metadata = client.channel_metadata(&ids).await.expect("metadata");

    assert_eq!(metadata.len(), 1, "unknown channel is absent");
    assert_eq!(metadata[0].channel_id, "UC1");
    assert_eq!(metadata[0].subscriber_count, 12_000);
    assert_eq!(metadata[0].view_count, 3_400_000);
    assert_eq!(metadata[0].video_count, 210);
    assert!(metadata[0].published_at.is_some());
}

#[tokio::test]
async fn channel_metadata_rejects_oversized_batch_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 1);
    let ids: Vec<String> = (0..51).map(|i| format!("UC{i}")).collect();
    let err = client.channel_metadata(&ids).await.unwrap_err();
    assert!(matches!(
        err,
        YoutubeError::BatchTooLarge {
            requested: 51,
            limit: 50
        }
    ));

    assert!(client.channel_metadata(&[]).await.unwrap().is_empty());
}
