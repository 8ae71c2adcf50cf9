use super::*;

fn test_client(base_url: &str) -> YoutubeClient {
    let keys = ApiKeyPool::new(["test-key"]).expect("pool");
    YoutubeClient::with_base_url(keys, ClientSettings::default(), base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_endpoint_params_and_key() {
    let client = test_client("https://www.googleapis.com/youtube/v3");
    let url = client
        .build_url("videos", &[("chart", "mostPopular"), ("regionCode", "US")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://www.googleapis.com/youtube/v3/videos?chart=mostPopular&regionCode=US&key=test-key"
    );
}

#[test]
fn build_url_tolerates_trailing_slash() {
    let client = test_client("http://localhost:1234/");
    let url = client.build_url("channels", &[("id", "a,b")]).unwrap();
    assert_eq!(url.path(), "/channels");
    assert!(url.as_str().contains("id=a%2Cb"), "ids should be encoded: {url}");
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let keys = ApiKeyPool::new(["k"]).unwrap();
    let err = YoutubeClient::with_base_url(keys, ClientSettings::default(), "not a url").unwrap_err();
    assert!(matches!(err, YoutubeError::Config(_)));
}

#[test]
fn quota_envelope_maps_to_quota_exceeded() {
    let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded","message":"quota"}]}}"#;
    assert!(matches!(
        api_error(StatusCode::FORBIDDEN, body),
        YoutubeError::QuotaExceeded(_)
    ));
}

#[test]
fn other_envelopes_map_to_api_error() {
    let body = r#"{"error":{"code":404,"message":"chart not found","errors":[{"reason":"notFound"}]}}"#;
    match api_error(StatusCode::NOT_FOUND, body) {
        YoutubeError::Api {
            status,
            reason,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "notFound");
            assert_eq!(message, "chart not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn forbidden_without_quota_reason_is_api_error() {
    let body = r#"{"error":{"code":403,"message":"forbidden","errors":[{"reason":"forbidden"}]}}"#;
    assert!(matches!(
        api_error(StatusCode::FORBIDDEN, body),
        YoutubeError::Api { status: 403, .. }
    ));
}

#[test]
fn non_json_error_body_is_kept_as_message() {
    match api_error(StatusCode::BAD_REQUEST, "plain text") {
        YoutubeError::Api { reason, message, .. } => {
            assert_eq!(reason, "unknown");
            assert_eq!(message, "plain text");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn settings_follow_app_config() {
    let lookup = |_: &str| Err(std::env::VarError::NotPresent);
    let config = trendscope_core::build_app_config(lookup).expect("defaults");
    let settings = ClientSettings::from_config(&config);
    assert_eq!(settings, ClientSettings::default());
}
