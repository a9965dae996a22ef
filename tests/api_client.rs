use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use botr_api::dto::request::CallParams;
use botr_api::error::BotrError;
use botr_api::http::client::progress::{ProgressCallback, UploadProgress};
use botr_api::types::{ClientConfig, Credentials, TransportKind};
use botr_api::utils::clock::Clock;
use botr_api::utils::gen_id::NonceSource;
use botr_api::{BotrClient, MediaApi, create_client};
use sha1::{Digest, Sha1};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

struct FixedClock(i64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}

struct FixedNonce(u32);

impl NonceSource for FixedNonce {
    fn next_nonce(&self) -> u32 {
        self.0
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config_for(server: &MockServer, transport: TransportKind) -> ClientConfig {
    ClientConfig {
        host: server.uri(),
        transport,
        ..Default::default()
    }
}

fn pinned_client(config: ClientConfig) -> BotrClient {
    BotrClient::with_config(Credentials::new("K", "S"), config)
        .unwrap()
        .with_clock(Arc::new(FixedClock(1000)))
        .with_nonce_source(Arc::new(FixedNonce(1)))
}

fn query_map(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

fn form_map(request: &Request) -> HashMap<String, String> {
    url_pairs(&String::from_utf8_lossy(&request.body))
}

fn url_pairs(encoded: &str) -> HashMap<String, String> {
    encoded
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| {
            let v = v.replace('+', " ");
            (
                urlencoding::decode(k).unwrap().into_owned(),
                urlencoding::decode(&v).unwrap().into_owned(),
            )
        })
        .collect()
}

async fn only_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

#[tokio::test]
async fn call_sends_signed_get_and_parses_json() {
    init_logger();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/videos/show"))
        .and(query_param("video_key", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "video": { "key": "abc", "title": "Demo" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = pinned_client(config_for(&server, TransportKind::Query));
    let response = client
        .call("/videos/show", CallParams::new().with("video_key", "abc"), None, false)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.api_status(), Some("ok"));
    assert_eq!(response.value().unwrap()["video"]["title"], "Demo");

    let query = query_map(&only_request(&server).await);
    let expected = hex::encode(Sha1::digest(
        "api_format=native&api_key=K&api_nonce=00000001&api_timestamp=1000&video_key=abcS".as_bytes(),
    ));
    assert_eq!(query["api_signature"], expected);
    assert_eq!(query["api_nonce"], "00000001");
    assert_eq!(query["api_timestamp"], "1000");
    assert_eq!(query["api_key"], "K");
    assert_eq!(query["api_format"], "native");
    assert_eq!(query.len(), 6);
}

#[tokio::test]
async fn signed_values_are_sent_in_encoded_form() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = pinned_client(config_for(&server, TransportKind::Query));
    client
        .call("/videos/update", CallParams::new().with("title", "my video"), None, false)
        .await
        .unwrap();

    // 签名时已编码的值会被查询串再编码一次
    let query = query_map(&only_request(&server).await);
    assert_eq!(query["title"], "my%20video");
}

#[tokio::test]
async fn error_status_body_is_returned_as_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/videos/show"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status": "error",
            "code": "NotFound",
            "message": "Video not found"
        })))
        .mount(&server)
        .await;

    let client = pinned_client(config_for(&server, TransportKind::Query));
    let response = client
        .call("/videos/show", CallParams::new().with("video_key", "missing"), None, true)
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
    assert_eq!(response.api_status(), Some("error"));
    assert_eq!(response.value().unwrap()["code"], "NotFound");
}

#[tokio::test]
async fn undecodable_body_is_returned_raw() {
    let server = MockServer::start().await;
    let payload: &[u8] = b"(dp0\nS'status'\np1\nS'ok'\np2\ns.";

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .mount(&server)
        .await;

    let client = pinned_client(config_for(&server, TransportKind::Query));
    let response = client
        .call("/videos/list", CallParams::new(), None, false)
        .await
        .unwrap();

    assert!(!response.is_parsed());
    assert_eq!(response.raw().unwrap().as_ref(), payload);
}

#[tokio::test]
async fn url_override_replaces_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/custom/videos/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    // 默认地址指向不存在的主机,只有替代地址可达
    let client = pinned_client(ClientConfig::default());
    let base = format!("{}/custom", server.uri());
    let response = client
        .call("/videos/list", CallParams::new(), Some(base.as_str()), false)
        .await
        .unwrap();

    assert_eq!(response.api_status(), Some("ok"));
}

#[tokio::test]
async fn form_body_transport_posts_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/videos/show"))
        .and(body_string_contains("video_key=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = pinned_client(config_for(&server, TransportKind::FormBody));
    let response = client
        .call("/videos/show", CallParams::new().with("video_key", "abc"), None, false)
        .await
        .unwrap();
    assert_eq!(response.api_status(), Some("ok"));

    let request = only_request(&server).await;
    assert!(request.url.query().is_none());
    let form = form_map(&request);
    assert_eq!(form["api_key"], "K");
    assert_eq!(form["api_signature"].len(), 40);
}

#[tokio::test]
async fn upload_is_unsigned_multipart_with_query() {
    init_logger();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(query_param("token", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "file": { "md5": "x", "size": 11 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    file.write_all(b"hello video").unwrap();

    let seen = Arc::new(Mutex::new(Vec::<UploadProgress>::new()));
    let sink = seen.clone();
    let progress: ProgressCallback = Arc::new(move |p: UploadProgress| sink.lock().unwrap().push(p));

    let client = pinned_client(config_for(&server, TransportKind::Query)).with_progress(progress);
    let upload_url = format!("{}/upload", server.uri());
    let params = CallParams::new().with("token", "tok123").with("key", "abc");
    let response = client
        .upload(params, Some(upload_url.as_str()), file.path(), true)
        .await
        .unwrap();

    assert_eq!(response.api_status(), Some("ok"));

    let request = only_request(&server).await;
    let query = query_map(&request);
    assert_eq!(query["token"], "tok123");
    assert_eq!(query["key"], "abc");
    assert_eq!(query["api_format"], "native");
    assert!(!query.contains_key("api_signature"));
    assert!(!query.contains_key("api_nonce"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("hello video"));
    assert!(body.contains("name=\"token\""));
    assert!(body.contains("tok123"));
    assert!(body.contains("video/mp4"));

    let seen = seen.lock().unwrap();
    let last = seen.last().expect("progress reported");
    assert_eq!(last.total, 11);
    assert_eq!(last.percent(), 100.0);
}

#[tokio::test]
async fn upload_without_verbose_reports_no_progress() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"data").unwrap();

    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let progress: ProgressCallback = Arc::new(move |_: UploadProgress| *counter.lock().unwrap() += 1);

    let client = pinned_client(config_for(&server, TransportKind::Query)).with_progress(progress);
    let response = client
        .upload(CallParams::new(), None, file.path(), false)
        .await
        .unwrap();

    assert_eq!(response.raw().unwrap().as_ref(), b"OK");
    assert_eq!(*calls.lock().unwrap(), 0);

    let request = only_request(&server).await;
    assert_eq!(request.url.path(), "/v1");
}

#[tokio::test]
async fn form_body_upload_sends_query_and_fields_without_progress() {
    init_logger();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1"))
        .and(query_param("token", "t"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".flv").tempfile().unwrap();
    file.write_all(b"form upload bytes").unwrap();

    let calls = Arc::new(Mutex::new(0usize));
    let counter = calls.clone();
    let progress: ProgressCallback = Arc::new(move |_: UploadProgress| *counter.lock().unwrap() += 1);

    let client = pinned_client(config_for(&server, TransportKind::FormBody)).with_progress(progress);
    let response = client
        .upload(CallParams::new().with("token", "t"), None, file.path(), true)
        .await
        .unwrap();

    assert_eq!(response.api_status(), Some("ok"));
    assert_eq!(*calls.lock().unwrap(), 0);

    let request = only_request(&server).await;
    let query = query_map(&request);
    assert_eq!(query["api_format"], "native");
    assert_eq!(query["token"], "t");
    assert!(!query.contains_key("api_signature"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("form upload bytes"));
    assert!(body.contains("name=\"token\""));
    assert!(body.contains("name=\"api_format\""));
}

#[tokio::test]
async fn upload_missing_file_fails() {
    let client = create_client(Credentials::new("K", "S"), ClientConfig::default()).unwrap();
    let err = client
        .upload(
            CallParams::new(),
            Some("http://127.0.0.1:1/upload"),
            std::path::Path::new("/no/such/file.mov"),
            false,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BotrError::FileNotFound(_)));
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let client = create_client(
        Credentials::new("K", "S"),
        ClientConfig {
            host: "http://127.0.0.1:1".to_string(),
            timeout: Some(std::time::Duration::from_secs(5)),
            ..Default::default()
        },
    )
    .unwrap();

    let err = client
        .call("/videos/list", CallParams::new(), None, false)
        .await
        .unwrap_err();

    assert!(matches!(err, BotrError::NetworkError(_)));
}
