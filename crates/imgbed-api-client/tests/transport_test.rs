use bytes::Bytes;
use imgbed_api_client::ApiClient;
use imgbed_core::{
    noop_progress, DownloadSink, ProgressCallback, SelectedFile, Transport, TransportError,
};
use mockito::{Matcher, Server};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn record_json(id: u64, uuid: &str, name: &str) -> String {
    format!(
        r#"{{"id":{id},"uuid":"{uuid}","original_name":"{name}","file_size":2048,
            "mime_type":"image/png","width":64,"height":32,
            "public_url":"https://cdn.example.com/{uuid}.png",
            "created_at":"2024-05-01T10:00:00Z"}}"#
    )
}

fn client(server: &Server, token: Option<&str>) -> ApiClient {
    ApiClient::new(
        server.url(),
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn png_file(name: &str, len: usize) -> SelectedFile {
    SelectedFile::new(name, "image/png", Bytes::from(vec![0x89u8; len]))
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (Arc::new(move |p| sink.lock().unwrap().push(p)), seen)
}

#[tokio::test]
async fn test_upload_single_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/images/upload")
        .match_header("authorization", "Bearer secret-token")
        .match_body(Matcher::Regex(r#"name="image"; filename="cat.png""#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"success":true,"data":{}}}"#,
            record_json(42, "abc-123", "cat.png")
        ))
        .create_async()
        .await;

    let (callback, seen) = recorder();
    let record = client(&server, Some("secret-token"))
        .upload_single(&png_file("cat.png", 200_000), callback)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(record.id, 42);
    assert_eq!(record.uuid, "abc-123");
    assert_eq!(record.byte_size, 2048);
    assert_eq!(record.width, 64);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test]
async fn test_upload_single_without_token_sends_no_auth() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/images/upload")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(format!(
            r#"{{"success":true,"data":{}}}"#,
            record_json(1, "u1", "a.png")
        ))
        .create_async()
        .await;

    client(&server, None)
        .upload_single(&png_file("a.png", 10), noop_progress())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_single_error_envelope() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/images/upload")
        .with_status(200)
        .with_body(r#"{"success":false,"error":"Storage quota exceeded","code":"QUOTA"}"#)
        .create_async()
        .await;

    let err = client(&server, None)
        .upload_single(&png_file("a.png", 10), noop_progress())
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Rejected(_)));
    assert_eq!(err.user_message().as_deref(), Some("Storage quota exceeded"));
}

#[tokio::test]
async fn test_upload_single_http_error_with_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/images/upload")
        .with_status(413)
        .with_body(r#"{"error":"File too large","code":"FILE_TOO_LARGE"}"#)
        .create_async()
        .await;

    let err = client(&server, None)
        .upload_single(&png_file("a.png", 10), noop_progress())
        .await
        .unwrap_err();
    match err {
        TransportError::Status { status, message } => {
            assert_eq!(status, 413);
            assert_eq!(message, "File too large");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_without_body_uses_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/batch-upload")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let err = client(&server, None)
        .upload_batch(&[png_file("a.png", 10)], noop_progress())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "request failed with status 502");
}

#[tokio::test]
async fn test_fetch_record_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/images/missing-uuid")
        .with_status(404)
        .with_body(r#"{"error":"Image not found","code":"NOT_FOUND"}"#)
        .create_async()
        .await;

    let err = client(&server, None)
        .fetch_record("missing-uuid")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_record_success() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/images/abc-123")
        .with_status(200)
        .with_body(format!(
            r#"{{"success":true,"data":{}}}"#,
            record_json(42, "abc-123", "cat.png")
        ))
        .create_async()
        .await;

    let record = client(&server, None).fetch_record("abc-123").await.unwrap();
    assert_eq!(record.original_name, "cat.png");
}

#[tokio::test]
async fn test_upload_batch_partial_failure() {
    let mut server = Server::new_async().await;
    let body = format!(
        r#"{{"success":true,"data":{{"successful":2,"failed":1,
            "results":[{},{}],
            "errors":[{{"index":1,"filename":"b.png","error":"Failed to save file"}}]}}}}"#,
        record_json(1, "u-a", "a.png").replacen('{', r#"{"index":0,"#, 1),
        record_json(3, "u-c", "c.png").replacen('{', r#"{"index":2,"#, 1),
    );
    let mock = server
        .mock("POST", "/api/v1/batch-upload")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="images"; filename="a.png""#.to_string()),
            Matcher::Regex(r#"name="images"; filename="c.png""#.to_string()),
        ]))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let files = vec![
        png_file("a.png", 100_000),
        png_file("b.png", 100_000),
        png_file("c.png", 100_000),
    ];
    let (callback, seen) = recorder();
    let outcome = client(&server, None)
        .upload_batch(&files, callback)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.failure_count, 1);
    assert_eq!(outcome.successes[0].uuid, "u-a");
    assert_eq!(outcome.successes[1].uuid, "u-c");
    assert_eq!(outcome.failures[0].filename, "b.png");
    assert_eq!(outcome.failures[0].reason, "Failed to save file");

    let seen = seen.lock().unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test]
async fn test_upload_batch_short_response_keeps_invariant() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/batch-upload")
        .with_status(200)
        .with_body(format!(
            r#"{{"success":true,"data":{{"successful":1,"failed":0,"results":[{}],"errors":null}}}}"#,
            record_json(1, "u-a", "a.png")
        ))
        .create_async()
        .await;

    let files: Vec<SelectedFile> = (0..10).map(|i| png_file(&format!("{}.png", i), 10)).collect();
    let outcome = client(&server, None)
        .upload_batch(&files, noop_progress())
        .await
        .unwrap();
    assert_eq!(outcome.success_count + outcome.failure_count, 10);
    assert_eq!(outcome.success_count, 1);
}

#[tokio::test]
async fn test_fetch_summary() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/images/stats/summary")
        .match_header("authorization", "Bearer t")
        .with_status(200)
        .with_body(r#"{"success":true,"data":{"total_images":12,"total_size":4096,"today_images":3}}"#)
        .create_async()
        .await;

    let stats = client(&server, Some("t")).fetch_summary().await.unwrap();
    assert_eq!(stats.total_images, 12);
    assert_eq!(stats.total_size, 4096);
    assert_eq!(stats.today_images, 3);
}

#[tokio::test]
async fn test_fetch_summary_malformed() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/images/stats/summary")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server, None).fetch_summary().await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_list_images() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/images")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("page_size".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(format!(
            r#"{{"success":true,"data":{{"items":[{}],"total":3,"page":2,"page_size":1}}}}"#,
            record_json(2, "u-2", "b.png")
        ))
        .create_async()
        .await;

    let page = client(&server, None).list_images(2, 1).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total_pages(), 3);
    assert!(page.has_next());
}

#[tokio::test]
async fn test_delete_image() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/v1/images/u-9")
        .with_status(200)
        .with_body(r#"{"success":true,"message":"Image deleted"}"#)
        .create_async()
        .await;

    client(&server, None).delete_image("u-9").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_health() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"ok","timestamp":1714557600,"service":"imgbed"}"#)
        .create_async()
        .await;

    let health = client(&server, None).health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.service, "imgbed");
}

#[tokio::test]
async fn test_connection_refused_is_request_error() {
    let client = ApiClient::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();
    let err = client.fetch_summary().await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn test_download_writes_file() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/files/u-1.png")
        .with_status(200)
        .with_body(b"PNGDATA".to_vec())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let downloader = client(&server, None).downloader(dir.path().join("out"));
    let path = downloader
        .trigger_download(&format!("{}/files/u-1.png", server.url()), "cat.png")
        .await
        .unwrap();

    assert_eq!(path, dir.path().join("out").join("cat.png"));
    assert_eq!(std::fs::read(&path).unwrap(), b"PNGDATA");
}

#[tokio::test]
async fn test_download_rejects_traversal_without_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = client(&server, None)
        .downloader(dir.path())
        .trigger_download(&format!("{}/x", server.url()), "../evil.png")
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::InvalidFilename(_)));
    mock.assert_async().await;
}
