//! Integration tests for the Cloudinary blob store against a mock server

use base64::{engine::general_purpose, Engine as _};
use folio::adapters::blob_store::BlobStore;
use folio::adapters::cloudinary::CloudinaryBlobStore;
use folio::config::{secret_string, CloudinaryConfig};
use folio::domain::{BlobKind, BlobStoreError, ErrorKind, FolderKey, FolioError, UpstreamError};
use mockito::Matcher;
use std::io::Write;
use tempfile::NamedTempFile;

fn store(base_url: &str) -> CloudinaryBlobStore {
    CloudinaryBlobStore::new(CloudinaryConfig {
        cloud_name: "demo".to_string(),
        api_key: "123456".to_string(),
        api_secret: secret_string("shh".to_string()),
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    })
    .unwrap()
}

fn expected_auth() -> String {
    format!("Basic {}", general_purpose::STANDARD.encode("123456:shh"))
}

fn prefix(key: &str) -> FolderKey {
    FolderKey::new(key).unwrap()
}

#[tokio::test]
async fn test_upload_returns_descriptor() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/demo/image/upload")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("name=\"folder\"".to_string()),
            Matcher::Regex("Folio/Categories/ab12/image".to_string()),
            Matcher::Regex("name=\"signature\"".to_string()),
            Matcher::Regex("name=\"api_key\"".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"public_id": "Folio/Categories/ab12/image/xyz", "secure_url": "https://res.example.com/xyz.png", "bytes": 7}"#,
        )
        .create_async()
        .await;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"content").unwrap();

    let descriptor = store(&server.url())
        .upload(file.path(), &prefix("Folio/Categories/ab12/image"), BlobKind::Image)
        .await
        .unwrap();

    assert_eq!(descriptor.remote_id, "Folio/Categories/ab12/image/xyz");
    assert_eq!(descriptor.url, "https://res.example.com/xyz.png");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_server_error_is_upstream_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/demo/raw/upload")
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"%PDF").unwrap();

    let err = store(&server.url())
        .upload(file.path(), &prefix("Folio/x/document"), BlobKind::Raw)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    assert!(matches!(
        err,
        FolioError::Upstream(UpstreamError::BlobStore(BlobStoreError::ServerError { status: 503, .. }))
    ));
}

#[tokio::test]
async fn test_upload_of_missing_file_never_calls_the_server() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = store(&server.url())
        .upload(
            std::path::Path::new("/nonexistent/cover.png"),
            &prefix("Folio/x/cover"),
            BlobKind::Image,
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Staged file unreadable"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_destroy_accepts_ok_and_not_found() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/demo/image/destroy")
        .match_body(Matcher::UrlEncoded("public_id".to_string(), "a/b/one".to_string()))
        .with_status(200)
        .with_body(r#"{"result": "ok"}"#)
        .create_async()
        .await;
    let missing = server
        .mock("POST", "/demo/image/destroy")
        .match_body(Matcher::UrlEncoded("public_id".to_string(), "a/b/two".to_string()))
        .with_status(200)
        .with_body(r#"{"result": "not found"}"#)
        .create_async()
        .await;

    let blobs = store(&server.url());
    blobs.delete("a/b/one", BlobKind::Image).await.unwrap();
    blobs.delete("a/b/two", BlobKind::Image).await.unwrap();
    ok.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_destroy_failure_names_the_object() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/demo/raw/destroy")
        .with_status(401)
        .with_body("bad signature")
        .create_async()
        .await;

    let err = store(&server.url())
        .delete("a/b/doc", BlobKind::Raw)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("a/b/doc"));
}

#[tokio::test]
async fn test_prefix_and_folder_removal_use_admin_api() {
    let mut server = mockito::Server::new_async().await;
    let images = server
        .mock("DELETE", "/demo/resources/image/upload")
        .match_query(Matcher::UrlEncoded(
            "prefix".to_string(),
            "Folio/Categories/ab12".to_string(),
        ))
        .match_header("authorization", expected_auth().as_str())
        .with_status(200)
        .with_body(r#"{"deleted": {}}"#)
        .create_async()
        .await;
    let raw = server
        .mock("DELETE", "/demo/resources/raw/upload")
        .match_query(Matcher::UrlEncoded(
            "prefix".to_string(),
            "Folio/Categories/ab12".to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"deleted": {}}"#)
        .create_async()
        .await;
    let folder = server
        .mock("DELETE", "/demo/folders/Folio/Categories/ab12")
        .match_header("authorization", expected_auth().as_str())
        .with_status(200)
        .with_body(r#"{"deleted": ["Folio/Categories/ab12"]}"#)
        .create_async()
        .await;

    let blobs = store(&server.url());
    let subtree = prefix("Folio/Categories/ab12");
    blobs.delete_by_prefix(&subtree).await.unwrap();
    blobs.delete_folder(&subtree).await.unwrap();

    images.assert_async().await;
    raw.assert_async().await;
    folder.assert_async().await;
}

#[tokio::test]
async fn test_folder_removal_failure_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/demo/folders/Folio/x")
        .with_status(500)
        .create_async()
        .await;

    let err = store(&server.url())
        .delete_folder(&prefix("Folio/x"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Folder removal failed for 'Folio/x'"));
}
