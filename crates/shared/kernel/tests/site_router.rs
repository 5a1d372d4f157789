use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use catalog_kernel::server::{HEALTH_PATH, StaticServer, ServerError, site_router};
use tower::ServiceExt;

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>catalog</html>").unwrap();
    std::fs::create_dir_all(dir.path().join("metadata/ds/v1/abc")).unwrap();
    std::fs::write(dir.path().join("metadata/ds/v1/abc/def.json"), r#"{"type":"dataset"}"#).unwrap();
    dir
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response =
        router.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn serves_index_on_root() {
    let dir = site();
    let (status, body) = get(site_router(dir.path()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>catalog</html>");
}

#[tokio::test]
async fn serves_node_files() {
    let dir = site();
    let (status, body) = get(site_router(dir.path()), "/metadata/ds/v1/abc/def.json").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["type"], "dataset");
}

#[tokio::test]
async fn missing_files_are_404() {
    let dir = site();
    let (status, _) = get(site_router(dir.path()), "/metadata/none.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_check_reports_up() {
    let dir = site();
    let (status, body) = get(site_router(dir.path()), HEALTH_PATH).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "up");
    assert_eq!(json["index"], true);
    assert_eq!(json["super_dataset"], false);
}

#[tokio::test]
async fn health_check_reports_degraded_site() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(site_router(dir.path()), HEALTH_PATH).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["metadata"], false);
}

#[test]
fn builder_rejects_missing_root() {
    let err = StaticServer::builder().build().unwrap_err();
    assert!(matches!(err, ServerError::Validation { .. }));

    let dir = tempfile::tempdir().unwrap();
    let err = StaticServer::builder().root(dir.path().join("absent")).build().unwrap_err();
    assert!(matches!(err, ServerError::Validation { .. }));
}

#[tokio::test]
async fn run_until_stops_on_signal() {
    let dir = site();
    let server = StaticServer::builder()
        .root(dir.path())
        .address("127.0.0.1".parse().unwrap())
        .port(0)
        .build()
        .unwrap();

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        server.run_until(tokio::time::sleep(std::time::Duration::from_millis(50))),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
}
