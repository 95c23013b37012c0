use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use greeny::{web_server::build_router, HttpAnswerService, Settings};

fn settings() -> Settings {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Settings {
        templates_dir: root.join("templates"),
        static_dir: root.join("static"),
        ..Settings::default()
    }
}

fn service() -> HttpAnswerService {
    HttpAnswerService::new("http://127.0.0.1:9/generate-answer", Duration::from_secs(1)).unwrap()
}

#[tokio::test]
async fn test_index_renders_chat_page() {
    let server = TestServer::new(build_router(service(), &settings())).unwrap();

    let response = server.get("/").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<title>Sustainability Analytics</title>"));
    assert!(html.contains(r#"placeholder="Message ChatGreeny""#));
    assert!(html.contains("Thinking..."));
    assert!(html.contains("/static/chat.js"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let server = TestServer::new(build_router(service(), &settings())).unwrap();

    let response = server.get("/static/chat.js").await;

    response.assert_status_ok();
    assert!(response.text().contains("/ws"));
}

#[tokio::test]
async fn test_missing_static_file_is_not_found() {
    let server = TestServer::new(build_router(service(), &settings())).unwrap();

    let response = server.get("/static/missing.js").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Not Found");
}

#[tokio::test]
async fn test_index_uses_configured_templates_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("index.html"),
        "<p>{{ title }} / {{ placeholder }}</p>",
    )
    .unwrap();
    let settings = Settings {
        templates_dir: dir.path().to_path_buf(),
        ..settings()
    };
    let server = TestServer::new(build_router(service(), &settings)).unwrap();

    let response = server.get("/").await;

    response.assert_status_ok();
    assert_eq!(
        response.text(),
        "<p>Sustainability Analytics / Message ChatGreeny</p>"
    );
}

#[tokio::test]
async fn test_missing_template_is_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        templates_dir: dir.path().to_path_buf(),
        ..settings()
    };
    let server = TestServer::new(build_router(service(), &settings)).unwrap();

    let response = server.get("/").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("Internal Server Error"));
}
