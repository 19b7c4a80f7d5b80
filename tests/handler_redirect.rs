mod common;

use axum::http::StatusCode;
use common::{
    InMemoryLinkRepository, create_test_state, create_test_state_with, test_server,
    wait_for_clicks,
};
use serde_json::{Value, json};
use std::time::Duration;

#[tokio::test]
async fn test_redirect_success() {
    let repo = InMemoryLinkRepository::new();
    repo.insert("redir1", "https://example.com/target?q=1");
    let server = test_server(create_test_state(repo.clone()));

    let response = server.get("/redir1").await;

    assert_eq!(response.status_code(), 302);

    let location = response.header("location");
    assert_eq!(location, "https://example.com/target?q=1");

    let link = wait_for_clicks(&repo, "redir1", 1).await;
    assert_eq!(link.clicks, 1);
    assert!(link.last_clicked.is_some());
}

#[tokio::test]
async fn test_redirect_then_stats_show_click() {
    let repo = InMemoryLinkRepository::new();
    let server = test_server(create_test_state(repo.clone()));

    let created: Value = server
        .post("/api/links")
        .json(&json!({ "longUrl": "https://example.com/a/b" }))
        .await
        .json();
    let code = created["code"].as_str().unwrap().to_string();

    let response = server.get(&format!("/{code}")).await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/a/b");

    wait_for_clicks(&repo, &code, 1).await;

    let body: Value = server.get(&format!("/api/links/{code}")).await.json();
    assert_eq!(body["clicks"], 1);
    assert!(!body["last_clicked"].is_null());
}

#[tokio::test]
async fn test_redirect_counts_every_visit() {
    let repo = InMemoryLinkRepository::new();
    repo.insert("many01", "https://example.com");
    let server = test_server(create_test_state(repo.clone()));

    for _ in 0..5 {
        assert_eq!(server.get("/many01").await.status_code(), 302);
    }

    let link = wait_for_clicks(&repo, "many01", 5).await;
    assert_eq!(link.clicks, 5);
}

#[tokio::test]
async fn test_redirect_not_found() {
    let repo = InMemoryLinkRepository::new();
    let server = test_server(create_test_state(repo));

    let response = server.get("/nothere").await;

    assert_eq!(response.status_code(), 404);
    assert_eq!(response.text(), "Link not found");
}

#[tokio::test]
async fn test_redirect_survives_click_failure() {
    let repo = InMemoryLinkRepository::new();
    repo.insert("flaky1", "https://example.com/flaky");
    repo.set_clicks_unavailable(true);
    let server = test_server(create_test_state(repo.clone()));

    let response = server.get("/flaky1").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/flaky");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(repo.get("flaky1").unwrap().clicks, 0);
}

#[tokio::test]
async fn test_redirect_store_unavailable() {
    let repo = InMemoryLinkRepository::new();
    repo.insert("down01", "https://example.com");
    repo.set_unavailable(true);
    let server = test_server(create_test_state(repo));

    let response = server.get("/down01").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_redirect_store_timeout() {
    let repo = InMemoryLinkRepository::new();
    repo.insert("slow01", "https://example.com");
    repo.set_latency(Duration::from_millis(300));
    let server = test_server(create_test_state_with(
        repo,
        Duration::from_millis(50),
        false,
    ));

    let response = server.get("/slow01").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
