//! Integration tests for `ForemClient` against a mock Forem server.
//!
//! Requests go through `feed::execute`, so the scope-to-endpoint mapping is
//! exercised together with the HTTP and decoding layers.

use devfeed::api::{ApiError, ArticleSource, ForemClient};
use devfeed::feed::{self, FeedScope, FetchOrchestrator};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ForemClient {
    ForemClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap()
}

fn listing_entry(id: u64, title: &str) -> Value {
    json!({
        "type_of": "article",
        "id": id,
        "title": title,
        "description": format!("About {title}"),
        "cover_image": null,
        "published_at": "2024-05-01T12:00:00Z",
        "tag_list": ["rust", "tutorial"],
        "tags": "rust, tutorial",
        "url": format!("https://dev.to/ada/post-{id}"),
        "reading_time_minutes": 4,
        "user": { "name": "Ada", "username": "ada", "twitter_username": null }
    })
}

#[tokio::test]
async fn test_latest_feed_page_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing_entry(11, "Ownership"),
            listing_entry(12, "Borrowing"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = FetchOrchestrator::new(10, 5);
    let request = orchestrator.begin(&FeedScope::Latest, 2).unwrap();
    let articles = feed::execute(&client_for(&server), &request).await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].id, 11);
    assert_eq!(articles[0].title, "Ownership");
    assert_eq!(articles[0].tags, vec!["rust", "tutorial"]);
    assert_eq!(articles[0].author.handle, "ada");
    assert_eq!(articles[1].reading_time_minutes, Some(4));
}

#[tokio::test]
async fn test_tag_scope_sends_tag_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("tag", "rust"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_entry(1, "Traits")])))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = FetchOrchestrator::new(10, 5);
    let request = orchestrator
        .begin(&FeedScope::Tag("rust".to_string()), 1)
        .unwrap();
    let articles = feed::execute(&client_for(&server), &request).await.unwrap();
    assert_eq!(articles.len(), 1);
}

#[tokio::test]
async fn test_author_scope_sends_username_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("username", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = FetchOrchestrator::new(10, 5);
    let request = orchestrator
        .begin(&FeedScope::Author("ada".to_string()), 1)
        .unwrap();
    let articles = feed::execute(&client_for(&server), &request).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_search_scans_pages_and_filters_titles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("q", "async"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing_entry(1, "Async Rust in practice"),
            listing_entry(2, "Unrelated post"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("q", "async"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing_entry(3, "Why ASYNC is hard"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut orchestrator = FetchOrchestrator::new(10, 5);
    let request = orchestrator
        .begin(&FeedScope::Search("async".to_string()), 1)
        .unwrap();
    let articles = feed::execute(&client_for(&server), &request).await.unwrap();

    let ids: Vec<u64> = articles.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_article_detail_with_joined_tags() {
    let server = MockServer::start().await;
    let mut body = listing_entry(42, "Lifetimes");
    body["tag_list"] = json!("rust, beginners");
    body["tags"] = json!(["rust", "beginners"]);
    body["body_markdown"] = json!("# Lifetimes\n\nThey are regions.");
    Mock::given(method("GET"))
        .and(path("/api/articles/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let detail = client_for(&server).get_article(42).await.unwrap();
    assert_eq!(detail.summary.id, 42);
    assert_eq!(detail.summary.tags, vec!["rust", "beginners"]);
    assert_eq!(
        detail.body_markdown.as_deref(),
        Some("# Lifetimes\n\nThey are regions.")
    );
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client_for(&server).list_articles(1, 10, None).await;
    assert!(matches!(result, Err(ApiError::HttpStatus(503))));
}

#[tokio::test]
async fn test_tags_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(query_param("per_page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "rust", "bg_color_hex": "#000000" },
            { "id": 2, "name": "webdev" },
            { "id": 3, "name": "go", "slug": "golang" }
        ])))
        .mount(&server)
        .await;

    let tags = client_for(&server).list_tags(3).await.unwrap();
    let slugs: Vec<&str> = tags.iter().map(|t| t.slug()).collect();
    assert_eq!(slugs, vec!["rust", "webdev", "golang"]);
}
