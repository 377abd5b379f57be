// Integration tests for the ask pipeline
//
// Tests cover:
// - Remote messages API decoding through the HTTP source
// - Directory caching and single upstream fetch
// - Soft answers when the upstream fails or returns garbage
// - Topic answers for the scenarios served by the public endpoints

use member_qa::config::config::{CacheConfig, DirectoryConfig, ResolverConfig};
use member_qa::observability::AppMetrics;
use member_qa::qa::formatter;
use member_qa::services::{
    AskService, DirectoryFetcher, HttpMessageSource, MessageSource, create_ask_service,
    create_directory_fetcher,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> serde_json::Value {
    json!({
        "total": 5,
        "items": [
            {"id": "1", "user_id": "u1", "user_name": "Layla Kawaguchi",
             "timestamp": "2024-01-12T09:15:00", "message": "Planning my trip to London in June."},
            {"id": "2", "user_id": "u2", "user_name": "Vikram Desai",
             "timestamp": "2024-01-08T11:00:00", "message": "I just bought my second car yesterday. Now I have 2 cars."},
            {"id": "3", "user_id": "u3", "user_name": "Amina Van Den Berg",
             "timestamp": "2024-01-14T12:00:00", "message": "My favorite restaurants are 'Bella Italia' and 'Spice Garden'."},
            {"id": "4", "user_id": "u4", "user_name": "Sophia Al-Farsi",
             "timestamp": "2024-01-15T10:30:00", "message": "Please book a private jet to Paris for this Friday."},
            {"id": "5", "user_id": "u1", "user_name": "Layla Kawaguchi",
             "timestamp": "2024-01-13T16:45:00", "message": "Looking for good restaurants in London."}
        ]
    })
}

struct Pipeline {
    ask: Box<dyn AskService>,
    fetcher: Arc<dyn DirectoryFetcher>,
    metrics: Arc<AppMetrics>,
}

fn pipeline(server: &MockServer, cache: CacheConfig) -> Pipeline {
    pipeline_with(server, cache, DirectoryConfig::default())
}

fn pipeline_with(server: &MockServer, cache: CacheConfig, directory: DirectoryConfig) -> Pipeline {
    let source: Arc<dyn MessageSource> =
        Arc::new(HttpMessageSource::new(&server.uri(), Duration::from_secs(2)).unwrap());
    let metrics = Arc::new(AppMetrics::default());
    let fetcher: Arc<dyn DirectoryFetcher> = Arc::from(create_directory_fetcher(
        source,
        &cache,
        &directory,
        metrics.clone(),
    ));
    let ask = create_ask_service(
        fetcher.clone(),
        &ResolverConfig::default().known_members,
        150,
        5,
        metrics.clone(),
    );
    Pipeline {
        ask,
        fetcher,
        metrics,
    }
}

async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_trip_question_over_http() {
    let server = healthy_server().await;
    let pipeline = pipeline(&server, CacheConfig::default());

    let outcome = pipeline
        .ask
        .answer("When is Layla planning her trip to London")
        .await;

    assert_eq!(
        outcome.answer,
        "Layla Kawaguchi is planning a trip to London in June."
    );
}

#[tokio::test]
async fn test_car_question_over_http() {
    let server = healthy_server().await;
    let pipeline = pipeline(&server, CacheConfig::default());

    let outcome = pipeline.ask.answer("How many cars does Vikram have").await;

    assert_eq!(outcome.answer, "Vikram Desai has 2 car(s).");
}

#[tokio::test]
async fn test_restaurant_question_over_http() {
    let server = healthy_server().await;
    let pipeline = pipeline(&server, CacheConfig::default());

    let outcome = pipeline
        .ask
        .answer("What are Amina's favorite restaurants?")
        .await;

    assert_eq!(
        outcome.answer,
        "Amina Van Den Berg's favorite restaurants include: Bella Italia, Spice Garden."
    );
}

#[tokio::test]
async fn test_cached_directory_fetches_upstream_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
        .expect(1)
        .mount(&server)
        .await;
    let pipeline = pipeline(&server, CacheConfig::default());

    pipeline.ask.answer("How many cars does Vikram have").await;
    pipeline.ask.answer("What does Sophia need").await;
    let members = pipeline.ask.members().await;

    assert_eq!(members.len(), 4);
    assert_eq!(pipeline.metrics.cache_hits_total.load(Ordering::Relaxed), 2);
    assert_eq!(pipeline.fetcher.cache_stats().unwrap().misses, 1);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload()))
        .expect(2)
        .mount(&server)
        .await;
    let pipeline = pipeline(&server, CacheConfig::default());

    pipeline.fetcher.fetch().await;
    pipeline.fetcher.invalidate();
    let directory = pipeline.fetcher.fetch().await;

    assert_eq!(directory.total_messages(), 5);
}

#[tokio::test]
async fn test_upstream_error_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    let pipeline = pipeline(&server, CacheConfig::default());

    let first = pipeline.ask.answer("How many cars does Vikram have").await;
    let second = pipeline.ask.answer("How many cars does Vikram have").await;

    assert_eq!(first.answer, formatter::no_data());
    assert_eq!(second.answer, formatter::no_data());
    assert_eq!(
        pipeline.metrics.upstream_failures_total.load(Ordering::Relaxed),
        2
    );
    assert_eq!(pipeline.metrics.upstream_empty_total.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_malformed_payload_is_soft() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    let pipeline = pipeline(&server, CacheConfig::default());

    let outcome = pipeline.fetcher.fetch_outcome().await;

    assert!(!outcome.upstream_ok());
    assert!(outcome.directory.is_empty());
}

#[tokio::test]
async fn test_empty_payload_is_counted_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "items": []})))
        .mount(&server)
        .await;
    let pipeline = pipeline(
        &server,
        CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        },
    );

    let outcome = pipeline.ask.answer("How many cars does Vikram have").await;

    assert_eq!(outcome.answer, formatter::no_data());
    assert_eq!(pipeline.metrics.upstream_empty_total.load(Ordering::Relaxed), 1);
    assert_eq!(
        pipeline.metrics.upstream_failures_total.load(Ordering::Relaxed),
        0
    );
}

async fn sophia_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "items": [
                {"id": "1", "user_id": "u4", "user_name": "Sophia Al-Farsi",
                 "timestamp": "2024-01-10T14:20:00", "message": "I need to visit London next month."},
                {"id": "2", "user_id": "u4", "user_name": "Sophia Al-Farsi",
                 "timestamp": "2024-01-15T10:30:00", "message": "Please book a private jet to Paris for this Friday."}
            ]
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_latest_request_follows_source_order() {
    let server = sophia_server().await;
    let pipeline = pipeline(&server, CacheConfig::default());

    let outcome = pipeline.ask.answer("What does Sophia want?").await;

    assert_eq!(
        outcome.answer,
        "Sophia Al-Farsi's latest request: I need to visit London next month."
    );
}

#[tokio::test]
async fn test_latest_request_with_timestamp_sort() {
    let server = sophia_server().await;
    let pipeline = pipeline_with(
        &server,
        CacheConfig::default(),
        DirectoryConfig {
            sort_by_timestamp: true,
        },
    );

    let outcome = pipeline.ask.answer("What does Sophia want?").await;

    assert_eq!(
        outcome.answer,
        "Sophia Al-Farsi's latest request: Please book a private jet to Paris for this Friday."
    );
}
