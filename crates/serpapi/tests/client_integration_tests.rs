// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Integration tests for the SerpApi client against a mock server.
//!
//! Tests cover:
//! - Request URL composition (credentials, runtime tag, output format)
//! - Awaited and callback invocation
//! - Pagination cursors, the page stream and its callback form
//! - Archive ids kept inside the archive path
//! - Credential policy per endpoint
//! - Timeouts and error bodies

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use serpapi::{Client, FixedIdentity, Params, SerpApiError};
use tokio::sync::oneshot;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TEST_KEY: &str = "test-key";
const SOURCE_TAG: &str = "rust@1.0.0";

async fn setup_server() -> MockServer {
	MockServer::start().await
}

fn setup_client(server: &MockServer) -> Client {
	Client::builder()
		.base_url(server.uri())
		.api_key(TEST_KEY)
		.runtime_identity(FixedIdentity::new(SOURCE_TAG))
		.build()
		.unwrap()
}

fn coffee() -> Params {
	Params::new().with("engine", "google").with("q", "Coffee")
}

async fn received(server: &MockServer) -> Vec<Request> {
	server.received_requests().await.unwrap_or_default()
}

fn query_value(request: &Request, key: &str) -> Option<String> {
	request
		.url
		.query_pairs()
		.find(|(k, _)| k == key)
		.map(|(_, v)| v.into_owned())
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn search_url_carries_params_key_and_source() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.and(query_param("q", "Coffee"))
		.and(query_param("engine", "google"))
		.and(query_param("api_key", TEST_KEY))
		.and(query_param("source", SOURCE_TAG))
		.and(query_param("output", "json"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"search_metadata": { "status": "Success" },
			"organic_results": []
		})))
		.expect(1)
		.mount(&server)
		.await;

	let page = setup_client(&server).get_json(coffee()).await.unwrap();
	assert_eq!(page.body["search_metadata"]["status"], "Success");
	assert!(!page.has_next());
}

#[tokio::test]
async fn legacy_and_unified_calls_send_identical_queries() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.expect(2)
		.mount(&server)
		.await;

	let client = setup_client(&server);
	client.get_json(coffee()).await.unwrap();
	client
		.get_json(("google", Params::new().with("q", "Coffee")))
		.await
		.unwrap();

	let requests = received(&server).await;
	assert_eq!(requests.len(), 2);
	assert_eq!(requests[0].url.query(), requests[1].url.query());
}

#[tokio::test]
async fn timeout_option_is_never_sent() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.mount(&server)
		.await;

	setup_client(&server)
		.get_json(coffee().with("timeout", 5000))
		.await
		.unwrap();

	let requests = received(&server).await;
	assert_eq!(query_value(&requests[0], "timeout"), None);
}

#[tokio::test]
async fn explicit_key_overrides_configured_key() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(query_param("api_key", "per-request"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.expect(1)
		.mount(&server)
		.await;

	setup_client(&server)
		.get_json(coffee().with("api_key", "per-request"))
		.await
		.unwrap();
}

#[tokio::test]
async fn absent_key_sends_unmetered_request() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.expect(1)
		.mount(&server)
		.await;

	setup_client(&server)
		.get_json(coffee().with_absent("api_key"))
		.await
		.unwrap();

	let requests = received(&server).await;
	assert_eq!(query_value(&requests[0], "api_key"), None);
	assert_eq!(query_value(&requests[0], "source").as_deref(), Some(SOURCE_TAG));
}

#[tokio::test]
async fn html_search_returns_raw_body() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.and(query_param("output", "html"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>coffee</html>"))
		.expect(1)
		.mount(&server)
		.await;

	let html = setup_client(&server).get_html(coffee()).await.unwrap();
	assert_eq!(html, "<html>coffee</html>");
}

#[tokio::test]
async fn error_body_is_returned_to_caller() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(401).set_body_json(json!({
			"error": "Invalid API key. Your API key should be here: https://serpapi.com/manage-api-key"
		})))
		.mount(&server)
		.await;

	let page = setup_client(&server).get_json(coffee()).await.unwrap();
	assert!(page.body["error"].as_str().unwrap().starts_with("Invalid API key"));
}

#[tokio::test]
async fn stalled_search_times_out() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(
			ResponseTemplate::new(200)
				.set_body_json(json!({}))
				.set_delay(Duration::from_secs(5)),
		)
		.mount(&server)
		.await;

	let err = setup_client(&server)
		.get_json(coffee().with("timeout", 1))
		.await
		.unwrap_err();
	assert!(matches!(err, SerpApiError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn configured_timeout_applies_without_option() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
		.mount(&server)
		.await;

	let client = setup_client(&server);
	client.update_config(|config| config.timeout = Duration::from_millis(1));
	let err = client.get_json(coffee()).await.unwrap_err();
	assert!(err.is_timeout());
}

// ============================================================================
// Callback form
// ============================================================================

#[tokio::test]
async fn callback_form_issues_one_request() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
		.expect(1)
		.mount(&server)
		.await;

	let (tx, rx) = oneshot::channel();
	setup_client(&server).get_json_with(coffee(), move |result| {
		let _ = tx.send(result);
	});

	let page = rx.await.unwrap().unwrap();
	assert_eq!(page.body["ok"], true);
}

#[tokio::test]
async fn callback_receives_validation_errors() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = Client::builder().base_url(server.uri()).build().unwrap();
	let (tx, rx) = oneshot::channel();
	client
		.get_account_with(Params::new(), move |result| {
			let _ = tx.send(result);
		})
		.wait()
		.await;

	assert!(matches!(rx.await.unwrap(), Err(SerpApiError::MissingApiKey)));
}

// ============================================================================
// Pagination
// ============================================================================

async fn mount_two_pages(server: &MockServer) {
	// Mounted first so it wins for the second request.
	Mock::given(method("GET"))
		.and(path("/search"))
		.and(query_param("start", "10"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2 })))
		.expect(1)
		.mount(server)
		.await;

	let next = format!("{}/search.json?engine=google&q=Coffee&start=10", server.uri());
	Mock::given(method("GET"))
		.and(path("/search"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 1,
			"serpapi_pagination": { "current": 1, "next": next }
		})))
		.expect(1)
		.mount(server)
		.await;
}

#[tokio::test]
async fn next_page_issues_exactly_one_request() {
	let server = setup_server().await;
	mount_two_pages(&server).await;

	let client = setup_client(&server);
	let first = client.get_json(coffee()).await.unwrap();
	let cursor = first.next.clone().expect("first page should have a cursor");

	let second = client.next_page(&cursor).await.unwrap();
	assert_eq!(second.body["page"], 2);
	assert!(second.next.is_none());

	let requests = received(&server).await;
	assert_eq!(requests.len(), 2);
	assert_eq!(query_value(&requests[1], "api_key").as_deref(), Some(TEST_KEY));
	assert_eq!(query_value(&requests[1], "q").as_deref(), Some("Coffee"));
}

#[tokio::test]
async fn next_page_callback_form() {
	let server = setup_server().await;
	mount_two_pages(&server).await;

	let client = setup_client(&server);
	let cursor = client.get_json(coffee()).await.unwrap().next.unwrap();

	let (tx, rx) = oneshot::channel();
	client.next_page_with(cursor, move |result| {
		let _ = tx.send(result);
	});
	assert_eq!(rx.await.unwrap().unwrap().body["page"], 2);
}

#[tokio::test]
async fn page_stream_follows_cursors_until_exhausted() {
	let server = setup_server().await;
	mount_two_pages(&server).await;

	let client = setup_client(&server);
	let pages: Vec<_> = client.pages(coffee()).collect().await;

	assert_eq!(pages.len(), 2);
	assert_eq!(pages[0].as_ref().unwrap().body["page"], 1);
	assert_eq!(pages[1].as_ref().unwrap().body["page"], 2);
}

#[tokio::test]
async fn page_stream_stops_after_error() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_string("not json"))
		.expect(1)
		.mount(&server)
		.await;

	let client = setup_client(&server);
	let pages: Vec<_> = client.pages(coffee()).collect().await;

	assert_eq!(pages.len(), 1);
	assert!(matches!(pages[0], Err(SerpApiError::Decode(_))));
}

#[tokio::test]
async fn page_callback_form_walks_every_page() {
	let server = setup_server().await;
	mount_two_pages(&server).await;

	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = seen.clone();
	setup_client(&server)
		.pages_with(coffee(), move |result| {
			sink.lock().unwrap().push(result.unwrap().body["page"].clone());
			ControlFlow::Continue(())
		})
		.wait()
		.await;

	assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn page_callback_form_stops_on_break() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.and(query_param("start", "10"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2 })))
		.expect(0)
		.mount(&server)
		.await;
	let next = format!("{}/search.json?engine=google&q=Coffee&start=10", server.uri());
	Mock::given(method("GET"))
		.and(path("/search"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 1,
			"serpapi_pagination": { "next": next }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let calls = Arc::new(Mutex::new(0));
	let counter = calls.clone();
	setup_client(&server)
		.pages_with(coffee(), move |_| {
			*counter.lock().unwrap() += 1;
			ControlFlow::Break(())
		})
		.wait()
		.await;

	assert_eq!(*calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn same_cursor_twice_issues_two_requests() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/search"))
		.and(query_param("start", "10"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2 })))
		.expect(2)
		.mount(&server)
		.await;
	let next = format!("{}/search.json?engine=google&q=Coffee&start=10", server.uri());
	Mock::given(method("GET"))
		.and(path("/search"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"page": 1,
			"serpapi_pagination": { "next": next }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let client = setup_client(&server);
	let cursor = client.get_json(coffee()).await.unwrap().next.unwrap();
	let (a, b) = tokio::join!(client.next_page(&cursor), client.next_page(&cursor));

	assert_eq!(a.unwrap().body["page"], 2);
	assert_eq!(b.unwrap().body["page"], 2);
	assert_eq!(received(&server).await.len(), 3);
}

// ============================================================================
// Search archive
// ============================================================================

#[tokio::test]
async fn archive_json_requires_key_and_forwards_async() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/searches/abc123"))
		.and(query_param("api_key", TEST_KEY))
		.and(query_param("async", "true"))
		.and(query_param("output", "json"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"search_metadata": { "id": "abc123" }
		})))
		.expect(1)
		.mount(&server)
		.await;

	let body = setup_client(&server)
		.get_json_by_search_id("abc123", Params::new().with("async", true).with("q", "ignored"))
		.await
		.unwrap();
	assert_eq!(body["search_metadata"]["id"], "abc123");

	let requests = received(&server).await;
	assert_eq!(query_value(&requests[0], "q"), None);
}

#[tokio::test]
async fn archive_html_returns_text() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/searches/abc123"))
		.and(query_param("output", "html"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
		.expect(1)
		.mount(&server)
		.await;

	let html = setup_client(&server)
		.get_html_by_search_id("abc123", Params::new())
		.await
		.unwrap();
	assert_eq!(html, "<html></html>");
}

#[tokio::test]
async fn archive_without_any_key_fails_before_network() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = Client::builder().base_url(server.uri()).build().unwrap();
	let err = client
		.get_json_by_search_id("abc123", Params::new().with_absent("api_key"))
		.await
		.unwrap_err();
	assert!(matches!(err, SerpApiError::MissingApiKey));
}

#[tokio::test]
async fn archive_with_absent_key_falls_back_to_configured_key() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/searches/abc123"))
		.and(query_param("api_key", TEST_KEY))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc123" })))
		.expect(1)
		.mount(&server)
		.await;

	let body = setup_client(&server)
		.get_json_by_search_id("abc123", Params::new().with_absent("api_key"))
		.await
		.unwrap();
	assert_eq!(body["id"], "abc123");
}

#[tokio::test]
async fn archive_id_cannot_escape_searches_path() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/account"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "account_email": "x" })))
		.expect(0)
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "not found" })))
		.expect(1)
		.mount(&server)
		.await;

	let body = setup_client(&server)
		.get_json_by_search_id("../account", Params::new())
		.await
		.unwrap();
	assert_eq!(body["error"], "not found");

	let requests = received(&server).await;
	assert_eq!(requests[0].url.path(), "/searches/..%2Faccount");
}

#[tokio::test]
async fn archive_id_cannot_inject_query() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.expect(1)
		.mount(&server)
		.await;

	setup_client(&server)
		.get_json_by_search_id("abc?api_key=stolen#frag", Params::new())
		.await
		.unwrap();

	let requests = received(&server).await;
	assert_eq!(requests[0].url.path(), "/searches/abc%3Fapi_key=stolen%23frag");
	assert_eq!(query_value(&requests[0], "api_key").as_deref(), Some(TEST_KEY));
	assert_eq!(query_value(&requests[0], "output").as_deref(), Some("json"));
}

// ============================================================================
// Account and locations
// ============================================================================

#[tokio::test]
async fn account_sends_only_key_and_source() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/account"))
		.and(query_param("api_key", TEST_KEY))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"account_email": "dev@example.com"
		})))
		.expect(1)
		.mount(&server)
		.await;

	let account = setup_client(&server)
		.get_account(Params::new().with("q", "ignored"))
		.await
		.unwrap();
	assert_eq!(account["account_email"], "dev@example.com");

	let requests = received(&server).await;
	let keys: Vec<String> = requests[0]
		.url
		.query_pairs()
		.map(|(k, _)| k.into_owned())
		.collect();
	assert_eq!(keys.len(), 2, "unexpected query: {keys:?}");
	assert!(keys.iter().all(|k| ["api_key", "source"].contains(&k.as_str())));
}

#[tokio::test]
async fn account_without_key_fails_before_network() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200))
		.expect(0)
		.mount(&server)
		.await;

	let client = Client::builder().base_url(server.uri()).build().unwrap();
	let err = client.get_account(Params::new()).await.unwrap_err();
	assert!(matches!(err, SerpApiError::MissingApiKey));
}

#[tokio::test]
async fn locations_never_send_a_key() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/locations.json"))
		.and(query_param("q", "Austin"))
		.and(query_param("limit", "3"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([
			{ "name": "Austin, TX", "canonical_name": "Austin,TX,Texas,United States" }
		])))
		.expect(1)
		.mount(&server)
		.await;

	let locations = setup_client(&server)
		.get_locations(
			Params::new()
				.with("q", "Austin")
				.with("limit", 3)
				.with("api_key", "should-not-be-sent"),
		)
		.await
		.unwrap();
	assert_eq!(locations[0]["name"], "Austin, TX");

	let requests = received(&server).await;
	assert_eq!(query_value(&requests[0], "api_key"), None);
}

#[tokio::test]
async fn locations_callback_form() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.and(path("/locations.json"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
		.expect(1)
		.mount(&server)
		.await;

	let client = Client::builder().base_url(server.uri()).build().unwrap();
	let (tx, rx) = oneshot::channel();
	client
		.get_locations_with(Params::new().with("q", "Austin"), move |result| {
			let _ = tx.send(result);
		})
		.wait()
		.await;
	assert_eq!(rx.await.unwrap().unwrap(), json!([]));
}

// ============================================================================
// Identification
// ============================================================================

#[tokio::test]
async fn user_agent_carries_application_token() {
	let server = setup_server().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
		.mount(&server)
		.await;

	let client = Client::builder()
		.base_url(server.uri())
		.application("acme-crawler/2.3")
		.build()
		.unwrap();
	client.get_locations(Params::new()).await.unwrap();

	let requests = received(&server).await;
	let user_agent = requests[0]
		.headers
		.get("user-agent")
		.and_then(|v| v.to_str().ok())
		.unwrap_or_default()
		.to_string();
	assert!(user_agent.starts_with("serpapi-rust/"), "got {user_agent}");
	assert!(user_agent.ends_with(" acme-crawler/2.3"), "got {user_agent}");
}
