// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! SerpApi client implementation.

use std::ops::ControlFlow;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::stream::{self, Stream};
use reqwest::{Client as HttpClient, Response};
use serde_json::Value;
use serpapi_common_config::SecretString;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Config;
use crate::dispatch::{deliver, deliver_each, Detached};
use crate::error::{Result, SerpApiError};
use crate::executor::{read_json, read_text, Executor};
use crate::pagination::{next_cursor, Cursor, Page};
use crate::params::{Params, API_KEY};
use crate::query::{Query, RequestOptions};
use crate::source::{RuntimeIdentity, RustRuntime};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

const SEARCH_PATH: &str = "search";
const SEARCH_ARCHIVE_PATH: &str = "searches";
const ACCOUNT_PATH: &str = "account";
const LOCATIONS_PATH: &str = "locations.json";

const OUTPUT: &str = "output";
const ASYNC: &str = "async";

/// Whether, and how, an endpoint is sent an API key.
#[derive(Debug, Clone, Copy)]
enum KeyPolicy {
	/// A key must resolve.
	Required,
	/// An explicitly absent key sends the request without one.
	AllowUnmetered,
	/// The endpoint is public; no key is ever sent.
	Omit,
}

/// A request ready for the executor.
struct Prepared {
	params: Params,
	timeout: Duration,
}

/// Builder for constructing a [`Client`].
pub struct ClientBuilder {
	config: Config,
	base_url: Option<String>,
	identity: Option<Arc<dyn RuntimeIdentity>>,
	application: Option<String>,
	http_client: Option<HttpClient>,
}

impl ClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			config: Config::default(),
			base_url: None,
			identity: None,
			application: None,
			http_client: None,
		}
	}

	/// Replaces the whole default configuration.
	pub fn config(mut self, config: Config) -> Self {
		self.config = config;
		self
	}

	/// Sets the default API key.
	pub fn api_key(mut self, key: impl Into<SecretString>) -> Self {
		self.config.api_key = Some(key.into());
		self
	}

	/// Sets the default request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.config.timeout = timeout;
		self
	}

	/// Sets the API host (useful for testing against a local server).
	///
	/// Default: `https://serpapi.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Overrides how the client reports its runtime in the `source` parameter.
	pub fn runtime_identity(mut self, identity: impl RuntimeIdentity + 'static) -> Self {
		self.identity = Some(Arc::new(identity));
		self
	}

	/// Appends a product token such as `acme-crawler/2.3` to the User-Agent.
	///
	/// Ignored when a custom HTTP client is supplied.
	pub fn application(mut self, product: impl Into<String>) -> Self {
		self.application = Some(product.into());
		self
	}

	/// Uses a preconfigured HTTP client instead of the shared default.
	pub fn http_client(mut self, client: HttpClient) -> Self {
		self.http_client = Some(client);
		self
	}

	/// Builds the client.
	pub fn build(self) -> Result<Client> {
		let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
		// Surface a malformed base URL now rather than on the first request.
		Url::parse(&base_url)?;

		let http_client = match self.http_client {
			Some(client) => client,
			None => serpapi_common_http::builder(self.application.as_deref())
				.build()
				.map_err(SerpApiError::Network)?,
		};
		let identity = self.identity.unwrap_or_else(|| Arc::new(RustRuntime));
		let executor = Executor::new(http_client, base_url, identity);

		info!(
			base_url = %executor.base_url(),
			has_api_key = self.config.api_key.is_some(),
			timeout_ms = self.config.timeout.as_millis() as u64,
			"SerpApi client initialized"
		);

		Ok(Client {
			inner: Arc::new(ClientInner {
				config: RwLock::new(self.config),
				executor,
			}),
		})
	}
}

impl Default for ClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[derive(Debug)]
struct ClientInner {
	config: RwLock<Config>,
	executor: Executor,
}

/// Client for the SerpApi search API.
///
/// Cloning is cheap; clones share configuration and connections.
///
/// # Example
///
/// ```ignore
/// use serpapi::{Client, Params};
///
/// let client = Client::builder().api_key("your_api_key").build()?;
///
/// let page = client
///     .get_json(Params::new().with("engine", "google").with("q", "Coffee"))
///     .await?;
///
/// if let Some(cursor) = &page.next {
///     let page2 = client.next_page(cursor).await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
	inner: Arc<ClientInner>,
}

impl Client {
	/// Creates a new builder for constructing a Client.
	pub fn builder() -> ClientBuilder {
		ClientBuilder::new()
	}

	/// Creates a client against the production host with `config` as defaults.
	pub fn new(config: Config) -> Result<Self> {
		ClientBuilder::new().config(config).build()
	}

	/// Creates a client whose defaults come from the environment.
	pub fn from_env() -> Result<Self> {
		Self::new(Config::from_env()?)
	}

	/// A snapshot of the current defaults.
	pub fn config(&self) -> Config {
		self.inner
			.config
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Changes the defaults used by subsequent requests.
	pub fn update_config(&self, update: impl FnOnce(&mut Config)) {
		let mut config = self
			.inner
			.config
			.write()
			.unwrap_or_else(PoisonError::into_inner);
		update(&mut config);
	}

	/// The URL a request for the path `segments` with `params` would be sent
	/// to, without the `source` tag. Each segment is percent-encoded.
	pub fn build_url(&self, segments: &[&str], params: &Params) -> Result<Url> {
		self.inner.executor.build_url(segments, params)
	}

	/// Issues a raw GET request. The response is returned undecoded.
	pub async fn execute(
		&self,
		segments: &[&str],
		params: Params,
		timeout: Duration,
	) -> Result<Response> {
		self.inner.executor.execute(segments, params, timeout).await
	}

	/// Runs a search and returns the decoded JSON page.
	///
	/// Accepts `Params` (with `engine` inside) or `(engine, Params)`.
	/// `api_key` and `timeout` entries act as per-request options.
	#[instrument(skip(self, query))]
	pub async fn get_json(&self, query: impl Into<Query>) -> Result<Page> {
		self.search_page(query.into().normalize()).await
	}

	/// Callback form of [`Client::get_json`].
	pub fn get_json_with<F>(&self, query: impl Into<Query>, callback: F) -> Detached
	where
		F: FnOnce(Result<Page>) + Send + 'static,
	{
		let client = self.clone();
		let params = query.into().normalize();
		deliver(async move { client.search_page(params).await }, callback)
	}

	/// Fetches the page a cursor points at.
	#[instrument(skip(self, cursor))]
	pub async fn next_page(&self, cursor: &Cursor) -> Result<Page> {
		self.search_page(cursor.params().clone()).await
	}

	/// Callback form of [`Client::next_page`].
	pub fn next_page_with<F>(&self, cursor: Cursor, callback: F) -> Detached
	where
		F: FnOnce(Result<Page>) + Send + 'static,
	{
		let client = self.clone();
		deliver(
			async move { client.search_page(cursor.into_params()).await },
			callback,
		)
	}

	/// Streams the first page and every following page until the results
	/// are exhausted or a request fails.
	pub fn pages(&self, query: impl Into<Query>) -> impl Stream<Item = Result<Page>> + Send + 'static {
		page_stream(self.clone(), query.into().normalize())
	}

	/// Callback form of [`Client::pages`].
	///
	/// The callback sees each page in order, including a final error, and
	/// returns [`ControlFlow::Break`] to stop early.
	pub fn pages_with<F>(&self, query: impl Into<Query>, callback: F) -> Detached
	where
		F: FnMut(Result<Page>) -> ControlFlow<()> + Send + 'static,
	{
		deliver_each(self.pages(query), callback)
	}

	/// Runs a search and returns the raw HTML the service rendered.
	#[instrument(skip(self, query))]
	pub async fn get_html(&self, query: impl Into<Query>) -> Result<String> {
		self.search_html(query.into().normalize()).await
	}

	/// Callback form of [`Client::get_html`].
	pub fn get_html_with<F>(&self, query: impl Into<Query>, callback: F) -> Detached
	where
		F: FnOnce(Result<String>) + Send + 'static,
	{
		let client = self.clone();
		let params = query.into().normalize();
		deliver(async move { client.search_html(params).await }, callback)
	}

	/// Retrieves an earlier search's JSON from the search archive.
	///
	/// `params` may carry `api_key`, `timeout` and `async`.
	#[instrument(skip(self, params))]
	pub async fn get_json_by_search_id(&self, search_id: &str, params: Params) -> Result<Value> {
		let (response, timeout) = self.archive(search_id, params, "json").await?;
		read_json(response, timeout).await
	}

	/// Callback form of [`Client::get_json_by_search_id`].
	pub fn get_json_by_search_id_with<F>(
		&self,
		search_id: impl Into<String>,
		params: Params,
		callback: F,
	) -> Detached
	where
		F: FnOnce(Result<Value>) + Send + 'static,
	{
		let client = self.clone();
		let search_id = search_id.into();
		deliver(
			async move { client.get_json_by_search_id(&search_id, params).await },
			callback,
		)
	}

	/// Retrieves an earlier search's HTML from the search archive.
	#[instrument(skip(self, params))]
	pub async fn get_html_by_search_id(&self, search_id: &str, params: Params) -> Result<String> {
		let (response, timeout) = self.archive(search_id, params, "html").await?;
		read_text(response, timeout).await
	}

	/// Callback form of [`Client::get_html_by_search_id`].
	pub fn get_html_by_search_id_with<F>(
		&self,
		search_id: impl Into<String>,
		params: Params,
		callback: F,
	) -> Detached
	where
		F: FnOnce(Result<String>) + Send + 'static,
	{
		let client = self.clone();
		let search_id = search_id.into();
		deliver(
			async move { client.get_html_by_search_id(&search_id, params).await },
			callback,
		)
	}

	/// Returns account information for the resolved API key.
	///
	/// `params` may carry `api_key` and `timeout`.
	#[instrument(skip(self, params))]
	pub async fn get_account(&self, mut params: Params) -> Result<Value> {
		let options = RequestOptions::extract(&mut params)?;
		let request = self.prepare(Params::new(), options, KeyPolicy::Required)?;
		let response = self
			.inner
			.executor
			.execute(&[ACCOUNT_PATH], request.params, request.timeout)
			.await?;
		read_json(response, request.timeout).await
	}

	/// Callback form of [`Client::get_account`].
	pub fn get_account_with<F>(&self, params: Params, callback: F) -> Detached
	where
		F: FnOnce(Result<Value>) + Send + 'static,
	{
		let client = self.clone();
		deliver(async move { client.get_account(params).await }, callback)
	}

	/// Looks up supported locations, e.g. `q=Austin&limit=3`.
	///
	/// This endpoint is public; no API key is sent.
	#[instrument(skip(self, params))]
	pub async fn get_locations(&self, mut params: Params) -> Result<Value> {
		let options = RequestOptions::extract(&mut params)?;
		let request = self.prepare(params, options, KeyPolicy::Omit)?;
		let response = self
			.inner
			.executor
			.execute(&[LOCATIONS_PATH], request.params, request.timeout)
			.await?;
		read_json(response, request.timeout).await
	}

	/// Callback form of [`Client::get_locations`].
	pub fn get_locations_with<F>(&self, params: Params, callback: F) -> Detached
	where
		F: FnOnce(Result<Value>) + Send + 'static,
	{
		let client = self.clone();
		deliver(async move { client.get_locations(params).await }, callback)
	}

	/// The search pipeline shared by first pages and cursors.
	async fn search_page(&self, params: Params) -> Result<Page> {
		let caller_params = params.clone();
		let (response, timeout) = self.search(params, "json").await?;
		let body = read_json(response, timeout).await?;
		let next = next_cursor(&caller_params, &body);

		debug!(has_next = next.is_some(), "Search page decoded");
		Ok(Page { body, next })
	}

	async fn search_html(&self, params: Params) -> Result<String> {
		let (response, timeout) = self.search(params, "html").await?;
		read_text(response, timeout).await
	}

	async fn search(&self, mut params: Params, output: &str) -> Result<(Response, Duration)> {
		let options = RequestOptions::extract(&mut params)?;
		let mut request = self.prepare(params, options, KeyPolicy::AllowUnmetered)?;
		request.params.insert(OUTPUT, output);
		let response = self
			.inner
			.executor
			.execute(&[SEARCH_PATH], request.params, request.timeout)
			.await?;
		Ok((response, request.timeout))
	}

	async fn archive(
		&self,
		search_id: &str,
		mut params: Params,
		output: &str,
	) -> Result<(Response, Duration)> {
		if matches!(search_id, "" | "." | "..") {
			return Err(SerpApiError::InvalidSearchId(search_id.to_string()));
		}
		let options = RequestOptions::extract(&mut params)?;
		let mut outgoing = Params::new();
		if let Some(flag) = params.remove(ASYNC) {
			outgoing = outgoing.with_opt(ASYNC, flag);
		}
		let mut request = self.prepare(outgoing, options, KeyPolicy::Required)?;
		request.params.insert(OUTPUT, output);

		let response = self
			.inner
			.executor
			.execute(&[SEARCH_ARCHIVE_PATH, search_id], request.params, request.timeout)
			.await?;
		Ok((response, request.timeout))
	}

	/// Resolves key and timeout against the current defaults.
	fn prepare(
		&self,
		mut params: Params,
		options: RequestOptions,
		policy: KeyPolicy,
	) -> Result<Prepared> {
		let config = self.config();
		let api_key = match policy {
			KeyPolicy::Required => config.resolve_api_key(&options.api_key, false)?,
			KeyPolicy::AllowUnmetered => config.resolve_api_key(&options.api_key, true)?,
			KeyPolicy::Omit => None,
		};
		let timeout = config.resolve_timeout(options.timeout_ms)?;

		if let Some(key) = api_key {
			params.insert(API_KEY, key.expose().as_str());
		}
		Ok(Prepared { params, timeout })
	}
}

/// Walks the result pages starting at `first`, stopping after the last page
/// or the first failure.
fn page_stream(client: Client, first: Params) -> impl Stream<Item = Result<Page>> + Send + 'static {
	enum State {
		First(Params),
		Next(Cursor),
		Done,
	}

	stream::unfold((client, State::First(first)), |(client, state)| async move {
		let result = match state {
			State::First(params) => client.search_page(params).await,
			State::Next(cursor) => client.search_page(cursor.into_params()).await,
			State::Done => return None,
		};
		let next = match &result {
			Ok(page) => page.next.clone().map_or(State::Done, State::Next),
			Err(_) => State::Done,
		};
		Some((result, (client, next)))
	})
}
