// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use serde_json::Value;
use serpapi::{Client, Config, Params, Query};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{search_params, Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.global.json_logs);

	let config = cli.global.apply(Config::from_env()?);
	let mut builder = Client::builder()
		.config(config)
		.application(format!("serpapi-cli/{}", env!("CARGO_PKG_VERSION")));
	if let Some(base_url) = &cli.global.base_url {
		builder = builder.base_url(base_url);
	}
	let client = builder.build().context("failed to create SerpApi client")?;

	run(&client, cli.command).await
}

// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let subscriber = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr);
	if json {
		subscriber.json().init();
	} else {
		subscriber.init();
	}
}

async fn run(client: &Client, command: Command) -> Result<()> {
	match command {
		Command::Search {
			engine,
			html,
			pages,
			no_api_key,
			params,
		} => {
			let params = search_params(&params, no_api_key);
			let query = match engine {
				Some(engine) => Query::legacy(engine, params),
				None => Query::from(params),
			};

			if html {
				println!("{}", client.get_html(query).await?);
			} else if let Some(limit) = pages {
				print_pages(client, query, limit).await?;
			} else {
				let page = client.get_json(query).await?;
				print_json(&page.body)?;
			}
		}
		Command::Archive { search_id, html } => {
			if html {
				println!(
					"{}",
					client.get_html_by_search_id(&search_id, Params::new()).await?
				);
			} else {
				print_json(&client.get_json_by_search_id(&search_id, Params::new()).await?)?;
			}
		}
		Command::Account => {
			print_json(&client.get_account(Params::new()).await?)?;
		}
		Command::Locations { q, limit } => {
			let params = Params::new().with_opt("q", q).with_opt("limit", limit);
			print_json(&client.get_locations(params).await?)?;
		}
	}
	Ok(())
}

async fn print_pages(client: &Client, query: Query, limit: usize) -> Result<()> {
	let mut pages = Box::pin(client.pages(query).take(limit));
	let mut count = 0usize;
	while let Some(page) = pages.next().await {
		let page = page.with_context(|| format!("failed to fetch page {}", count + 1))?;
		println!("{}", serde_json::to_string(&page.body)?);
		count += 1;
		debug!(page = count, has_next = page.has_next(), "Printed page");
	}
	info!(pages = count, "Pagination finished");
	Ok(())
}

fn print_json(value: &Value) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}
