// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use soulbind::config::load_and_validate_config;
use soulbind::dom::Document;
use soulbind::engine::Engine;
use tracing_subscriber::EnvFilter;

/// Mounts a page against a config: seeds the store, attaches every binding,
/// loads every fragment (nested ones included) and prints the settled markup.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <config.yaml> <page.html>", args[0]);
        eprintln!("Example: {} configs/shop.yaml pages/index.html", args[0]);
        bail!("expected 2 arguments, got {}", args.len().saturating_sub(1));
    }

    let start_time = Instant::now();
    let config = load_and_validate_config(&args[1])
        .with_context(|| format!("loading config {}", args[1]))?;
    let page = tokio::fs::read_to_string(&args[2])
        .await
        .with_context(|| format!("reading page {}", args[2]))?;
    let document = Document::parse(&page).with_context(|| format!("parsing page {}", args[2]))?;

    let mut engine = Engine::with_config(document, &config)?;
    let mounted = engine.start().await;
    tracing::info!(
        mounted,
        bindings = engine.bindings().len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "page settled"
    );

    println!("{}", engine.document().to_html());
    Ok(())
}
