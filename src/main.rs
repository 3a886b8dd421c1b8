// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code:
//      crawl: 0 = finished (broken links are reported, not fatal)
//             3 = --fail-on-delivery-error and nothing could be delivered
//      check: 0 = all healthy, 1 = something broken or unreachable
//      both:  2 = bad configuration or startup error
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Arc<dyn Trait>: one fetcher shared by the engine and its verifier
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker;       // src/checker/ - link extraction and status verification
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - run configuration
mod crawl;         // src/crawl/ - the crawl engine
mod errors;        // src/errors.rs - typed error enums
mod link;          // src/link.rs - normalized URL type
mod notify;        // src/notify/ - run summary notifications
mod report;        // src/report/ - where broken-link rows go

use checker::{HttpFetcher, LinkCheckResult, StatusVerifier, Verdict};
use clap::Parser;  // Parser trait enables the parse() method
use cli::{Cli, Commands};
use config::CrawlConfig;
use crawl::{CrawlEngine, CrawlPhase};
use link::CrawlUrl;
use notify::{LogNotifier, Notifier, WebhookNotifier};
use report::{ConsoleSink, ReportSink, SheetsSink};

// anyhow::Result is like std::result::Result but simpler for applications
// It lets us return any error type with the ? operator
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG controls verbosity (e.g. RUST_LOG=link_auditor=debug); the
// default shows progress and every broken link
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => {
            let json = args.json;
            let config = args.into_config().context("invalid crawl configuration")?;
            handle_crawl(config, json).await
        }
        Commands::Check {
            urls,
            json,
            concurrency,
            timeout,
        } => handle_check(&urls, json, concurrency, timeout).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(config: CrawlConfig, json: bool) -> Result<i32> {
    let fetcher = HttpFetcher::new(
        &config.user_agent,
        config.max_redirects,
        config.probe_timeout(),
        config.fetch_timeout(),
    )
    .context("failed to build HTTP client")?;
    let mut engine = CrawlEngine::new(&config, Arc::new(fetcher))?;

    if !json {
        println!("🔍 Crawling from {} seed(s)", config.seeds.len());
        println!("📊 Error ceiling: {}", config.error_ceiling);
    }

    // A dropped run() future leaves the engine in Draining; flush reports
    // that as an interrupted run
    match config.run_timeout() {
        Some(limit) => {
            if tokio::time::timeout(limit, engine.run()).await.is_err() {
                warn!(secs = limit.as_secs(), "run timeout reached, reporting partial results");
            }
        }
        None => {
            engine.run().await;
        }
    }
    let phase = engine.phase();

    // Sink and notifier share one client; their requests are few and small
    let client = reqwest::Client::builder()
        .timeout(config.fetch_timeout())
        .build()
        .context("failed to build HTTP client")?;

    let sink: Box<dyn ReportSink> = match &config.sheets {
        Some(sheets) => Box::new(SheetsSink::new(client.clone(), sheets.clone())),
        None => Box::new(ConsoleSink::new(json)),
    };
    let notifier: Box<dyn Notifier> = match &config.webhook_url {
        Some(url) => Box::new(WebhookNotifier::new(client, url.clone())),
        None => Box::new(LogNotifier),
    };

    let delivery = engine.flush(sink.as_ref(), notifier.as_ref()).await;

    if !json {
        let stats = engine.stats();
        println!();
        println!("📊 Summary:");
        println!("   📄 Pages crawled: {}", engine.visited_len());
        println!("   🔗 Links seen: {}", stats.links_seen);
        println!("   🌐 External checks: {}", stats.probes);
        println!("   ❌ Broken: {}", engine.records().len());
        match phase {
            CrawlPhase::BudgetTripped => println!("   ⛔ Stopped early: error ceiling reached"),
            CrawlPhase::Draining => println!("   ⏱️  Stopped early: run timeout"),
            _ => {}
        }
    }

    if config.fail_on_delivery_error && delivery.all_failed() {
        info!("neither the report nor the summary could be delivered");
        return Ok(3);
    }
    Ok(0)
}

// Handles the 'check' subcommand
async fn handle_check(urls: &[String], json: bool, concurrency: usize, timeout: u64) -> Result<i32> {
    let targets = urls
        .iter()
        .map(|u| CrawlUrl::parse(u).with_context(|| format!("invalid URL '{}'", u)))
        .collect::<Result<Vec<_>>>()?;

    let (probe_timeout, fetch_timeout) = check_timeouts(timeout);
    let fetcher = HttpFetcher::new(&config::default_user_agent(), 10, probe_timeout, fetch_timeout)
    .context("failed to build HTTP client")?;
    let verifier = StatusVerifier::new(Arc::new(fetcher));

    if !json {
        println!("🌐 Checking {} link(s)...\n", targets.len());
    }

    let results = checker::verify_all(&verifier, targets, concurrency.max(1)).await;
    print_results(&results, json)?;

    let broken_count = results.iter().filter(|r| !r.is_ok()).count();
    if broken_count > 0 {
        Ok(1)  // Exit code 1 = broken links found
    } else {
        Ok(0)  // Exit code 0 = all good
    }
}

// Full fetches get twice the probe timeout
fn check_timeouts(secs: u64) -> (Duration, Duration) {
    (Duration::from_secs(secs), Duration::from_secs(secs.saturating_mul(2)))
}

// Prints the results either as a table or JSON
fn print_results(results: &[LinkCheckResult], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        print_table(results);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[LinkCheckResult]) {
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(105));

    for result in results {
        let message = result.verdict.cause().map(|c| c.to_string()).unwrap_or_default();
        println!(
            "{:<60} {:<15} {:<30}",
            report::truncate(&result.url, 60),
            format_verdict(&result.verdict),
            message
        );
    }

    println!();

    let ok_count = results.iter().filter(|r| r.is_ok()).count();
    let broken_count = results.len() - ok_count;

    println!("📊 Summary:");
    println!("   ✅ OK: {}", ok_count);
    println!("   ❌ Broken: {}", broken_count);
    println!("   📋 Total: {}", results.len());
}

fn format_verdict(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Healthy => "✅ OK",
        Verdict::Broken { .. } => "❌ BROKEN",
        Verdict::Indeterminate { .. } => "⚠️  ERROR",
    }
}
