// src/crawl/queue.rs
// =============================================================================
// This module implements the crawl engine: a breadth-first walk over the
// allow-listed part of a site that verifies every link it finds.
//
// How it works:
// 1. Seed the queue with the configured source prefixes
// 2. Pop the next page, mark it visited and fetch it
// 3. Extract its links:
//    - internal + allowed  -> queued for crawling
//    - external            -> verified now (HEAD, GET fallback)
//    - internal disallowed / excluded external -> ignored
// 4. Every broken link becomes a record credited to the page linking to it
// 5. Stop when the queue is empty or the error budget is spent
// 6. Flush: hand the records to the sink, then the summary to the notifier
//
// Phases of one run:
//   Seeding -> Draining -> (Exhausted | BudgetTripped) -> Flushed
//
// All state (queue, visited set, records, budget) lives in one CrawlEngine
// value, so every run and every test starts from scratch.
// =============================================================================

use super::classify::UrlClassifier;
use super::record::BrokenLinkRecord;
use super::state::{CrawlItem, ErrorBudget, Frontier};
use crate::checker::{extract_links, Cause, Fetcher, StatusVerifier, Verdict};
use crate::config::{CrawlConfig, SeedPolicy};
use crate::errors::{ConfigError, NotifyError, SinkError};
use crate::link::CrawlUrl;
use crate::notify::{HaltReason, Notifier, RunSummary};
use crate::report::ReportSink;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Seeding,
    Draining,
    /// The queue ran dry with budget to spare
    Exhausted,
    /// The error ceiling was reached; crawling stopped early
    BudgetTripped,
    /// Records and summary have been handed off
    Flushed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub links_seen: usize,
    pub probes: usize,
}

/// Outcome of handing the results to the sink and the notifier.
#[derive(Debug)]
pub struct DeliveryReport {
    pub sink: Result<(), SinkError>,
    pub notify: Result<(), NotifyError>,
}

impl DeliveryReport {
    pub fn all_failed(&self) -> bool {
        self.sink.is_err() && self.notify.is_err()
    }
}

pub struct CrawlEngine {
    classifier: UrlClassifier,
    fetcher: Arc<dyn Fetcher>,
    verifier: StatusVerifier,
    seeds: Vec<CrawlUrl>,
    seed_policy: SeedPolicy,
    max_depth: Option<usize>,
    probe_concurrency: usize,
    max_listed: usize,

    frontier: Frontier,
    budget: ErrorBudget,
    records: Vec<BrokenLinkRecord>,
    // One verdict per external URL per run; every referencing page still
    // gets its own record
    verdicts: HashMap<CrawlUrl, Verdict>,
    phase: CrawlPhase,
    stats: CrawlStats,
}

impl CrawlEngine {
    pub fn new(config: &CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, ConfigError> {
        config.validate()?;
        let base_domain = config
            .base_domain()
            .ok_or_else(|| ConfigError::Invalid("could not determine a base domain".into()))?;

        Ok(Self {
            classifier: UrlClassifier::new(base_domain, &config.excluded_domains, &config.seeds),
            verifier: StatusVerifier::new(Arc::clone(&fetcher)),
            fetcher,
            seeds: config.seed_urls(),
            seed_policy: config.seed_policy,
            max_depth: config.max_depth,
            probe_concurrency: config.probe_concurrency,
            max_listed: config.max_listed,
            frontier: Frontier::new(),
            budget: ErrorBudget::new(config.error_ceiling),
            records: Vec::new(),
            verdicts: HashMap::new(),
            phase: CrawlPhase::Seeding,
            stats: CrawlStats::default(),
        })
    }

    /// Crawls until the queue is empty or the error budget is spent.
    ///
    /// Records are kept on the engine as they are found, so if this future
    /// is dropped part-way (run timeout) `flush` still reports them.
    pub async fn run(&mut self) -> CrawlPhase {
        if self.phase != CrawlPhase::Seeding {
            return self.phase;
        }

        for seed in self.seeds.clone() {
            self.frontier.push(CrawlItem::seed(seed));
        }
        self.phase = CrawlPhase::Draining;
        info!(seeds = self.seeds.len(), ceiling = self.budget.ceiling(), "crawl started");

        while !self.budget.is_exhausted() {
            let Some(item) = self.frontier.pop() else {
                break;
            };
            self.crawl_page(item).await;
        }

        if self.budget.is_exhausted() {
            warn!(
                ceiling = self.budget.ceiling(),
                skipped = self.frontier.pending_len(),
                "error budget exhausted, stopping crawl"
            );
            self.frontier.clear_pending();
            self.phase = CrawlPhase::BudgetTripped;
        } else {
            self.phase = CrawlPhase::Exhausted;
        }

        info!(
            pages = self.stats.pages_fetched,
            links = self.stats.links_seen,
            probes = self.stats.probes,
            broken = self.budget.spent(),
            "crawl finished"
        );
        self.phase
    }

    async fn crawl_page(&mut self, item: CrawlItem) {
        debug!(depth = item.depth, url = %item.url, "crawling");
        self.stats.pages_fetched += 1;

        let page = match self.fetcher.fetch(item.url.as_url()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %item.url, error = %e, "failed to fetch page");
                self.record(item.source().clone(), item.url.clone(), Cause::NetworkError(e.to_string()));
                return;
            }
        };

        if !page.is_success() {
            let lenient_seed = item.is_seed() && self.seed_policy == SeedPolicy::Lenient;
            if lenient_seed {
                info!(url = %item.url, status = page.status, "seed answered with an error, parsing it anyway");
            } else if page.status == 404 {
                self.record(item.source().clone(), item.url.clone(), Cause::HttpStatus(404));
                return;
            } else {
                debug!(url = %item.url, status = page.status, "not extracting links from error page");
                return;
            }
        }

        // A redirect off the site lands on somebody else's page; its links
        // are not ours to check
        if !self.classifier.is_internal(page.final_url.as_str()) {
            info!(url = %item.url, target = %page.final_url, "page redirects off-site, not extracting links");
            return;
        }

        let may_enqueue = self.max_depth.map_or(true, |max| item.depth < max);
        let mut seen_on_page = HashSet::new();
        let mut external = Vec::new();

        for link in extract_links(&page.body, &page.final_url) {
            if !seen_on_page.insert(link.clone()) {
                continue;
            }
            self.stats.links_seen += 1;

            if self.classifier.is_internal(link.as_str()) {
                if !self.classifier.is_allowed_source(link.as_str()) {
                    trace!(url = %link, "internal link outside the allow-list");
                } else if may_enqueue {
                    self.frontier.push(CrawlItem {
                        url: link,
                        referrer: Some(item.url.clone()),
                        depth: item.depth + 1,
                    });
                }
            } else if self.classifier.is_excluded_domain(link.as_str()) {
                trace!(url = %link, "excluded domain");
            } else {
                external.push(link);
            }
        }

        self.check_external(&item.url, external).await;
    }

    // Verifies a page's external links, up to `probe_concurrency` at a time.
    // Results are consumed here one by one, so records and the budget are
    // only ever touched from this loop.
    async fn check_external(&mut self, page: &CrawlUrl, links: Vec<CrawlUrl>) {
        if links.is_empty() {
            return;
        }

        let checks: Vec<_> = links
            .into_iter()
            .map(|url| {
                let cached = self.verdicts.get(&url).cloned();
                let verifier = self.verifier.clone();
                async move {
                    match cached {
                        Some(verdict) => (url, verdict, false),
                        None => {
                            let verdict = verifier.check(&url).await;
                            (url, verdict, true)
                        }
                    }
                }
            })
            .collect();

        let mut results = stream::iter(checks).buffered(self.probe_concurrency);

        while let Some((url, verdict, probed)) = results.next().await {
            if probed {
                self.stats.probes += 1;
                self.verdicts.insert(url.clone(), verdict.clone());
            }

            if let Some(cause) = verdict.cause() {
                self.record(page.clone(), url, cause);
                if self.budget.is_exhausted() {
                    // Dropping `results` cancels the probes still in flight
                    debug!(page = %page, "error budget exhausted mid-page");
                    break;
                }
            }
        }
    }

    fn record(&mut self, source: CrawlUrl, broken: CrawlUrl, cause: Cause) {
        if !self.classifier.is_allowed_source(source.as_str()) {
            debug!(source = %source, url = %broken, "source outside the allow-list, not recording");
            return;
        }
        if !self.budget.spend() {
            return;
        }

        warn!(source = %source, url = %broken, cause = %cause, "broken link");
        self.records.push(BrokenLinkRecord::new(source, broken, cause));
    }

    /// Writes the records to the sink and sends the summary.
    ///
    /// Neither failure is fatal and a failing sink does not stop the
    /// notification.
    pub async fn flush(&mut self, sink: &dyn ReportSink, notifier: &dyn Notifier) -> DeliveryReport {
        let halt = self.halt_reason();

        let sink_result = sink.append(&self.records).await;
        match &sink_result {
            Ok(()) => info!(sink = sink.name(), rows = self.records.len(), "report written"),
            Err(e) => error!(sink = sink.name(), error = %e, "failed to write report"),
        }

        let summary = RunSummary::new(
            &self.records,
            self.frontier.visited_len(),
            halt,
            sink.detail_link(),
            self.max_listed,
        );
        let notify_result = notifier.notify(&summary).await;
        match &notify_result {
            Ok(()) => info!(broken = summary.broken_count, "summary sent"),
            Err(e) => error!(error = %e, "failed to send summary"),
        }

        self.phase = CrawlPhase::Flushed;
        DeliveryReport {
            sink: sink_result,
            notify: notify_result,
        }
    }

    fn halt_reason(&self) -> HaltReason {
        match self.phase {
            CrawlPhase::Exhausted => HaltReason::Exhausted,
            CrawlPhase::BudgetTripped => HaltReason::BudgetTripped,
            _ => HaltReason::Interrupted,
        }
    }

    pub fn records(&self) -> &[BrokenLinkRecord] {
        &self.records
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub fn visited_len(&self) -> usize {
        self.frontier.visited_len()
    }
}
