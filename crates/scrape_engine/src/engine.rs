use std::io;

use tokio::runtime::{Handle, Runtime};
use tokio_util::sync::CancellationToken;

use crate::batch::{BatchRunner, BatchSettings};
use crate::fetch::FetchSettings;
use crate::format::format_batch;
use crate::{BatchResult, Cancelled, ScrapeOutcome};

/// Blocking front door to the pipeline for callers without an async runtime.
///
/// Owns a tokio runtime; every method blocks the calling thread until its run
/// completes. Cancelling the token from [`Scraper::cancel_token`] aborts the
/// batch in flight and every later batch on this scraper.
pub struct Scraper {
    runtime: Runtime,
    runner: BatchRunner,
    cancel: CancellationToken,
}

impl Scraper {
    pub fn new(fetch: FetchSettings, batch: BatchSettings) -> io::Result<Self> {
        Self::from_runner(BatchRunner::with_settings(fetch, batch))
    }

    pub fn from_runner(runner: BatchRunner) -> io::Result<Self> {
        Ok(Self {
            runtime: Runtime::new()?,
            runner,
            cancel: CancellationToken::new(),
        })
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Handle for spawning helpers (signal listeners) on the scraper's runtime.
    pub fn runtime_handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    pub fn scrape(&self, url: &str) -> ScrapeOutcome {
        self.runtime.block_on(self.runner.scrape(url))
    }

    pub fn run_one(&self, url: &str) -> String {
        self.runtime.block_on(self.runner.run_one(url))
    }

    pub fn run_batch<I, S>(&self, urls: I) -> Result<BatchResult, Cancelled>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime.block_on(self.runner.run_batch(urls, &self.cancel))
    }

    /// Report for `urls`. After cancellation only the entries that completed
    /// before it are included.
    pub fn run_many<I, S>(&self, urls: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self
            .run_batch(urls)
            .unwrap_or_else(|cancelled| cancelled.partial);
        format_batch(&result)
    }
}
