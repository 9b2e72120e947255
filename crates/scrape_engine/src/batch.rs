use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::pin::pin;
use std::sync::{mpsc, Arc};

use futures_util::{stream, FutureExt, StreamExt};
use scrape_logging::{scrape_info, scrape_warn};
use tokio_util::sync::CancellationToken;

use crate::extract::{Extractor, HeadingParagraphExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::format::{format_batch, format_outcome};
use crate::{
    BatchEntry, BatchResult, Cancelled, ErrorKind, ScrapeError, ScrapeEvent, ScrapeOutcome,
};

#[derive(Debug, Clone)]
pub struct BatchSettings {
    /// Maximum urls in flight. 1 fetches strictly one after another.
    pub concurrency: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ScrapeEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<ScrapeEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ScrapeEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ScrapeEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drives fetch -> extract -> format for one url or an ordered list of urls.
#[derive(Clone)]
pub struct BatchRunner {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    settings: BatchSettings,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl BatchRunner {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            progress: None,
        }
    }

    /// reqwest fetcher plus the heading/paragraph extractor.
    pub fn with_settings(fetch: FetchSettings, batch: BatchSettings) -> Self {
        Self::new(
            Arc::new(ReqwestFetcher::new(fetch)),
            Arc::new(HeadingParagraphExtractor),
            batch,
        )
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Scrape one url. Every failure, including a panic inside the pipeline,
    /// is folded into the returned outcome.
    ///
    /// Parsing runs on the blocking pool so a large document never stalls
    /// other in-flight fetches or the cancel check.
    pub async fn scrape(&self, url: &str) -> ScrapeOutcome {
        let page = match AssertUnwindSafe(self.fetcher.fetch(url)).catch_unwind().await {
            Ok(Ok(page)) => page,
            Ok(Err(err)) => return ScrapeOutcome::Failure(err),
            Err(panic) => return unexpected(panic_message(&*panic)),
        };

        let extractor = Arc::clone(&self.extractor);
        match tokio::task::spawn_blocking(move || extractor.extract(&page.text)).await {
            Ok(data) => ScrapeOutcome::from_page(data),
            Err(err) if err.is_panic() => unexpected(panic_message(&*err.into_panic())),
            Err(err) => unexpected(&err.to_string()),
        }
    }

    pub async fn run_one(&self, url: &str) -> String {
        format_outcome(&self.scrape(url).await)
    }

    /// Scrape `urls` in input order, skipping blank entries. Up to
    /// `concurrency` urls are in flight; results are reassembled in input order
    /// and one failing url never stops the rest.
    ///
    /// Returns promptly with `Err(Cancelled)` once `cancel` fires; in-flight
    /// fetches are dropped.
    pub async fn run_batch<I, S>(
        &self,
        urls: I,
        cancel: &CancellationToken,
    ) -> Result<BatchResult, Cancelled>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls: Vec<String> = urls
            .into_iter()
            .map(Into::into)
            .filter(|url| !url.trim().is_empty())
            .collect();
        let total = urls.len();
        let concurrency = self.settings.concurrency.max(1);
        scrape_info!("batch started: {} urls, concurrency {}", total, concurrency);

        let mut pending = pin!(stream::iter(urls.into_iter().enumerate())
            .map(move |(index, url)| self.scrape_entry(index, url))
            .buffered(concurrency));

        let mut entries = Vec::with_capacity(total);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    scrape_warn!("batch cancelled after {} of {} urls", entries.len(), total);
                    return Err(Cancelled {
                        partial: BatchResult { entries },
                        total,
                    });
                }
                next = pending.next() => match next {
                    Some(entry) => entries.push(entry),
                    None => break,
                },
            }
        }

        let result = BatchResult { entries };
        scrape_info!(
            "batch finished: {} urls, {} failed",
            result.len(),
            result.failures()
        );
        Ok(result)
    }

    /// Formatted report for `urls`. Never cancelled.
    pub async fn run_many<I, S>(&self, urls: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self
            .run_batch(urls, &CancellationToken::new())
            .await
            .unwrap_or_else(|cancelled| cancelled.partial);
        format_batch(&result)
    }

    async fn scrape_entry(&self, index: usize, url: String) -> BatchEntry {
        self.emit(ScrapeEvent::Started {
            index,
            url: url.clone(),
        });
        let outcome = self.scrape(&url).await;
        self.emit(ScrapeEvent::Finished {
            index,
            url: url.clone(),
            status: outcome.status(),
        });
        BatchEntry { url, outcome }
    }

    fn emit(&self, event: ScrapeEvent) {
        if let Some(sink) = &self.progress {
            sink.emit(event);
        }
    }
}

fn unexpected(detail: &str) -> ScrapeOutcome {
    ScrapeOutcome::Failure(ScrapeError::new(
        ErrorKind::Unexpected,
        format!("An unexpected error occurred: {detail}"),
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "panic with non-string payload"
    }
}
