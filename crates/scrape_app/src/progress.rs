use scrape_engine::{OutcomeStatus, ProgressSink, ScrapeEvent};
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

/// Renders batch progress as log lines: `[2/5] https://... ok`.
pub struct LogProgressSink {
    total: usize,
}

impl LogProgressSink {
    pub fn new(total: usize) -> Self {
        Self { total }
    }
}

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: ScrapeEvent) {
        match event {
            ScrapeEvent::Started { index, url } => {
                scrape_debug!("[{}/{}] {} started", index + 1, self.total, url);
            }
            ScrapeEvent::Finished { index, url, status } => match status {
                OutcomeStatus::Success => {
                    scrape_info!("[{}/{}] {} ok", index + 1, self.total, url)
                }
                OutcomeStatus::Empty => {
                    scrape_info!("[{}/{}] {} no data", index + 1, self.total, url)
                }
                OutcomeStatus::Failed(kind) => {
                    scrape_warn!("[{}/{}] {} failed: {}", index + 1, self.total, url, kind)
                }
            },
        }
    }
}
