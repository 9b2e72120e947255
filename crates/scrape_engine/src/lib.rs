//! Scrape engine: fetch, extract, format and persist page reports.
mod batch;
mod decode;
mod engine;
mod extract;
mod fetch;
mod format;
mod input;
mod persist;
mod types;

pub use batch::{BatchRunner, BatchSettings, ChannelProgressSink, ProgressSink};
pub use decode::{decode_body, DecodedText};
pub use engine::Scraper;
pub use extract::{Extractor, HeadingParagraphExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use format::{format_batch, format_outcome, NO_DATA_SENTINEL};
pub use input::{parse_url_list, read_url_list, InputError};
pub use persist::{ensure_output_dir, persist_report, AtomicReportWriter, Compression, PersistError};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    BatchEntry, BatchResult, Cancelled, ErrorKind, FetchMetadata, OutcomeStatus, PageData,
    RawPage, ScrapeError, ScrapeEvent, ScrapeOutcome, NO_TITLE_SENTINEL,
};
