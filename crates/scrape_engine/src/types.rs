use std::fmt;

/// Title rendered when a document has no `<title>` element.
pub const NO_TITLE_SENTINEL: &str = "No title found";

/// Fixed extraction schema for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Text of the first `<title>`, `None` when the document has none.
    pub title: Option<String>,
    /// Text of every `h1`..`h6`, document order.
    pub headings: Vec<String>,
    /// Text of every `<p>`, document order.
    pub paragraphs: Vec<String>,
}

impl PageData {
    pub fn title_or_sentinel(&self) -> &str {
        self.title.as_deref().unwrap_or(NO_TITLE_SENTINEL)
    }

    /// True when the title (after sentinel substitution), every heading and
    /// every paragraph are blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.title_or_sentinel().trim().is_empty()
            && self.headings.iter().all(|h| h.trim().is_empty())
            && self.paragraphs.iter().all(|p| p.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub byte_len: u64,
    pub encoding_label: String,
}

/// A successfully fetched response body, decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub text: String,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-2xx response status.
    Http { status: u16 },
    /// The connection could not be established (DNS, refused, unreachable).
    Connection,
    /// The request exceeded its deadline.
    Timeout,
    /// Any other transport-level failure: malformed url, unsupported scheme,
    /// TLS, redirect loop, oversized body.
    Request,
    /// Reserved. Extraction is best-effort and never produces it.
    Parse,
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Http { status } => write!(f, "http error {status}"),
            ErrorKind::Connection => write!(f, "connection error"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Request => write!(f, "request error"),
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// A classified scrape failure. `message` is the user-facing description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ScrapeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ScrapeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of scraping one url. Exactly one case is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success(PageData),
    /// Parse succeeded but every field is blank.
    Empty,
    Failure(ScrapeError),
}

impl ScrapeOutcome {
    /// Classifies extracted data, folding blank pages into `Empty`.
    pub fn from_page(data: PageData) -> Self {
        if data.is_blank() {
            ScrapeOutcome::Empty
        } else {
            ScrapeOutcome::Success(data)
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        match self {
            ScrapeOutcome::Success(_) => OutcomeStatus::Success,
            ScrapeOutcome::Empty => OutcomeStatus::Empty,
            ScrapeOutcome::Failure(err) => OutcomeStatus::Failed(err.kind),
        }
    }
}

/// Payload-free summary of a [`ScrapeOutcome`], used for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Empty,
    Failed(ErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub url: String,
    pub outcome: ScrapeOutcome,
}

/// One entry per non-blank input url, input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, ScrapeOutcome::Failure(_)))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeEvent {
    Started {
        index: usize,
        url: String,
    },
    Finished {
        index: usize,
        url: String,
        status: OutcomeStatus,
    },
}

/// The batch was aborted before every url completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("batch cancelled after {} of {total} urls", .partial.len())]
pub struct Cancelled {
    /// Leading entries that finished before cancellation, input order.
    pub partial: BatchResult,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: Option<&str>, headings: &[&str], paragraphs: &[&str]) -> PageData {
        PageData {
            title: title.map(str::to_string),
            headings: headings.iter().map(|s| s.to_string()).collect(),
            paragraphs: paragraphs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn missing_title_is_never_blank() {
        assert!(!page(None, &[], &[]).is_blank());
    }

    #[test]
    fn whitespace_only_fields_are_blank() {
        assert!(page(Some("  "), &["\n"], &["", "\t"]).is_blank());
        assert!(!page(Some(""), &[], &["text"]).is_blank());
    }

    #[test]
    fn blank_page_becomes_empty_outcome() {
        assert_eq!(
            ScrapeOutcome::from_page(page(Some(""), &[], &[""])),
            ScrapeOutcome::Empty
        );
        assert_eq!(
            ScrapeOutcome::from_page(page(None, &[], &[])).status(),
            OutcomeStatus::Success
        );
    }
}
