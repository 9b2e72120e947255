use crate::{BatchResult, PageData, ScrapeOutcome};

pub const NO_DATA_SENTINEL: &str = "No data found";
const BATCH_SEPARATOR: &str = "\n\n";

/// Render one outcome as report text. Pure and deterministic.
pub fn format_outcome(outcome: &ScrapeOutcome) -> String {
    match outcome {
        ScrapeOutcome::Success(data) if data.is_blank() => NO_DATA_SENTINEL.to_string(),
        ScrapeOutcome::Success(data) => format_page(data),
        ScrapeOutcome::Empty => NO_DATA_SENTINEL.to_string(),
        ScrapeOutcome::Failure(err) => format!("Error: {}", err.message),
    }
}

/// Three labeled blocks; an empty list leaves its label line alone.
fn format_page(data: &PageData) -> String {
    let mut out = String::new();
    out.push_str("Title:\n");
    out.push_str(data.title_or_sentinel());
    out.push('\n');
    push_block(&mut out, "Headings:", &data.headings);
    out.push('\n');
    push_block(&mut out, "Paragraphs:", &data.paragraphs);
    out
}

fn push_block(out: &mut String, label: &str, items: &[String]) {
    out.push_str(label);
    for item in items {
        out.push('\n');
        out.push_str(item);
    }
}

/// `url:\n<outcome>` blocks separated by a blank line, input order.
pub fn format_batch(result: &BatchResult) -> String {
    result
        .entries
        .iter()
        .map(|entry| format!("{}:\n{}", entry.url, format_outcome(&entry.outcome)))
        .collect::<Vec<_>>()
        .join(BATCH_SEPARATOR)
}
