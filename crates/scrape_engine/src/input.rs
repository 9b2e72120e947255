use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use scrape_logging::scrape_debug;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to open url list {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("malformed url list: {0}")]
    Csv(#[from] csv::Error),
}

/// Read a CSV url list from `path`. See [`parse_url_list`].
pub fn read_url_list(path: &Path) -> Result<Vec<String>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_url_list(file)
}

/// One url per record, taken from the first field. Records are headerless and
/// may have any width; empty lines are ignored. Blank first fields are kept so
/// the batch runner decides what to skip.
pub fn parse_url_list<R: Read>(reader: R) -> Result<Vec<String>, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut urls = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(first) = record.get(0) {
            urls.push(first.to_string());
        }
    }
    scrape_debug!("url list parsed: {} records", urls.len());
    Ok(urls)
}
