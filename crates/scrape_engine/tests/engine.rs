use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use scrape_engine::{
    BatchRunner, BatchSettings, ErrorKind, FetchMetadata, Fetcher, HeadingParagraphExtractor,
    RawPage, ScrapeError, ScrapeOutcome, Scraper,
};

enum Route {
    Page(&'static str),
    Fail(ErrorKind),
    Hang,
}

struct StubFetcher {
    routes: HashMap<&'static str, Route>,
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<RawPage, ScrapeError> {
        match self.routes.get(url) {
            Some(Route::Page(html)) => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(RawPage {
                    text: html.to_string(),
                    metadata: FetchMetadata {
                        original_url: url.to_string(),
                        final_url: url.to_string(),
                        status: 200,
                        content_type: Some("text/html".to_string()),
                        byte_len: html.len() as u64,
                        encoding_label: "UTF-8".to_string(),
                    },
                })
            }
            Some(Route::Fail(kind)) => Err(ScrapeError::new(*kind, "stub failure")),
            Some(Route::Hang) => std::future::pending().await,
            None => Err(ScrapeError::new(ErrorKind::Unexpected, "no route")),
        }
    }
}

fn scraper(routes: Vec<(&'static str, Route)>) -> Scraper {
    scrape_logging::initialize_for_tests();
    let fetcher = StubFetcher {
        routes: routes.into_iter().collect(),
    };
    let runner = BatchRunner::new(
        Arc::new(fetcher),
        Arc::new(HeadingParagraphExtractor),
        BatchSettings::default(),
    );
    Scraper::from_runner(runner).unwrap()
}

#[test]
fn run_one_blocks_until_report_is_ready() {
    let scraper = scraper(vec![(
        "a",
        Route::Page("<title>A</title><h2>Sub</h2><p>Body</p>"),
    )]);

    assert_eq!(
        scraper.run_one("a"),
        "Title:\nA\nHeadings:\nSub\nParagraphs:\nBody"
    );
    assert!(matches!(scraper.scrape("a"), ScrapeOutcome::Success(_)));
}

#[test]
fn run_many_reports_every_url_in_order() {
    let scraper = scraper(vec![
        ("a", Route::Page("<title>A</title>")),
        ("b", Route::Fail(ErrorKind::Timeout)),
    ]);

    assert_eq!(
        scraper.run_many(["a", "", "b"]),
        "a:\nTitle:\nA\nHeadings:\nParagraphs:\n\nb:\nError: stub failure"
    );
}

#[test]
fn cancel_from_another_thread_stops_a_hanging_batch() {
    let scraper = scraper(vec![
        ("done", Route::Page("<title>Done</title>")),
        ("stuck", Route::Hang),
        ("later", Route::Page("<title>Later</title>")),
    ]);
    let token = scraper.cancel_token();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    let started = Instant::now();
    let cancelled = scraper
        .run_batch(["done", "stuck", "later"])
        .expect_err("batch is cancelled");
    assert!(started.elapsed() < Duration::from_secs(5));
    canceller.join().unwrap();

    assert_eq!(cancelled.total, 3);
    assert_eq!(cancelled.partial.len(), 1);
    assert_eq!(cancelled.partial.entries[0].url, "done");

    // The token is one-shot: later batches on this scraper stop at once.
    let again = scraper.run_batch(["done"]).expect_err("still cancelled");
    assert!(again.partial.is_empty());
    assert_eq!(again.total, 1);
    assert_eq!(scraper.run_many(["done"]), "");
}
