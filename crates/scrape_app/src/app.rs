use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use scrape_engine::{format_batch, persist_report, read_url_list, BatchRunner, Scraper};
use scrape_logging::{scrape_error, scrape_info, scrape_warn};

use crate::config::AppConfig;
use crate::progress::LogProgressSink;
use crate::{Cli, Command};

/// Exit status when the report was produced but could not be saved.
const EXIT_SAVE_FAILED: u8 = 2;
/// Exit status after Ctrl-C aborted a batch.
const EXIT_CANCELLED: u8 = 130;

pub fn run(cli: Cli) -> ExitCode {
    let (report, cancelled) = match scrape(&cli) {
        Ok(result) => result,
        Err(err) => {
            scrape_error!("{:#}", err);
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    if report.is_empty() {
        scrape_info!("no urls to scrape; report is empty");
    } else {
        println!("{report}");
    }

    if let Some(output) = &cli.output {
        if let Err(err) = save(&report, output, cli.compress) {
            // Scrape failures live inside the report; this one concerns the file.
            scrape_error!("{:#}", err);
            eprintln!("error: {err:#}");
            return ExitCode::from(EXIT_SAVE_FAILED);
        }
    }

    if cancelled {
        ExitCode::from(EXIT_CANCELLED)
    } else {
        ExitCode::SUCCESS
    }
}

/// Returns the report and whether the batch was cut short.
fn scrape(cli: &Cli) -> Result<(String, bool)> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }

    match &cli.command {
        Command::Url { url } => {
            let scraper = build_scraper(&config, 1)?;
            Ok((scraper.run_one(url), false))
        }
        Command::Csv { file } => {
            let urls = read_url_list(file)?;
            let total = urls.iter().filter(|url| !url.trim().is_empty()).count();
            let scraper = build_scraper(&config, total)?;
            cancel_on_ctrl_c(&scraper);

            match scraper.run_batch(urls) {
                Ok(result) => Ok((format_batch(&result), false)),
                Err(cancelled) => {
                    scrape_warn!("{}; reporting completed urls only", cancelled);
                    Ok((format_batch(&cancelled.partial), true))
                }
            }
        }
    }
}

fn build_scraper(config: &AppConfig, total: usize) -> Result<Scraper> {
    let runner = BatchRunner::with_settings(config.fetch_settings(), config.batch_settings())
        .with_progress(Arc::new(LogProgressSink::new(total)));
    Scraper::from_runner(runner).context("failed to start async runtime")
}

fn cancel_on_ctrl_c(scraper: &Scraper) {
    let token = scraper.cancel_token();
    scraper.runtime_handle().spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            scrape_warn!("interrupt received, cancelling batch");
            token.cancel();
        }
    });
}

fn save(report: &str, output: &Path, compressed: bool) -> Result<()> {
    let destination = with_default_extension(output, compressed);
    persist_report(report, &destination, compressed)
        .with_context(|| format!("failed to save report to {}", destination.display()))?;
    eprintln!("report saved to {}", destination.display());
    Ok(())
}

/// `report` -> `report.txt` / `report.txt.gz`; explicit extensions are kept.
fn with_default_extension(path: &Path, compressed: bool) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    let extension = if compressed { "txt.gz" } else { "txt" };
    path.with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_extension_depends_on_compression() {
        assert_eq!(
            with_default_extension(Path::new("out/report"), false),
            PathBuf::from("out/report.txt")
        );
        assert_eq!(
            with_default_extension(Path::new("out/report"), true),
            PathBuf::from("out/report.txt.gz")
        );
        assert_eq!(
            with_default_extension(Path::new("report.log"), true),
            PathBuf::from("report.log")
        );
    }

    #[test]
    fn save_writes_report_with_default_extension() {
        let temp = tempfile::TempDir::new().unwrap();
        save("Error: nope", &temp.path().join("report"), false).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("report.txt")).unwrap(),
            "Error: nope"
        );
    }

    #[test]
    fn save_failure_names_destination() {
        let temp = tempfile::TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = save("r", &blocker.join("report.txt"), false).unwrap_err();
        assert!(err.to_string().starts_with("failed to save report to"));
    }

    #[test]
    fn empty_csv_yields_empty_report() {
        let temp = tempfile::TempDir::new().unwrap();
        let list = temp.path().join("urls.csv");
        fs::write(&list, "\n ,\n").unwrap();
        let cli = Cli {
            command: Command::Csv { file: list },
            output: None,
            compress: false,
            config: None,
            concurrency: None,
            timeout: None,
            log: crate::LogTarget::Terminal,
            verbose: false,
        };
        let (report, cancelled) = scrape(&cli).unwrap();
        assert_eq!(report, "");
        assert!(!cancelled);
    }
}
