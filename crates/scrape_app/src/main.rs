//! `page-scrape`: scrape one url or a CSV list of urls into a text report.

mod app;
mod config;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use scrape_logging::LogDestination;

/// Fetch web pages and extract their title, headings and paragraphs.
#[derive(Parser, Debug)]
#[command(name = "page-scrape", version)]
#[command(about = "Extract title, headings and paragraphs from web pages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Also save the report to this path.
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,

    /// Gzip the saved report.
    #[arg(long, global = true, default_value_t = false)]
    pub compress: bool,

    /// RON settings file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Urls fetched at once in batch mode (overrides the config file).
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Per-url request timeout in seconds (overrides the config file).
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(long, value_enum, global = true, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Debug-level logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape a single url.
    Url { url: String },
    /// Scrape every url in the first column of a CSV file.
    Csv { file: PathBuf },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    scrape_logging::initialize(cli.log.into(), level);
    app::run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_url_mode() {
        let cli = Cli::try_parse_from(["page-scrape", "url", "https://example.com"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Url {
                url: "https://example.com".into()
            }
        );
        assert!(!cli.compress);
        assert_eq!(cli.log, LogTarget::Terminal);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "page-scrape",
            "csv",
            "urls.csv",
            "--output",
            "out/report",
            "--compress",
            "--concurrency",
            "4",
            "--log",
            "both",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Csv {
                file: "urls.csv".into()
            }
        );
        assert_eq!(cli.output, Some(PathBuf::from("out/report")));
        assert!(cli.compress);
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(LogDestination::from(cli.log), LogDestination::Both);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["page-scrape"]).is_err());
    }
}
