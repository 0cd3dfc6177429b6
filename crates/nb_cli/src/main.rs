use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use nb_browser::{CdpDriver, HttpFetcher};
use nb_core::workitem::parse_sections;
use nb_core::{BrowserDriver, Error, Result, WorkItem};
use nb_export::{archive_images, XlsxSink};
use nb_pipeline::{DateWindow, NewsSearch, PaginationController, SiteConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const WORKBOOK_NAME: &str = "news_data.xlsx";
const IMAGE_DIR_NAME: &str = "images";
const ARCHIVE_NAME: &str = "images.zip";
const ERROR_SCREENSHOT_NAME: &str = "error_screenshot.png";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Search a news site for a phrase and export matching articles"
)]
struct Cli {
    /// Path to the work-item JSON file (phrase, section, months)
    #[arg(long, default_value = "workitem.json")]
    work_item: PathBuf,

    /// Output directory for the workbook, image archive and diagnostics
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Search phrase, overriding the one in the work item
    #[arg(long)]
    phrase: Option<String>,

    /// Comma-separated section names, overriding the work item
    #[arg(long)]
    section: Option<String>,

    /// Months back to keep, overriding the work item
    #[arg(long)]
    months: Option<i32>,
}

/// Command-line overrides win over the work-item file, field by field.
fn apply_overrides(mut work_item: WorkItem, cli: &Cli) -> Result<WorkItem> {
    if let Some(phrase) = &cli.phrase {
        if phrase.trim().is_empty() {
            return Err(Error::InvalidInput(
                "--phrase must not be empty".to_string(),
            ));
        }
        work_item.phrase = phrase.clone();
    }
    if let Some(section) = &cli.section {
        work_item.sections = parse_sections(section);
    }
    if let Some(months) = cli.months {
        work_item.months = months;
    }
    Ok(work_item)
}

async fn run(
    browser: Arc<CdpDriver>,
    work_item: &WorkItem,
    window: &DateWindow,
    output: &Path,
    image_dir: &Path,
) -> Result<usize> {
    let search = NewsSearch::new(browser, SiteConfig::default());

    info!("opening the website");
    search.open().await?;

    info!("searching for the phrase {:?}", work_item.phrase);
    search.search(&work_item.phrase).await?;

    info!(
        "applying filters, sections {:?}, months {}",
        work_item.sections, work_item.months
    );
    search.sort_newest().await?;
    search.select_sections(&work_item.sections).await?;

    let fetcher = HttpFetcher::new();
    let sink = XlsxSink::new(output.join(WORKBOOK_NAME));
    let controller = PaginationController::new(
        &search,
        &fetcher,
        &sink,
        window,
        &work_item.phrase,
        image_dir.to_path_buf(),
    );
    controller.run().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let work_item = apply_overrides(WorkItem::from_file(&cli.work_item)?, &cli)?;
    // Fails fast on a negative months value, before any scraping starts.
    let window = DateWindow::build(work_item.months, Local::now().date_naive())?;

    let image_dir = cli.output.join(IMAGE_DIR_NAME);
    std::fs::create_dir_all(&image_dir)?;

    let browser = Arc::new(CdpDriver::launch(cli.headless).await?);

    let outcome = run(browser.clone(), &work_item, &window, &cli.output, &image_dir).await;

    match outcome {
        Ok(total) => {
            archive_images(&image_dir, &cli.output.join(ARCHIVE_NAME))?;
            browser.close().await?;
            info!("run complete, {total} records exported");
            Ok(())
        }
        Err(Error::NoResultsFound(message)) => {
            info!("{message}");
            info!("ending the process");
            browser.close().await?;
            Ok(())
        }
        Err(e) => {
            // Pages exported before the failure stay on disk; capture a
            // diagnostic screenshot and re-raise.
            let screenshot = cli.output.join(ERROR_SCREENSHOT_NAME);
            if let Err(shot_err) = browser.screenshot(&screenshot).await {
                error!("could not capture diagnostic screenshot: {shot_err}");
            }
            if let Err(close_err) = browser.close().await {
                error!("could not close the browser: {close_err}");
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_item() -> WorkItem {
        WorkItem::from_json(r#"{"phrase": "gold", "section": "Metro", "months": 1}"#).unwrap()
    }

    #[test]
    fn test_overrides_win_over_work_item() {
        let cli = Cli::parse_from([
            "newsbot",
            "--phrase",
            "silver rush",
            "--section",
            "Sports, Business",
            "--months",
            "3",
        ]);

        let item = apply_overrides(work_item(), &cli).unwrap();
        assert_eq!(item.phrase, "silver rush");
        assert_eq!(item.sections, vec!["Sports", "Business"]);
        assert_eq!(item.months, 3);
    }

    #[test]
    fn test_absent_overrides_keep_work_item_values() {
        let cli = Cli::parse_from(["newsbot"]);

        let item = apply_overrides(work_item(), &cli).unwrap();
        assert_eq!(item.phrase, "gold");
        assert_eq!(item.sections, vec!["Metro"]);
        assert_eq!(item.months, 1);
    }

    #[test]
    fn test_empty_phrase_override_rejected() {
        let cli = Cli::parse_from(["newsbot", "--phrase", " "]);

        let err = apply_overrides(work_item(), &cli).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
