//! Print the intermediate tracklist for a page.

use std::sync::Arc;

use console::style;

use crate::cli::progress::SpinnerObserver;
use crate::config::Config;

use super::build_pipeline;

pub async fn cmd_scrape(config: &Config, uri: &str, pages: Option<u32>) -> anyhow::Result<()> {
    let spinner = Arc::new(SpinnerObserver::new(format!("Crawling {}...", uri)));
    let pipeline = build_pipeline(config, spinner.clone())?;

    let source = pipeline.source(uri, pages)?;
    let result = pipeline.extract(&source).await;
    spinner.finish();
    let buffer = result?;

    if buffer.is_empty() {
        eprintln!("{} No tracks found on {}", style("!").yellow(), uri);
        return Ok(());
    }

    print!("{}", buffer);
    eprintln!(
        "{} {} lines from {}",
        style("✓").green(),
        buffer.lines().count(),
        uri
    );
    Ok(())
}
