//! Resolve pages, tracklist files or references into catalog tracks.

use std::path::Path;
use std::sync::Arc;

use console::style;

use crate::cli::progress::SpinnerObserver;
use crate::config::Config;

use super::build_pipeline;

fn is_uri(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

pub async fn cmd_resolve(
    config: &Config,
    input: &str,
    pages: Option<u32>,
    strict: bool,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if strict {
        config.resolve.skip_not_found = false;
    }

    let spinner = Arc::new(SpinnerObserver::new(format!("Resolving {}...", input)));
    let pipeline = build_pipeline(&config, spinner.clone())?;

    let result = if is_uri(input) {
        pipeline.extract_and_resolve(input, pages).await
    } else if Path::new(input).is_file() {
        let text = tokio::fs::read_to_string(input).await?;
        pipeline.resolve_text(&text).await
    } else {
        pipeline.resolve_text(input).await
    };
    spinner.finish();
    let tracks = result?;

    for track in &tracks {
        println!("{}\t{}", style(&track.uri).dim(), track);
    }
    eprintln!("{} {} tracks", style("✓").green(), tracks.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_uri() {
        assert!(is_uri("https://www.last.fm/music/Low"));
        assert!(!is_uri("Low - Lullaby"));
        assert!(!is_uri("tracklist.txt"));
    }
}
