//! List the sources with dedicated extraction.

use console::style;

use crate::scrapers::registry::{fallback, strategies};

pub fn cmd_sources() -> anyhow::Result<()> {
    println!("\n{}", style("Supported sources").bold());
    println!("{}", "-".repeat(50));
    println!("{:<16} Hosts", "Strategy");
    println!("{}", "-".repeat(50));

    for strategy in strategies() {
        println!("{:<16} {}", strategy.name(), strategy.hosts().join(", "));
    }
    println!(
        "{:<16} {}",
        fallback().name(),
        style("any other page (link text)").dim()
    );
    Ok(())
}
