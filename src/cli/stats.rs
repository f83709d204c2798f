use anyhow::Result;

use rejoinder::config::RejoinderConfig;
use rejoinder::engine::stats::file_statistics;

/// Display store statistics in the terminal. Read-only.
pub fn stats(config: &RejoinderConfig) -> Result<()> {
    let path = config.resolved_store_path();
    if !path.exists() {
        println!("Store: not found at {}", path.display());
        println!("Run `rejoinder serve` once to create an empty store.");
        return Ok(());
    }

    let (store, stats) = file_statistics(&path)?;

    println!("Store Statistics");
    println!("{}", "=".repeat(40));
    println!("  Conversations:       {}", stats.total_conversations);
    println!("  Categories:          {}", stats.categories);
    println!("  Patterns:            {}", stats.total_patterns);
    println!("  Responses:           {}", stats.total_responses);
    println!("  Store size:          {:.2} KB", stats.database_size_kb);
    println!();

    println!("By Category:");
    for (category, groups) in &store.knowledge_base {
        let patterns: usize = groups.iter().map(|g| g.patterns.len()).sum();
        println!("  {:<20} {} groups, {} patterns", category, groups.len(), patterns);
    }

    Ok(())
}
