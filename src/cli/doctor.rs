//! CLI `doctor` command: check the store file and print a health report.

use anyhow::Result;

use rejoinder::config::RejoinderConfig;
use rejoinder::store::{self, StoreError};

/// Check the store file and print a health report.
///
/// Unlike the server, this never rewrites a missing or malformed file.
pub fn doctor(config: &RejoinderConfig) -> Result<()> {
    let path = config.resolved_store_path();

    if !path.exists() {
        println!("Store: not found at {}", path.display());
        println!("Run `rejoinder serve` once to create an empty store.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    println!("Rejoinder Health Report");
    println!("=======================");
    println!();
    println!("Store:             {}", path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!();

    let (data, report) = match store::read_store_file(&path) {
        Ok(loaded) => loaded,
        Err(e @ StoreError::Malformed { .. }) => {
            println!("Parse check:       FAILED ({e})");
            println!();
            println!("The server will replace this file with an empty store on startup.");
            println!("Fix the JSON or restore a backup before starting it.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Parse check:       PASSED");
    println!();
    println!("Row counts:");
    println!("  Categories:      {}", data.knowledge_base.len());
    println!(
        "  Groups:          {}",
        data.knowledge_base.values().map(Vec::len).sum::<usize>()
    );
    println!("  Conversations:   {}", data.messages.len());
    println!();

    let unmatchable: Vec<(&str, usize)> = data
        .knowledge_base
        .iter()
        .flat_map(|(category, groups)| {
            groups
                .iter()
                .enumerate()
                .filter(|(_, g)| !g.is_matchable())
                .map(move |(i, _)| (category.as_str(), i))
        })
        .collect();

    if report.is_clean() && unmatchable.is_empty() {
        println!("Entry check:       PASSED");
        return Ok(());
    }

    println!("Entry check:       WARNINGS");
    if report.skipped_categories > 0 {
        println!("  {} categories are not arrays and are ignored", report.skipped_categories);
    }
    if report.skipped_groups > 0 {
        println!("  {} groups are malformed and are ignored", report.skipped_groups);
    }
    if report.skipped_messages > 0 {
        println!("  {} conversation records are malformed and are ignored", report.skipped_messages);
    }
    for (category, index) in unmatchable {
        println!("  {category}[{index}] lacks patterns or responses and never matches");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
