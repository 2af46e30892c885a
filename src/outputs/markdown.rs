//! Markdown table output.

use crate::models::{CrawlReport, NormalizedRecord};
use itertools::Itertools;
use std::fmt::Write;

/// Escape characters that would break a table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Percent-encode characters that would end a link target or split the row.
fn link_target(url: &str) -> String {
    url.chars()
        .map(|c| match c {
            '|' => "%7C".to_string(),
            '(' => "%28".to_string(),
            ')' => "%29".to_string(),
            ' ' => "%20".to_string(),
            other => other.to_string(),
        })
        .collect()
}

fn row(record: &NormalizedRecord) -> String {
    let popularity = record
        .votes_or_reviews
        .as_ref()
        .map(|p| p.to_string())
        .unwrap_or_default();
    let launched = record
        .launch_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    [
        format!("[{}]({})", cell(&record.name), link_target(&record.url)),
        record.source.to_string(),
        cell(&record.summary),
        cell(record.price.as_deref().unwrap_or_default()),
        cell(&popularity),
        launched,
    ]
    .iter()
    .join(" | ")
}

/// Render a report as a Markdown document with one table row per product.
pub fn render(report: &CrawlReport) -> String {
    let mut md = String::new();
    let heading = match &report.topic {
        Some(topic) => format!("# Products for \"{}\"", topic.trim()),
        None => "# Trending products".to_string(),
    };
    writeln!(md, "{heading}\n").unwrap();
    writeln!(
        md,
        "_{} products, generated {}_\n",
        report.count,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    )
    .unwrap();

    if report.products.is_empty() {
        writeln!(md, "No products found.").unwrap();
        return md;
    }

    writeln!(md, "| Product | Source | Summary | Price | Popularity | Launched |").unwrap();
    writeln!(md, "|---|---|---|---|---|---|").unwrap();
    for record in &report.products {
        writeln!(md, "| {} |", row(record)).unwrap();
    }
    md
}
