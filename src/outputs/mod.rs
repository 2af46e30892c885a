//! Output generation for aggregation reports.
//!
//! # Submodules
//!
//! - [`json`]: the report as pretty-printed JSON
//! - [`markdown`]: the report as a Markdown table
//!
//! Rendered output goes to stdout unless an output path is given.

pub mod json;
pub mod markdown;

use crate::cli::OutputFormat;
use crate::models::CrawlReport;
use crate::utils::ensure_writable_parent;
use std::error::Error;
use tokio::fs;
use tokio::io::{AsyncWriteExt, stdout};
use tracing::{error, info, instrument};

/// Render `report` in `format`.
pub fn render(report: &CrawlReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => Ok(markdown::render(report)),
    }
}

/// Write rendered output to `path`, or to stdout when `path` is `None`.
#[instrument(level = "info", skip_all, fields(path = path.unwrap_or("-")))]
pub async fn emit(rendered: &str, path: Option<&str>) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) => {
            ensure_writable_parent(path).await?;
            if let Err(e) = fs::write(path, rendered).await {
                error!(%path, error = %e, "Failed writing report");
                return Err(e.into());
            }
            info!(%path, bytes = rendered.len(), "Wrote report");
        }
        None => {
            let mut out = stdout();
            out.write_all(rendered.as_bytes()).await?;
            if !rendered.ends_with('\n') {
                out.write_all(b"\n").await?;
            }
            out.flush().await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedRecord, Source};

    #[test]
    fn test_render_dispatches_on_format() {
        let report = CrawlReport::new(
            None,
            vec![NormalizedRecord::new("A", "https://a.example/", Source::AppSumo)],
        );
        assert!(render(&report, OutputFormat::Json).unwrap().starts_with('{'));
        assert!(render(&report, OutputFormat::Markdown).unwrap().starts_with('#'));
    }

    #[tokio::test]
    async fn test_emit_writes_file() {
        let dir = std::env::temp_dir().join(format!("launch_radar_emit_{}", std::process::id()));
        let path = dir.join("report.md");
        emit("# hi", Some(path.to_str().unwrap())).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
