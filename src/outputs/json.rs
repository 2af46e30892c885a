//! JSON output for API-style consumers.
//!
//! The report mirrors the `{ success, count, products }` envelope the web
//! front end already reads, plus the topic and generation time.

use crate::models::CrawlReport;
use tracing::{debug, instrument};

/// Serialize a [`CrawlReport`] as pretty-printed JSON.
#[instrument(level = "debug", skip_all, fields(count = report.count))]
pub fn render(report: &CrawlReport) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(report)?;
    debug!(bytes = json.len(), "Rendered JSON report");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedRecord, Source};

    #[test]
    fn test_render_envelope() {
        let report = CrawlReport::new(
            Some("ai".into()),
            vec![NormalizedRecord::new("Copyly", "https://copyly.example/", Source::AppSumo)],
        );
        let json = render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["count"], 1);
        assert_eq!(value["topic"], "ai");
        assert_eq!(value["products"][0]["name"], "Copyly");
        assert_eq!(value["products"][0]["source"], "AppSumo");
    }

    #[test]
    fn test_render_round_trips() {
        let report = CrawlReport::new(None, Vec::new());
        let back: CrawlReport = serde_json::from_str(&render(&report).unwrap()).unwrap();
        assert_eq!(back.count, 0);
        assert_eq!(back.topic, None);
        assert_eq!(back.generated_at, report.generated_at);
    }
}
