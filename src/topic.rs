//! Topic normalization.
//!
//! The two sources tokenize topics differently: Product Hunt keyword search
//! wants space-separated words, AppSumo search wants a hyphen slug. A single
//! caller topic is turned into both forms up front so each adapter receives
//! exactly the syntax it expects.
//!
//! Both normalizations are pure, total and idempotent. Characters outside
//! the handled set (unicode, punctuation) pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;

static HYPHENS_OR_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]+").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// The per-source renditions of one caller topic. `None` means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicQuery {
    /// Space-joined keywords, e.g. `"health and fitness"`.
    pub structured: Option<String>,
    /// Hyphen-joined slug, e.g. `"health-and-fitness"`.
    pub unstructured: Option<String>,
}

impl TopicQuery {
    pub fn from_topic(topic: Option<&str>) -> Self {
        match topic {
            Some(t) => Self {
                structured: for_structured(t),
                unstructured: for_unstructured(t),
            },
            None => Self::default(),
        }
    }
}

fn lower_and_expand_ampersand(topic: &str) -> String {
    topic.to_lowercase().replace('&', "and")
}

/// Lower-case, `&` to `and`, hyphens and whitespace runs to single spaces.
pub fn for_structured(topic: &str) -> Option<String> {
    let lowered = lower_and_expand_ampersand(topic);
    let spaced = HYPHENS_OR_WHITESPACE.replace_all(&lowered, " ");
    non_empty(spaced.trim())
}

/// Lower-case, `&` to `and`, whitespace runs to single hyphens.
pub fn for_unstructured(topic: &str) -> Option<String> {
    let lowered = lower_and_expand_ampersand(topic);
    let slug = WHITESPACE.replace_all(lowered.trim(), "-");
    non_empty(&slug)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_form() {
        assert_eq!(for_structured("Health & Fitness").as_deref(), Some("health and fitness"));
        assert_eq!(
            for_structured("artificial-intelligence").as_deref(),
            Some("artificial intelligence")
        );
        assert_eq!(for_structured("  Dev -- Tools\t ").as_deref(), Some("dev tools"));
        assert_eq!(for_structured("-marketing-").as_deref(), Some("marketing"));
    }

    #[test]
    fn test_unstructured_form() {
        assert_eq!(for_unstructured("Health & Fitness").as_deref(), Some("health-and-fitness"));
        assert_eq!(for_unstructured("  AI   Tools ").as_deref(), Some("ai-tools"));
        assert_eq!(for_unstructured("no-code").as_deref(), Some("no-code"));
    }

    #[test]
    fn test_empty_input_means_no_filter() {
        assert_eq!(TopicQuery::from_topic(None), TopicQuery::default());
        let blank = TopicQuery::from_topic(Some("   "));
        assert_eq!(blank.structured, None);
        assert_eq!(blank.unstructured, None);
        assert_eq!(for_structured("---"), None);
        assert_eq!(for_unstructured(""), None);
    }

    #[test]
    fn test_unicode_and_unknown_characters_pass_through() {
        assert_eq!(for_structured("Café+Bar!").as_deref(), Some("café+bar!"));
        assert_eq!(for_unstructured("Über Tools™").as_deref(), Some("über-tools™"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "Health & Fitness",
            "  AI   Tools ",
            "artificial-intelligence",
            "Café+Bar!",
            "R&D -  Ops",
            "marketing",
        ];
        for input in inputs {
            let once = for_structured(input).unwrap();
            assert_eq!(for_structured(&once).as_deref(), Some(once.as_str()));

            let once = for_unstructured(input).unwrap();
            assert_eq!(for_unstructured(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn test_topic_query_derives_both_forms() {
        let q = TopicQuery::from_topic(Some("Design Tools"));
        assert_eq!(q.structured.as_deref(), Some("design tools"));
        assert_eq!(q.unstructured.as_deref(), Some("design-tools"));
    }
}
