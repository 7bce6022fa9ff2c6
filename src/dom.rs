use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z][a-z0-9]*[\s>/]").unwrap());

/// Read-only view over one transcript document: a parsed tree for the
/// structural strategies and the raw text for the regex fallbacks.
pub struct Dom {
    html: Html,
    raw: String,
}

impl Dom {
    /// Parsing never hard-fails: html5ever produces a tree for any input,
    /// and the raw text stays reachable either way so regex strategies can
    /// proceed when the tree is useless.
    pub fn parse(raw: &str) -> Self {
        Dom {
            html: Html::parse_document(raw),
            raw: raw.to_string(),
        }
    }

    pub fn select<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the input looks like markup at all. Drives the distinction
    /// between `MalformedDocument` and `NoSubjectsFound`.
    pub fn has_markup(&self) -> bool {
        TAG_RE.is_match(&self.raw)
    }
}

/// Concatenated text of an element's descendants, untrimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

pub fn element_classes(el: ElementRef<'_>) -> Vec<String> {
    el.value().classes().map(str::to_string).collect()
}

// ── Tests ──
