use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use super::{run_chain, Strategy};
use crate::dom::{self, Dom};
use crate::names::clean_text;

static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static ALERT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".alert").unwrap());

static NAME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(nom(?:\s+et\s+prénom)?|name)\s*:?$").unwrap());
// "N°Apogée : 123… Filière : XX <br> Prénom Nom" rendered as one run of raw text.
static LABELED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)N°\s*Apogée\s*:\s*\d+[^<]*Filière\s*:\s*[^\s<]+\s*(?:<br[^>]*>)?\s*([^<&]+)")
        .unwrap()
});

const CHAIN: &[(&str, Strategy<String>)] = &[
    ("labeled-cell", labeled_cell),
    ("alert-banner", alert_banner),
    ("raw-label", raw_label),
];

/// Student display name, or the explicit unknown-identity placeholder
/// built from the requested id when every strategy misses.
pub fn extract(dom: &Dom, requested_id: &str) -> String {
    run_chain(dom, "student_name", CHAIN)
        .unwrap_or_else(|| format!("Étudiant {requested_id}"))
}

/// Minimum validity shared by all strategies: more than 2 characters once
/// trimmed and stripped of entity artifacts.
fn valid(raw: &str) -> Option<String> {
    let name = clean_text(raw);
    (name.chars().count() > 2).then_some(name)
}

/// A table cell labeled "Nom"/"Name" followed by a sibling cell holding
/// the value.
fn labeled_cell(dom: &Dom) -> Option<String> {
    for row in dom.select(&TR_SEL) {
        let cells: Vec<_> = row.select(&CELL_SEL).collect();
        for pair in cells.windows(2) {
            let label = clean_text(&dom::element_text(pair[0]));
            if NAME_LABEL_RE.is_match(&label) {
                if let Some(name) = valid(&dom::element_text(pair[1])) {
                    return Some(name);
                }
            }
        }
    }
    None
}

/// The informational alert banner: the text after "Filière :" carries the
/// filière code and then the student name.
fn alert_banner(dom: &Dom) -> Option<String> {
    for alert in dom.select(&ALERT_SEL) {
        let text = dom::element_text(alert);
        let Some((_, after)) = text.split_once("Filière") else {
            continue;
        };
        let Some((_, rest)) = after.split_once(':') else {
            continue;
        };
        let mut tokens = rest.split_whitespace();
        tokens.next(); // filière code
        let name = tokens.collect::<Vec<_>>().join(" ");
        if let Some(name) = valid(&name) {
            return Some(name);
        }
    }
    None
}

/// Raw-text escape hatch for documents whose banner never makes it into
/// the parse tree.
fn raw_label(dom: &Dom) -> Option<String> {
    LABELED_NAME_RE
        .captures(dom.raw())
        .and_then(|caps| valid(&caps[1]))
}

// ── Tests ──
