use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;

use super::{run_chain, Strategy};
use crate::classify;
use crate::dom::{self, Dom};
use crate::model::{Subject, SubjectStatus};
use crate::names::{normalize_subject, SeenNames};

static CARD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".card").unwrap());
static CARD_HEADER_B_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".card-header b").unwrap());
static CARD_HEADER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".card-header").unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tr").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

static BARE_GRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)?$").unwrap());
static SLASH20_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)\s*/\s*20").unwrap());
// Raw-markup fallbacks for documents whose card structure never reaches
// the parse tree (truncated templates, unclosed comments).
static RAW_CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<div class=['"][^'"]*card[^'"]*['"][^>]*>.*?<div class=['"]card-header['"][^>]*>(.*?)</div>.*?<div class=['"]card-body['"][^>]*>(.*?)</div>"#,
    )
    .unwrap()
});
static RAW_GRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\d+(?:[.,]\d+)?)\s*(?:<[^>]*>)*\s*/\s*20").unwrap());
static TAG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Words marking a table row as a header/label row rather than a subject.
const HEADER_WORDS: &[&str] = &["module", "matière", "matiere", "note", "statut"];

const CHAIN: &[(&str, Strategy<Vec<Subject>>)] = &[
    ("cards", from_cards),
    ("table-rows", from_table_rows),
    ("raw-cards", from_raw_cards),
];

/// Deduplicated subject list. Strategies fall through on zero yield and
/// are never combined; an empty return means the whole chain missed.
pub fn extract(dom: &Dom) -> Vec<Subject> {
    let subjects = run_chain(dom, "subjects", CHAIN).unwrap_or_default();
    debug!(count = subjects.len(), "subject extraction finished");
    subjects
}

/// Card-based template: one `.card` per subject, name in the header,
/// grade and pass/fail hints on the labeled result rows.
fn from_cards(dom: &Dom) -> Option<Vec<Subject>> {
    let mut seen = SeenNames::new();
    let mut subjects = Vec::new();

    for card in dom.select(&CARD_SEL) {
        let header = card
            .select(&CARD_HEADER_B_SEL)
            .next()
            .or_else(|| card.select(&CARD_HEADER_SEL).next())
            .map(dom::element_text)
            .unwrap_or_default();
        let name = normalize_subject(&header);
        if name.chars().count() < 2 || !seen.insert(&name) {
            continue;
        }

        let mut grade = None;
        let mut marker = None;

        for row in card.select(&ROW_SEL) {
            let cell_texts: Vec<String> = row.select(&TD_SEL).map(dom::element_text).collect();
            let row_text = cell_texts.join(" ");
            if !is_result_row(&row_text) {
                continue;
            }
            for cell in &cell_texts {
                if let Some(g) = bare_grade(cell) {
                    grade = Some(g);
                }
            }
            if marker.is_none() {
                marker = classify::explicit_status(&row_text, &dom::element_classes(row));
            }
        }

        // Some templates only render the grade as "N/20" in the card body;
        // the last occurrence is the module result.
        if grade.is_none() {
            grade = SLASH20_RE
                .captures_iter(&dom::element_text(card))
                .last()
                .and_then(|caps| classify::parse_grade(&caps[1]));
        }

        let status = marker.unwrap_or_else(|| classify::derive_status(grade));
        subjects.push(Subject { name, grade, status });
    }

    (!subjects.is_empty()).then_some(subjects)
}

/// Plain-table template: 2–3 cells per row, name / grade / optional
/// status. Header rows are recognized by their label words and skipped.
fn from_table_rows(dom: &Dom) -> Option<Vec<Subject>> {
    let mut seen = SeenNames::new();
    let mut subjects = Vec::new();

    for row in dom.select(&ROW_SEL) {
        let cells: Vec<ElementRef> = row.select(&TD_SEL).collect();
        if !(2..=3).contains(&cells.len()) {
            continue;
        }
        let name = normalize_subject(&dom::element_text(cells[0]));
        if name.chars().count() <= 3 || is_header_name(&name) || !seen.insert(&name) {
            continue;
        }

        let grade = classify::parse_grade(&dom::element_text(cells[1]));
        // Markers can sit in the grade cell of a 2-cell row (a bare "NV"
        // instead of a number), so every non-name cell is consulted, same
        // as the card strategy reads its whole result row.
        let marker_text = cells[1..]
            .iter()
            .map(|cell| dom::element_text(*cell))
            .collect::<Vec<_>>()
            .join(" ");
        let mut classes = dom::element_classes(row);
        for cell in &cells[1..] {
            classes.extend(dom::element_classes(*cell));
        }
        let status = classify::explicit_status(&marker_text, &classes)
            .unwrap_or_else(|| classify::derive_status(grade));

        subjects.push(Subject { name, grade, status });
    }

    (!subjects.is_empty()).then_some(subjects)
}

/// Last resort: pair card-header blocks with body grade patterns straight
/// from the raw markup, for documents with no usable tree at all.
fn from_raw_cards(dom: &Dom) -> Option<Vec<Subject>> {
    let mut seen = SeenNames::new();
    let mut subjects = Vec::new();

    for caps in RAW_CARD_RE.captures_iter(dom.raw()) {
        let name = normalize_subject(&strip_tags(&caps[1]));
        if name.chars().count() < 2 || !seen.insert(&name) {
            continue;
        }

        let body = &caps[2];
        let grade = RAW_GRADE_RE
            .captures_iter(body)
            .last()
            .and_then(|caps| classify::parse_grade(&caps[1]));
        let status = raw_status_hint(body)
            .or_else(|| classify::text_marker(&strip_tags(body)))
            .unwrap_or_else(|| classify::derive_status(grade));

        subjects.push(Subject { name, grade, status });
    }

    (!subjects.is_empty()).then_some(subjects)
}

/// Rows labeled as the module result line, in either locale.
fn is_result_row(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("résultat") || lower.contains("resultat") || text.contains("نتيجة")
}

fn is_header_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    HEADER_WORDS.iter().any(|word| lower.contains(word))
}

/// A cell holding nothing but a number is the module grade.
fn bare_grade(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    BARE_GRADE_RE
        .is_match(trimmed)
        .then(|| classify::parse_grade(trimmed))
        .flatten()
}

/// In raw markup the contextual classes only occur as attribute text, so
/// a substring scan stands in for the structural class check.
fn raw_status_hint(body: &str) -> Option<SubjectStatus> {
    for (class, status) in classify::CLASS_MARKERS {
        if body.contains(class) {
            return Some(*status);
        }
    }
    None
}

fn strip_tags(markup: &str) -> String {
    TAG_STRIP_RE.replace_all(markup, " ").to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubjectStatus;

    #[test]
    fn card_with_labeled_result_row() {
        let dom = Dom::parse(
            "<div class=\"card bg-light\">\
               <div class=\"card-header\"><b>S3.GR2 Économie Générale</b></div>\
               <div class=\"card-body\"><table>\
                 <tr><td>Note de l'examen</td> <td>14,5/20</td></tr>\
                 <tr class=\"text-success\"><td>Résultat du module</td> <td>14,5</td> <td>Validé</td></tr>\
               </table></div>\
             </div>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].name, "Économie Générale");
        assert_eq!(subjects[0].grade, Some(14.5));
        assert_eq!(subjects[0].status, SubjectStatus::Passed);
    }

    #[test]
    fn explicit_marker_outranks_passing_grade() {
        let dom = Dom::parse(
            "<div class=\"card\">\
               <div class=\"card-header\"><b>Comptabilité Analytique</b></div>\
               <div class=\"card-body\"><table>\
                 <tr><td>Résultat</td> <td>12,5</td> <td>Non validé</td></tr>\
               </table></div>\
             </div>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects[0].grade, Some(12.5));
        assert_eq!(subjects[0].status, SubjectStatus::Failed);
    }

    #[test]
    fn card_grade_falls_back_to_slash20_text() {
        let dom = Dom::parse(
            "<div class=\"card\">\
               <div class=\"card-header\"><b>Micro-économie</b></div>\
               <div class=\"card-body\">Moyenne : 09,75/20</div>\
             </div>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects[0].grade, Some(9.75));
        assert_eq!(subjects[0].status, SubjectStatus::Failed);
    }

    #[test]
    fn duplicate_cards_collapse_to_one_subject() {
        let dom = Dom::parse(
            "<div class=\"card\"><div class=\"card-header\"><b>S1.GR1 Analyse</b></div>\
               <div class=\"card-body\">12/20</div></div>\
             <div class=\"card\"><div class=\"card-header\"><b>Analyse</b></div>\
               <div class=\"card-body\">12/20</div></div>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].name, "Analyse");
    }

    #[test]
    fn table_rows_without_markers_use_derived_rule() {
        let dom = Dom::parse(
            "<table>\
               <tr><td>Module</td><td>Note</td></tr>\
               <tr><td>Statistiques</td><td>08</td></tr>\
               <tr><td>Droit Commercial</td><td>12,25</td></tr>\
             </table>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].name, "Statistiques");
        assert_eq!(subjects[0].grade, Some(8.0));
        assert_eq!(subjects[0].status, SubjectStatus::Failed);
        assert_eq!(subjects[1].status, SubjectStatus::Passed);
    }

    #[test]
    fn marker_in_grade_cell_of_two_cell_row_is_honored() {
        let dom = Dom::parse(
            "<table>\
               <tr><td>Statistiques Descriptives</td><td>NV</td></tr>\
               <tr><td>Économie Monétaire</td><td>ABI</td></tr>\
             </table>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects[0].grade, None);
        assert_eq!(subjects[0].status, SubjectStatus::Failed);
        assert_eq!(subjects[1].status, SubjectStatus::UnjustifiedAbsence);
    }

    #[test]
    fn third_cell_status_code_is_used() {
        let dom = Dom::parse(
            "<table><tr><td>Informatique de Gestion</td><td>ABJ</td><td>ABJ</td></tr></table>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects[0].grade, None);
        assert_eq!(subjects[0].status, SubjectStatus::JustifiedAbsence);
    }

    #[test]
    fn out_of_range_grade_treated_as_absent() {
        let dom = Dom::parse(
            "<table><tr><td>Théorie des Organisations</td><td>99</td></tr></table>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects[0].grade, None);
        // No marker and no usable grade: historical default.
        assert_eq!(subjects[0].status, SubjectStatus::Passed);
    }

    #[test]
    fn short_table_names_rejected() {
        let dom = Dom::parse("<table><tr><td>Eco</td><td>12</td></tr></table>");
        assert!(extract(&dom).is_empty());
    }

    #[test]
    fn raw_cards_reached_when_tree_is_swallowed() {
        let dom = Dom::parse(
            "<html><body><!-- template truncated\
             <div class='card bg-light'>\
               <div class='card-header'><b>S1.GR1 Analyse Mathématique</b></div>\
               <div class='card-body'>Note finale : 11,5/20 text-success</div>\
             </div>\
             <div class='card bg-light'>\
               <div class='card-header'><b>Micro-économie</b></div>\
               <div class='card-body'>Note finale : 09/20 text-danger</div>\
             </div>",
        );
        let subjects = extract(&dom);
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].name, "Analyse Mathématique");
        assert_eq!(subjects[0].grade, Some(11.5));
        assert_eq!(subjects[0].status, SubjectStatus::Passed);
        assert_eq!(subjects[1].name, "Micro-économie");
        assert_eq!(subjects[1].status, SubjectStatus::Failed);
    }

    #[test]
    fn no_structure_at_all_yields_empty() {
        let dom = Dom::parse("<html><body><p>Aucun résultat disponible.</p></body></html>");
        assert!(extract(&dom).is_empty());
    }
}
