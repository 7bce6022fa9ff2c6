use std::sync::LazyLock;

use regex::Regex;

use crate::model::SubjectStatus;

static GRADE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)").unwrap());
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(ABI|ABJ|AC|NV|V)\b").unwrap());

/// Textual pass/fail markers, checked strictly in order. Negative variants
/// come first: "non validé" contains "validé" and "غير مستوفاة" contains
/// "مستوفاة", so a naive positive-first check misclassifies them. New
/// locales extend this table.
const TEXT_MARKERS: &[(&str, SubjectStatus)] = &[
    ("non validé", SubjectStatus::Failed),
    ("non valide", SubjectStatus::Failed),
    ("غير مستوفاة", SubjectStatus::Failed),
    ("validé", SubjectStatus::Passed),
    ("valide", SubjectStatus::Passed),
    ("مستوفاة", SubjectStatus::Passed),
];

/// Bootstrap contextual classes the portal puts on result rows, negative
/// first for the same ordering reason as the text markers.
pub(crate) const CLASS_MARKERS: &[(&str, SubjectStatus)] = &[
    ("text-danger", SubjectStatus::Failed),
    ("danger", SubjectStatus::Failed),
    ("text-success", SubjectStatus::Passed),
    ("success", SubjectStatus::Passed),
];

/// First numeric token of `text`, accepting both `.` and `,` as the
/// decimal separator. Values outside [0, 20] are grade-like noise (sums,
/// years) and are treated as absent, never clamped.
pub fn parse_grade(text: &str) -> Option<f64> {
    let caps = GRADE_RE.captures(text)?;
    let value: f64 = caps[1].replace(',', ".").parse().ok()?;
    (0.0..=20.0).contains(&value).then_some(value)
}

/// Explicit status signal from a row's class hints, if any.
pub fn class_hint(classes: &[String]) -> Option<SubjectStatus> {
    for (class, status) in CLASS_MARKERS {
        if classes.iter().any(|c| c == class) {
            return Some(*status);
        }
    }
    None
}

/// Explicit status signal from visible text: locale word markers first,
/// then the portal's short codes (V/NV/AC/ABJ/ABI) as standalone tokens.
pub fn text_marker(text: &str) -> Option<SubjectStatus> {
    let lower = text.to_lowercase();
    for (token, status) in TEXT_MARKERS {
        if lower.contains(token) {
            return Some(*status);
        }
    }
    CODE_RE
        .captures(text)
        .and_then(|caps| status_for_code(&caps[1]))
}

/// Combined explicit signal: class hints outrank word markers. When a
/// row's styling and its visible text disagree, the styling wins — the
/// portal has always rendered the authoritative outcome through the
/// contextual class, and existing consumers rely on that precedence.
pub fn explicit_status(text: &str, classes: &[String]) -> Option<SubjectStatus> {
    class_hint(classes).or_else(|| text_marker(text))
}

/// Fallback policy when the document carries no explicit marker: pass at
/// 10.0 and above, fail below. A row with neither a marker nor a usable
/// grade keeps the portal's historical default of Passed.
pub fn derive_status(grade: Option<f64>) -> SubjectStatus {
    match grade {
        Some(g) if g >= 10.0 => SubjectStatus::Passed,
        Some(_) => SubjectStatus::Failed,
        None => SubjectStatus::Passed,
    }
}

fn status_for_code(code: &str) -> Option<SubjectStatus> {
    match code {
        "V" => Some(SubjectStatus::Passed),
        "NV" => Some(SubjectStatus::Failed),
        "AC" => Some(SubjectStatus::PassedByIntegration),
        "ABJ" => Some(SubjectStatus::JustifiedAbsence),
        "ABI" => Some(SubjectStatus::UnjustifiedAbsence),
        _ => None,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_decimal_separators() {
        assert_eq!(parse_grade("14,5"), Some(14.5));
        assert_eq!(parse_grade("14.5"), Some(14.5));
        assert_eq!(parse_grade("08"), Some(8.0));
        assert_eq!(parse_grade("Note : 12,25 / 20"), Some(12.25));
    }

    #[test]
    fn grade_range_is_closed() {
        assert_eq!(parse_grade("0"), Some(0.0));
        assert_eq!(parse_grade("20"), Some(20.0));
        assert_eq!(parse_grade("20,01"), None);
        assert_eq!(parse_grade("99"), None);
        assert_eq!(parse_grade("sans note"), None);
    }

    #[test]
    fn negative_marker_checked_before_positive() {
        assert_eq!(text_marker("non validé"), Some(SubjectStatus::Failed));
        assert_eq!(text_marker("Module validé"), Some(SubjectStatus::Passed));
        assert_eq!(text_marker("غير مستوفاة"), Some(SubjectStatus::Failed));
        assert_eq!(text_marker("مستوفاة"), Some(SubjectStatus::Passed));
    }

    #[test]
    fn nv_code_never_read_as_v() {
        assert_eq!(text_marker("NV"), Some(SubjectStatus::Failed));
        assert_eq!(text_marker("Résultat : NV"), Some(SubjectStatus::Failed));
        assert_eq!(text_marker("V"), Some(SubjectStatus::Passed));
    }

    #[test]
    fn absence_and_integration_codes() {
        assert_eq!(text_marker("AC"), Some(SubjectStatus::PassedByIntegration));
        assert_eq!(text_marker("ABJ"), Some(SubjectStatus::JustifiedAbsence));
        assert_eq!(text_marker("ABI"), Some(SubjectStatus::UnjustifiedAbsence));
    }

    #[test]
    fn codes_only_match_standalone_tokens() {
        // "AVRIL" and "NAVette" must not trigger the V/NV codes.
        assert_eq!(text_marker("AVRIL"), None);
        assert_eq!(text_marker("NAV"), None);
    }

    #[test]
    fn class_hints_negative_first() {
        let danger = vec!["text-danger".to_string()];
        let success = vec!["row".to_string(), "text-success".to_string()];
        assert_eq!(class_hint(&danger), Some(SubjectStatus::Failed));
        assert_eq!(class_hint(&success), Some(SubjectStatus::Passed));
        assert_eq!(class_hint(&["table".to_string()]), None);
    }

    #[test]
    fn class_hint_outranks_text_marker() {
        // Styling and text disagreeing is a portal rendering quirk; the
        // contextual class carries the authoritative outcome.
        let success = vec!["text-success".to_string()];
        assert_eq!(
            explicit_status("Non validé", &success),
            Some(SubjectStatus::Passed)
        );
        assert_eq!(
            explicit_status("Non validé", &[]),
            Some(SubjectStatus::Failed)
        );
    }

    #[test]
    fn derived_rule_boundary() {
        assert_eq!(derive_status(Some(10.0)), SubjectStatus::Passed);
        assert_eq!(derive_status(Some(9.99)), SubjectStatus::Failed);
        assert_eq!(derive_status(None), SubjectStatus::Passed);
    }
}
