use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use tracing::info;

use super::{run_chain, Strategy};
use crate::dom::Dom;
use crate::model::AcademicTerm;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20\d{2}[-/]20\d{2}").unwrap());
static GROUP_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bS(\d+)\.GR\d+").unwrap());
static SEMESTER_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSemest(?:re|er)\s*(\d+)").unwrap());
static BARE_S_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bS\s*(\d+)\b").unwrap());

const DEFAULT_SEMESTER: &str = "Semestre 1";

const YEAR_CHAIN: &[(&str, Strategy<String>)] = &[("year-pattern", year_pattern)];

const SEMESTER_CHAIN: &[(&str, Strategy<String>)] = &[
    ("group-code", group_code),
    ("semester-word", semester_word),
    ("bare-s", bare_s),
];

/// Academic year + semester. Both fields fall back to a documented
/// default when their chain exhausts; the `*_inferred` flags (and the
/// info logs) keep defaults distinguishable from extracted values.
pub fn extract(dom: &Dom, fetched_at: DateTime<Utc>) -> AcademicTerm {
    let year = run_chain(dom, "academic_year", YEAR_CHAIN);
    let year_inferred = year.is_none();
    let academic_year = year.unwrap_or_else(|| {
        let fallback = clock_year(fetched_at);
        info!(year = %fallback, "academic year not in document, inferred from clock");
        fallback
    });

    let semester = run_chain(dom, "semester", SEMESTER_CHAIN);
    let semester_inferred = semester.is_none();
    let semester = semester.unwrap_or_else(|| {
        info!(semester = DEFAULT_SEMESTER, "semester not in document, using default");
        DEFAULT_SEMESTER.to_string()
    });

    AcademicTerm {
        academic_year,
        semester,
        year_inferred,
        semester_inferred,
    }
}

/// "2023-2024" or "2023/2024" anywhere in the document, with or without
/// an "Année universitaire" label in front.
fn year_pattern(dom: &Dom) -> Option<String> {
    YEAR_RE.find(dom.raw()).map(|m| m.as_str().to_string())
}

/// Semester/grade-group codes like "S3.GR2".
fn group_code(dom: &Dom) -> Option<String> {
    GROUP_CODE_RE
        .captures(dom.raw())
        .map(|caps| format!("Semestre {}", &caps[1]))
}

fn semester_word(dom: &Dom) -> Option<String> {
    SEMESTER_WORD_RE
        .captures(dom.raw())
        .map(|caps| format!("Semestre {}", &caps[1]))
}

fn bare_s(dom: &Dom) -> Option<String> {
    BARE_S_RE
        .captures(dom.raw())
        .map(|caps| format!("Semestre {}", &caps[1]))
}

/// Clock-derived default: from September on, the academic year in
/// progress is `thisYear-nextYear`, before that `lastYear-thisYear`.
/// Derived from the run's timestamp so the engine stays a pure function
/// of its inputs.
fn clock_year(at: DateTime<Utc>) -> String {
    let year = at.year();
    if at.month() >= 9 {
        format!("{}-{}", year, year + 1)
    } else {
        format!("{}-{}", year - 1, year)
    }
}

// ── Tests ──
