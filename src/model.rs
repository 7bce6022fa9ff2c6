use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate;

/// Outcome of one course unit. Serialized with the portal's short codes
/// so records stay wire-compatible with the existing API consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectStatus {
    #[serde(rename = "V")]
    Passed,
    #[serde(rename = "NV")]
    Failed,
    #[serde(rename = "AC")]
    PassedByIntegration,
    #[serde(rename = "ABJ")]
    JustifiedAbsence,
    #[serde(rename = "ABI")]
    UnjustifiedAbsence,
}

impl SubjectStatus {
    /// Statuses that earn their credits.
    pub fn earns_credits(self) -> bool {
        matches!(
            self,
            SubjectStatus::Passed | SubjectStatus::PassedByIntegration
        )
    }
}

/// One graded (or pending) course unit within a term.
///
/// `grade` is a value in [0, 20] or `None`; out-of-range values found in a
/// document are treated as absent, never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub grade: Option<f64>,
    pub status: SubjectStatus,
}

/// Academic year + semester. The `*_inferred` flags distinguish values
/// read from the document from the documented defaults substituted when
/// every extraction strategy missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicTerm {
    pub academic_year: String,
    pub semester: String,
    pub year_inferred: bool,
    pub semester_inferred: bool,
}

/// The assembled output of one extraction run. Immutable once built and
/// owned by the caller; the engine keeps nothing between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    #[serde(flatten)]
    pub term: AcademicTerm,
    pub subjects: Vec<Subject>,
    pub gpa: f64,
    pub total_credits: u32,
    pub earned_credits: u32,
    pub fetched_at: DateTime<Utc>,
}

/// Cache/history key: a pure function of the triple, so the same
/// (student, year, semester) always maps to the same record id.
pub fn record_id(student_id: &str, year: &str, semester: &str) -> String {
    format!("{student_id}-{year}-{semester}")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Pure composition step: no retries, no extraction of its own.
pub(crate) fn assemble(
    student_id: &str,
    student_name: String,
    term: AcademicTerm,
    subjects: Vec<Subject>,
    fetched_at: DateTime<Utc>,
) -> ResultRecord {
    ResultRecord {
        id: record_id(student_id, &term.academic_year, &term.semester),
        student_id: student_id.to_string(),
        student_name,
        gpa: aggregate::gpa(&subjects),
        total_credits: aggregate::total_credits(&subjects),
        earned_credits: aggregate::earned_credits(&subjects),
        term,
        subjects,
        fetched_at,
    }
}

// ── Tests ──
