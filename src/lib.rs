//! Extraction engine for university transcript pages.
//!
//! The portal serves non-versioned HTML that varies across templates,
//! locales (French/Arabic) and partial-failure states. Every field is
//! recovered by an ordered chain of strategies: structured queries first,
//! then semi-structured scans, then raw-text patterns, then a documented
//! default. [`extract`] is the single entry point; it is a pure function
//! of its inputs and keeps no state between calls, so callers may retry
//! or parallelize it freely.

pub mod aggregate;
pub mod classify;
pub mod dom;
pub mod error;
mod extract;
pub mod model;
pub mod names;

use chrono::{DateTime, Utc};

pub use error::ExtractError;
pub use model::{AcademicTerm, ResultRecord, Subject, SubjectStatus};

use dom::Dom;

/// Turn one raw transcript document into a normalized academic record.
///
/// Identity and term misses recover locally with documented defaults. An
/// empty subject chain is a failure, never an empty success: fabricating
/// plausible-looking grades is exactly what this engine refuses to do, so
/// downstream can show "results unavailable" instead of a fake transcript.
pub fn extract(
    document: &str,
    requested_id: &str,
    fetched_at: DateTime<Utc>,
) -> Result<ResultRecord, ExtractError> {
    let dom = Dom::parse(document);

    let student_name = extract::student::extract(&dom, requested_id);
    let term = extract::term::extract(&dom, fetched_at);
    let subjects = extract::subjects::extract(&dom);

    if subjects.is_empty() {
        return Err(if dom.has_markup() {
            ExtractError::NoSubjectsFound
        } else {
            ExtractError::MalformedDocument
        });
    }

    Ok(model::assemble(
        requested_id,
        student_name,
        term,
        subjects,
        fetched_at,
    ))
}
