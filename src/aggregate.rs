use crate::model::Subject;

/// The portal does not expose per-subject credit weights; every subject
/// counts as a flat 4 credits. An approximation, not portal data.
pub const CREDITS_PER_SUBJECT: u32 = 4;

/// Mean of present grades, rounded to 2 decimal places. 0.0 is the
/// sentinel for "no graded subject"; callers must check the subject count
/// before reading it as a real average.
pub fn gpa(subjects: &[Subject]) -> f64 {
    let grades: Vec<f64> = subjects.iter().filter_map(|s| s.grade).collect();
    if grades.is_empty() {
        return 0.0;
    }
    let mean = grades.iter().sum::<f64>() / grades.len() as f64;
    (mean * 100.0).round() / 100.0
}

pub fn total_credits(subjects: &[Subject]) -> u32 {
    subjects.len() as u32 * CREDITS_PER_SUBJECT
}

pub fn earned_credits(subjects: &[Subject]) -> u32 {
    subjects.iter().filter(|s| s.status.earns_credits()).count() as u32 * CREDITS_PER_SUBJECT
}

// ── Tests ──
