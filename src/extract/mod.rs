pub mod student;
pub mod subjects;
pub mod term;

use tracing::debug;

use crate::dom::Dom;

/// One attempt in a cascading-fallback chain: a pure function of the
/// document that either yields a candidate passing its own validity
/// check, or declines.
pub(crate) type Strategy<T> = fn(&Dom) -> Option<T>;

/// Run a chain strictly in priority order. The first hit wins and later
/// strategies are never consulted, even if they would also match;
/// strategies are never merged or voted.
pub(crate) fn run_chain<T>(dom: &Dom, field: &str, chain: &[(&str, Strategy<T>)]) -> Option<T> {
    for (name, strategy) in chain {
        if let Some(value) = strategy(dom) {
            debug!(field, strategy = *name, "extracted");
            return Some(value);
        }
    }
    debug!(field, "all strategies missed");
    None
}

// ── Tests ──
