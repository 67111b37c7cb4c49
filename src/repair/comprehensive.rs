//! Context-free whole-text repair.

use super::{scan, RepairStage, RepairStageId};

/// Applies cumulative fixes over the entire text, ignoring the failure
/// offset.
///
/// The fixes run in a fixed order, each building on the previous result:
/// strip raw control characters, convert single-quoted strings to
/// double-quoted, collapse trailing commas, and finally balance nesting by
/// appending the closers still owed. A step that changes nothing emits no
/// candidate.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ComprehensiveRepair;

impl RepairStage for ComprehensiveRepair {
    #[inline]
    fn id(&self) -> RepairStageId {
        RepairStageId::Comprehensive
    }

    fn candidates(&self, text: &str, _offset: Option<usize>) -> Vec<String> {
        let mut candidates = Vec::new();
        let mut current = scan::strip_control_chars(text);
        if current != text {
            candidates.push(current.clone());
        }

        let dequoted = scan::single_to_double_quotes(&current);
        if dequoted != current {
            current = dequoted;
            candidates.push(current.clone());
        }

        let collapsed = scan::collapse_trailing_commas(&current);
        if collapsed != current {
            current = collapsed;
            candidates.push(current.clone());
        }

        let closers = scan::missing_closers(&scan::scan(&current));
        if !closers.is_empty() {
            let mut closed = current.trim_end().to_string();
            closed.push_str(&closers);
            // Closing can expose a comma as trailing that was not before.
            let collapsed = scan::collapse_trailing_commas(&closed);
            if collapsed != closed {
                candidates.push(collapsed);
            }
            candidates.push(closed);
        }

        candidates
    }
}
