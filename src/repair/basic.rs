//! Offset-guided truncation repair.

use super::{scan, RepairStage, RepairStageId};

/// Salvages the structurally complete prefix of the input.
///
/// Truncates at the last `}` / `]` that closed cleanly before the failure
/// offset, then appends the closers still owed. Data after the cut is lost,
/// which is why this runs after the less destructive stages.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct BasicRepair;

impl RepairStage for BasicRepair {
    #[inline]
    fn id(&self) -> RepairStageId {
        RepairStageId::Basic
    }

    #[inline]
    fn uses_offset_hint(&self) -> bool {
        true
    }

    fn candidates(&self, text: &str, offset: Option<usize>) -> Vec<String> {
        let Some(offset) = offset else {
            return Vec::new();
        };

        match scan::truncate_balanced(text, offset) {
            Some(truncated) => {
                let collapsed = scan::collapse_trailing_commas(&truncated);
                if collapsed != truncated {
                    vec![collapsed, truncated]
                } else {
                    vec![truncated]
                }
            }
            None => Vec::new(),
        }
    }
}
