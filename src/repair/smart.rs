//! Offset-guided local repair.

use super::{scan, RepairStage, RepairStageId};

/// Repairs the input with small edits anchored at the parser's failure
/// offset.
///
/// Each candidate changes as little as possible: drop the dangling comma
/// right before the offset, terminate an open string, close the collections
/// still open at end of input, or escape a raw control character sitting at
/// the failure point. The engine re-parses after each candidate.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SmartRepair;

impl RepairStage for SmartRepair {
    #[inline]
    fn id(&self) -> RepairStageId {
        RepairStageId::Smart
    }

    #[inline]
    fn uses_offset_hint(&self) -> bool {
        true
    }

    fn candidates(&self, text: &str, offset: Option<usize>) -> Vec<String> {
        let Some(offset) = offset else {
            return Vec::new();
        };
        let offset = offset.min(text.len());
        let mut candidates = Vec::new();

        // Dangling comma immediately before the failure point.
        let before = text[..offset].trim_end();
        if before.ends_with(',') {
            let comma = before.len() - 1;
            let mut fixed = String::with_capacity(text.len());
            fixed.push_str(&text[..comma]);
            fixed.push_str(&text[comma + 1..]);
            candidates.push(fixed);
        }

        let state = scan::scan_prefix(text, offset);

        // Unterminated string with content still following the offset.
        if state.in_string && offset < text.len() {
            let mut fixed = String::with_capacity(text.len() + 1);
            fixed.push_str(&text[..offset]);
            fixed.push('"');
            fixed.push_str(&text[offset..]);
            candidates.push(fixed);
        }

        // Failure at or next to the end of input: close everything still
        // open. EOF errors point at the last character, not one past it.
        if offset >= text.trim_end().len().saturating_sub(1) {
            let closers = scan::missing_closers(&scan::scan(text));
            if !closers.is_empty() {
                let mut fixed = text.trim_end().to_string();
                fixed.push_str(&closers);
                candidates.push(fixed);
            }
        }

        // Raw control character at the failure point.
        if let Some(ch) = text[offset..].chars().next() {
            if ch.is_control() && state.in_string {
                let escaped = match ch {
                    '\n' => Some("\\n"),
                    '\r' => Some("\\r"),
                    '\t' => Some("\\t"),
                    _ => None,
                };
                let mut fixed = String::with_capacity(text.len() + 1);
                fixed.push_str(&text[..offset]);
                if let Some(escaped) = escaped {
                    fixed.push_str(escaped);
                }
                fixed.push_str(&text[offset + ch.len_utf8()..]);
                candidates.push(fixed);
            }
        }

        candidates
    }
}
