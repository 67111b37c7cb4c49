//! Pattern-based salvage, the last stage before giving up.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{scan, RepairStage, RepairStageId};

/// Matches an individual `"key": value` pair with a scalar value.
static KEY_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""([^"\\]+)"\s*:\s*("(?:[^"\\]|\\.)*"|-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?|true|false|null)"#,
    )
    .expect("key-value regex is valid")
});

/// Ignores structure and salvages whatever data can still be recognized.
///
/// First tries the outermost balanced `{...}` span found by depth counting,
/// which recovers payloads drowned in surrounding garbage. Failing that,
/// rebuilds a minimal flat object from independently matched scalar
/// `"key": value` pairs; nested values and everything unmatchable are lost.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AggressiveRepair;

impl RepairStage for AggressiveRepair {
    #[inline]
    fn id(&self) -> RepairStageId {
        RepairStageId::Aggressive
    }

    fn candidates(&self, text: &str, _offset: Option<usize>) -> Vec<String> {
        let mut candidates = Vec::new();

        if let Some(span) = scan::balanced_object_span(text) {
            if span.len() < text.trim().len() {
                candidates.push(span.to_string());
                let collapsed = scan::collapse_trailing_commas(span);
                if collapsed != span {
                    candidates.push(collapsed);
                }
            }
        }

        if let Some(minimal) = extract_key_values(text) {
            candidates.push(minimal);
        }

        candidates
    }
}

/// Builds a flat JSON object from every scalar pair found in the text.
///
/// The first occurrence of a key wins. Returns `None` when nothing usable
/// matches, so genuinely structure-free prose still fails the chain.
fn extract_key_values(text: &str) -> Option<String> {
    let mut map = serde_json::Map::new();

    for cap in KEY_VALUE_RE.captures_iter(text) {
        let key = cap[1].to_string();
        if map.contains_key(&key) {
            continue;
        }
        if let Ok(value) = serde_json::from_str(&cap[2]) {
            map.insert(key, value);
        }
    }

    if map.is_empty() {
        None
    } else {
        serde_json::to_string(&serde_json::Value::Object(map)).ok()
    }
}
