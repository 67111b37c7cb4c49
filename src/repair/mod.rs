//! The JSON repair engine.
//!
//! Responses that fail a strict parse go through an ordered chain of repair
//! stages, each cheaper and more faithful than the next one down:
//!
//! 1. **direct** — strict parse of the normalized text
//! 2. **smart** — local fixes anchored at the parser's failure offset
//! 3. **comprehensive** — cumulative whole-text fixes
//! 4. **basic** — truncation at the last complete structural boundary
//! 5. **aggressive** — balanced-span extraction and key-value salvage
//!
//! The first stage to produce parseable text wins and later stages never
//! run. Every attempt is recorded in a [`RepairReport`] so callers can see
//! how degraded a recovered value is.

mod aggressive;
mod basic;
mod comprehensive;
mod scan;
mod smart;

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::{RepairError, Result};
use crate::normalize::normalize;

use aggressive::AggressiveRepair;
use basic::BasicRepair;
use comprehensive::ComprehensiveRepair;
use smart::SmartRepair;

/// Maximum length of the input echoed back in an [`RepairError`].
const SNIPPET_LEN: usize = 200;

/// Identifies a stage of the repair chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepairStageId {
    /// Strict parse with no repair.
    Direct,
    /// Offset-guided local fixes.
    Smart,
    /// Context-free whole-text fixes.
    Comprehensive,
    /// Truncation at the last complete boundary.
    Basic,
    /// Pattern-based salvage.
    Aggressive,
}

impl RepairStageId {
    /// Stable name used in logs.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            RepairStageId::Direct => "direct",
            RepairStageId::Smart => "smart",
            RepairStageId::Comprehensive => "comprehensive",
            RepairStageId::Basic => "basic",
            RepairStageId::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for RepairStageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stage's outcome within a repair run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairAttempt {
    /// Which stage ran.
    pub stage: RepairStageId,
    /// Whether the stage consumed the failure offset of the direct parse.
    pub used_offset_hint: bool,
    /// Whether the stage produced parseable text.
    pub succeeded: bool,
}

/// The attempts made during one call to the engine, in execution order.
///
/// A successful run ends with its only succeeding attempt; stages after it
/// are absent, not recorded as skipped.
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    attempts: Vec<RepairAttempt>,
}

impl RepairReport {
    /// All attempts, in the order they ran.
    pub fn attempts(&self) -> &[RepairAttempt] {
        &self.attempts
    }

    /// The stage that produced the accepted value, if any.
    pub fn winning_stage(&self) -> Option<RepairStageId> {
        self.attempts
            .iter()
            .find(|a| a.succeeded)
            .map(|a| a.stage)
    }

    fn record(&mut self, stage: RepairStageId, used_offset_hint: bool, succeeded: bool) {
        self.attempts.push(RepairAttempt {
            stage,
            used_offset_hint,
            succeeded,
        });
    }
}

/// A single fallback stage of the chain.
///
/// Stages do not parse; they emit candidate texts for the engine to parse.
/// An empty candidate list means the stage is not applicable to this input.
trait RepairStage: fmt::Debug + Send + Sync {
    fn id(&self) -> RepairStageId;

    /// Candidate repaired texts, most promising first.
    fn candidates(&self, text: &str, offset: Option<usize>) -> Vec<String>;

    /// Whether this stage anchors its fixes on the direct-parse offset.
    fn uses_offset_hint(&self) -> bool {
        false
    }
}

/// Runs the normalize-then-repair chain over raw model output.
///
/// The engine is stateless and `Send + Sync`; one instance can serve any
/// number of payloads.
///
/// # Examples
///
/// ```
/// use nutriparse::{RepairEngine, RepairStageId};
///
/// let engine = RepairEngine::new();
/// let (value, report) = engine.parse_with_report("{\"calories\": \"165kcal\",}");
///
/// assert_eq!(value.unwrap()["calories"], "165kcal");
/// assert_eq!(report.winning_stage(), Some(RepairStageId::Smart));
/// ```
#[derive(Debug)]
pub struct RepairEngine {
    stages: Vec<Box<dyn RepairStage>>,
}

impl Default for RepairEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RepairEngine {
    /// Creates an engine with the full stage chain in fallback order.
    pub fn new() -> Self {
        Self {
            stages: vec![
                Box::new(SmartRepair),
                Box::new(ComprehensiveRepair),
                Box::new(BasicRepair),
                Box::new(AggressiveRepair),
            ],
        }
    }

    /// Parses model output, repairing as needed.
    pub fn parse(&self, raw: &str) -> Result<Value> {
        self.parse_with_report(raw).0
    }

    /// Parses model output and reports every repair attempt made.
    pub fn parse_with_report(&self, raw: &str) -> (Result<Value>, RepairReport) {
        let text = normalize(raw);
        let mut report = RepairReport::default();

        let direct_err = match serde_json::from_str(&text) {
            Ok(value) => {
                report.record(RepairStageId::Direct, false, true);
                return (Ok(value), report);
            }
            Err(err) => {
                report.record(RepairStageId::Direct, false, false);
                err
            }
        };

        let offset = scan::error_offset(&text, &direct_err);
        let mut last_message = direct_err.to_string();

        for stage in &self.stages {
            debug!(stage = %stage.id(), "direct parse failed, trying repair stage");
            for candidate in stage.candidates(&text, offset) {
                match serde_json::from_str(&candidate) {
                    Ok(value) => {
                        report.record(stage.id(), stage.uses_offset_hint(), true);
                        debug!(stage = %stage.id(), "repair succeeded");
                        return (Ok(value), report);
                    }
                    Err(err) => last_message = err.to_string(),
                }
            }
            report.record(stage.id(), stage.uses_offset_hint(), false);
        }

        let err = RepairError::Unparsable {
            snippet: snippet(raw),
            message: last_message,
        };
        (Err(err), report)
    }
}

/// Parses model output with the default engine.
///
/// # Examples
///
/// ```
/// let value = nutriparse::parse_with_repair("```json\n{\"weight\": \"100g\"}\n```").unwrap();
/// assert_eq!(value["weight"], "100g");
/// ```
pub fn parse_with_repair(raw: &str) -> Result<Value> {
    RepairEngine::new().parse(raw)
}

/// Parses model output with the default engine, returning the attempt
/// report alongside the result.
pub fn parse_with_report(raw: &str) -> (Result<Value>, RepairReport) {
    RepairEngine::new().parse_with_report(raw)
}

/// Truncates text to a loggable length on a char boundary.
fn snippet(text: &str) -> String {
    if text.len() <= SNIPPET_LEN {
        return text.to_string();
    }
    let mut end = SNIPPET_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_valid_json_wins_at_direct_stage() {
        let (value, report) = parse_with_report(r#"{"a": 1}"#);
        assert_eq!(value.unwrap(), json!({"a": 1}));
        assert_eq!(report.winning_stage(), Some(RepairStageId::Direct));
        assert_eq!(report.attempts().len(), 1);
    }

    #[test]
    fn test_trailing_comma_repaired_by_smart() {
        let (value, report) = parse_with_report(r#"{"a": 1,}"#);
        assert_eq!(value.unwrap(), json!({"a": 1}));
        assert_eq!(report.winning_stage(), Some(RepairStageId::Smart));
    }

    #[test]
    fn test_single_quotes_fall_through_to_comprehensive() {
        let (value, report) = parse_with_report(r#"{'name': 'Alice'}"#);
        assert_eq!(value.unwrap(), json!({"name": "Alice"}));
        assert_eq!(report.winning_stage(), Some(RepairStageId::Comprehensive));
    }

    #[test]
    fn test_stages_after_success_never_run() {
        let (_, report) = parse_with_report(r#"{"a": 1,}"#);
        let stages: Vec<_> = report.attempts().iter().map(|a| a.stage).collect();
        assert_eq!(stages, vec![RepairStageId::Direct, RepairStageId::Smart]);
    }

    #[test]
    fn test_offset_hint_flag_recorded() {
        let (_, report) = parse_with_report(r#"{"a": 1,}"#);
        let smart = report
            .attempts()
            .iter()
            .find(|a| a.stage == RepairStageId::Smart)
            .unwrap();
        assert!(smart.used_offset_hint);
    }

    #[test]
    fn test_unparsable_prose() {
        let err = parse_with_repair("I cannot analyze this image").unwrap_err();
        assert!(err.snippet().contains("cannot analyze"));
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "x".repeat(500);
        assert!(snippet(&long).len() < 500);
        assert!(snippet(&long).ends_with("..."));
    }
}
