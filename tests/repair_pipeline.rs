//! End-to-end tests for the normalize-then-repair pipeline.

use nutriparse::{normalize, parse_with_repair, parse_with_report, RepairStageId};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ============================================================
// Normalization
// ============================================================

#[test]
fn normalize_strips_fences_and_prose() {
    assert_eq!(normalize("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(
        normalize("Here is the meal analysis: {\"a\": 1} — enjoy!"),
        "{\"a\": 1}"
    );
}

#[test]
fn normalize_is_idempotent() {
    let inputs = [
        "```json\n{\"calories\": \"90kcal\"}\n```",
        "prose before {\"a\": {\"b\": [1, 2]}} prose after",
        "no json anywhere",
    ];
    for input in inputs {
        let once = normalize(input);
        assert_eq!(normalize(&once), once);
    }
}

// ============================================================
// Round trip
// ============================================================

#[test]
fn valid_json_round_trips_untouched() {
    let raw = r#"{
        "meal_name": "Grilled Chicken Salad",
        "macronutrients_by_ingredient": {
            "chicken breast": {
                "category": "Meat",
                "weight": "150g",
                "proteins": "46.5g",
                "carbohydrates": "0g",
                "fats": "5.4g",
                "calories": "247kcal"
            }
        }
    }"#;

    let (value, report) = parse_with_report(raw);
    let expected: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(value.unwrap(), expected);
    assert_eq!(report.winning_stage(), Some(RepairStageId::Direct));
}

// ============================================================
// Repair stages
// ============================================================

#[test]
fn trailing_comma_is_repaired() {
    let value = parse_with_repair(r#"{"proteins": "31g", "calories": "165kcal",}"#).unwrap();
    assert_eq!(value["proteins"], "31g");
    assert_eq!(value["calories"], "165kcal");
}

#[test]
fn unbalanced_braces_are_closed() {
    let value = parse_with_repair(r#"{"a": {"proteins": "31g"}"#).unwrap();
    assert_eq!(value["a"]["proteins"], "31g");
}

#[test]
fn fenced_payload_with_trailing_comma() {
    let raw = "```json\n{\"weight\": \"100g\",}\n```";
    let value = parse_with_repair(raw).unwrap();
    assert_eq!(value["weight"], "100g");
}

#[test]
fn single_quoted_payload_repaired_by_comprehensive_stage() {
    let (value, report) = parse_with_report(r#"{'category': 'Meat', 'weight': '150g'}"#);
    let value = value.unwrap();
    assert_eq!(value["category"], "Meat");
    assert_eq!(value["weight"], "150g");
    assert_eq!(report.winning_stage(), Some(RepairStageId::Comprehensive));
}

#[test]
fn truncated_meal_payload_is_salvaged() {
    // Cut off mid-string, the way token limits do it.
    let raw = r#"{
        "macronutrients_by_ingredient": {
            "rice": {
                "category": "Grains",
                "weight": "180g",
                "proteins": "4.8g",
                "carbohydrates": "5"#;

    let value = parse_with_repair(raw).unwrap();
    let rice = &value["macronutrients_by_ingredient"]["rice"];
    assert_eq!(rice["category"], "Grains");
    assert_eq!(rice["weight"], "180g");
}

#[test]
fn broken_tail_falls_back_to_truncation() {
    let raw = r#"{"a": {"b": 1}, zzz: }"#;
    let (value, report) = parse_with_report(raw);
    assert_eq!(value.unwrap(), json!({"a": {"b": 1}}));
    assert_eq!(report.winning_stage(), Some(RepairStageId::Basic));
}

#[test]
fn key_value_salvage_as_last_resort() {
    let raw = r#"partial output!! "proteins": "31g" [corrupted] "calories": "165kcal" ::"#;
    let (value, report) = parse_with_report(raw);
    let value = value.unwrap();
    assert_eq!(value["proteins"], "31g");
    assert_eq!(value["calories"], "165kcal");
    assert_eq!(report.winning_stage(), Some(RepairStageId::Aggressive));
}

// ============================================================
// Fallback discipline
// ============================================================

#[test]
fn stages_run_in_order_and_stop_at_first_success() {
    let (_, report) = parse_with_report(r#"{'a': 1}"#);
    let stages: Vec<_> = report.attempts().iter().map(|a| a.stage).collect();
    assert_eq!(
        stages,
        vec![
            RepairStageId::Direct,
            RepairStageId::Smart,
            RepairStageId::Comprehensive,
        ]
    );

    let succeeded: Vec<_> = report
        .attempts()
        .iter()
        .filter(|a| a.succeeded)
        .map(|a| a.stage)
        .collect();
    assert_eq!(succeeded, vec![RepairStageId::Comprehensive]);
}

#[test]
fn offset_hint_usage_is_reported() {
    let (_, report) = parse_with_report(r#"{"a": 1,}"#);
    for attempt in report.attempts() {
        match attempt.stage {
            RepairStageId::Smart | RepairStageId::Basic => assert!(attempt.used_offset_hint),
            _ => assert!(!attempt.used_offset_hint),
        }
    }
}

// ============================================================
// Terminal failure
// ============================================================

#[test]
fn prose_refusal_is_unparsable() {
    let raw = "I'm sorry, I cannot identify the contents of this image.";
    let err = parse_with_repair(raw).unwrap_err();
    assert!(err.snippet().contains("cannot identify"));

    let (result, report) = parse_with_report(raw);
    assert!(result.is_err());
    assert_eq!(report.winning_stage(), None);
    assert_eq!(report.attempts().len(), 5);
}

#[test]
fn empty_input_is_unparsable() {
    assert!(parse_with_repair("").is_err());
    assert!(parse_with_repair("   \n  ").is_err());
}
