//! Range and consistency checks for ingredient nutrition records.
//!
//! Values are checked per 100g-scale serving against category-aware bounds:
//! alcoholic beverages get their own, much tighter table, because vision
//! models habitually hallucinate steak-like macros for a glass of wine.
//! Every violated rule is reported; validation never stops at the first
//! problem and never fails outright.

use crate::schema::{self, IngredientNutrition};

/// The outcome of validating one ingredient record.
///
/// Constructed once by [`validate`] and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    /// True when no rule was violated.
    pub is_valid: bool,
    /// Every violation, in rule order.
    pub errors: Vec<String>,
}

struct MacroRule {
    field: &'static str,
    label: &'static str,
    unit: &'static str,
    max: f64,
    max_alcoholic: f64,
}

const RULES: [MacroRule; 4] = [
    MacroRule {
        field: "proteins",
        label: "protein",
        unit: "g",
        max: 100.0,
        max_alcoholic: 5.0,
    },
    MacroRule {
        field: "carbohydrates",
        label: "carbohydrate",
        unit: "g",
        max: 100.0,
        max_alcoholic: 30.0,
    },
    MacroRule {
        field: "fats",
        label: "fat",
        unit: "g",
        max: 100.0,
        max_alcoholic: 5.0,
    },
    MacroRule {
        field: "calories",
        label: "calorie",
        unit: "kcal",
        max: 900.0,
        max_alcoholic: 350.0,
    },
];

/// Calories may deviate from the macro-derived estimate by this much.
const CALORIE_TOLERANCE: f64 = 50.0;

/// Macronutrients together cannot exceed this many grams.
const MACRO_SUM_LIMIT: f64 = 100.0;

/// Validates one ingredient record, accumulating every violation.
///
/// # Examples
///
/// ```
/// use nutriparse::{validate, IngredientNutrition};
///
/// let record = IngredientNutrition {
///     category: "Alcoholic".to_string(),
///     calories: "400kcal".to_string(),
///     ..Default::default()
/// };
///
/// let verdict = validate("red wine", &record);
/// assert!(!verdict.is_valid);
/// assert!(verdict.errors[0].contains("0-350kcal"));
/// ```
pub fn validate(ingredient_name: &str, record: &IngredientNutrition) -> ValidationVerdict {
    let mut errors = Vec::new();
    let alcoholic = schema::is_alcoholic(&record.category);

    let raw_values = [
        &record.proteins,
        &record.carbohydrates,
        &record.fats,
        &record.calories,
    ];

    let mut parsed = [None; 4];
    for ((slot, rule), raw) in parsed.iter_mut().zip(&RULES).zip(raw_values) {
        match schema::parse_measure(raw) {
            Some(value) => {
                let max = if alcoholic { rule.max_alcoholic } else { rule.max };
                if !(0.0..=max).contains(&value) {
                    let qualifier = if alcoholic { " for alcoholic beverage" } else { "" };
                    errors.push(format!(
                        "Invalid {} value{}: {}{} (should be between 0-{}{})",
                        rule.label, qualifier, value, rule.unit, max, rule.unit
                    ));
                }
                *slot = Some(value);
            }
            None => errors.push(format!(
                "invalid numeric value for {}: {}",
                rule.field, raw
            )),
        }
    }

    // Cross-field consistency only makes sense for solid food; alcohol
    // carries calories from ethanol that no macro accounts for.
    if !alcoholic {
        if let [Some(proteins), Some(carbs), Some(fats), calories] = parsed {
            let total = proteins + carbs + fats;
            if total > MACRO_SUM_LIMIT {
                errors.push(format!("Total macronutrients ({total}g) exceed 100g"));
            }
            if let Some(calories) = calories {
                let calculated = proteins * 4.0 + carbs * 4.0 + fats * 9.0;
                if (calculated - calories).abs() > CALORIE_TOLERANCE {
                    errors.push(format!(
                        "Calorie calculation mismatch: calculated {calculated}kcal vs provided {calories}kcal"
                    ));
                }
            }
        }
    }

    if !errors.is_empty() {
        tracing::debug!(ingredient = %ingredient_name, ?errors, "nutrition validation failed");
    }

    ValidationVerdict {
        is_valid: errors.is_empty(),
        errors,
    }
}
