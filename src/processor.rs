//! Meal analysis post-processing and persistence routing.

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::schema::{self, IngredientNutrition};
use crate::validator::{self, ValidationVerdict};

/// Persistence sink for processed nutrition data.
///
/// Implementations return `false` on failure; the processor logs and moves
/// on, so an unavailable store never blocks or fails a meal analysis.
pub trait NutritionStore {
    /// Persists a validated ingredient document.
    fn save_ingredient(&self, record: &Value) -> bool;

    /// Persists a rejected ingredient for manual review.
    fn save_validation_error(&self, ingredient: &str, errors: &[String], original: &Value) -> bool;

    /// Persists the full meal analysis record.
    fn save_meal_analysis(&self, record: &Value) -> bool;
}

/// Enriches, validates, and routes one parsed meal analysis.
///
/// # Examples
///
/// ```
/// use nutriparse::{MealProcessor, NutritionStore};
/// use serde_json::{json, Value};
///
/// struct NullStore;
///
/// impl NutritionStore for NullStore {
///     fn save_ingredient(&self, _: &Value) -> bool { true }
///     fn save_validation_error(&self, _: &str, _: &[String], _: &Value) -> bool { true }
///     fn save_meal_analysis(&self, _: &Value) -> bool { true }
/// }
///
/// let store = NullStore;
/// let processor = MealProcessor::new(&store);
///
/// let mut record = json!({
///     "macronutrients_by_ingredient": {
///         "apple": {
///             "category": "Fruits",
///             "weight": "200g",
///             "proteins": "0.6g",
///             "carbohydrates": "28g",
///             "fats": "0.4g",
///             "calories": "104kcal",
///         }
///     }
/// });
/// processor.process(&mut record);
///
/// let apple = &record["macronutrients_by_ingredient"]["apple"];
/// assert_eq!(apple["proteins_per_100g"], 0.3);
/// assert_eq!(apple["calories_per_100g"], 52.0);
/// ```
pub struct MealProcessor<'a> {
    store: &'a dyn NutritionStore,
}

impl<'a> MealProcessor<'a> {
    /// Creates a processor writing to the given store.
    pub fn new(store: &'a dyn NutritionStore) -> Self {
        Self { store }
    }

    /// Processes a parsed meal analysis record in place.
    ///
    /// Each entry of the per-ingredient map is enriched with per-100g
    /// values and defaults, validated, and routed: valid ingredients to
    /// [`NutritionStore::save_ingredient`], invalid ones to
    /// [`NutritionStore::save_validation_error`]. The whole record goes to
    /// [`NutritionStore::save_meal_analysis`] unconditionally.
    pub fn process(&self, record: &mut Value) {
        let mut outcomes: Vec<(String, ValidationVerdict, Value)> = Vec::new();

        if let Some(entries) = record
            .get_mut(schema::MACROS_BY_INGREDIENT)
            .and_then(Value::as_object_mut)
        {
            for (name, entry) in entries.iter_mut() {
                let mut nutrition: IngredientNutrition = match serde_json::from_value(entry.clone())
                {
                    Ok(nutrition) => nutrition,
                    Err(err) => {
                        debug!(ingredient = %name, %err, "skipping undeserializable entry");
                        continue;
                    }
                };

                derive_per_100g(&mut nutrition);
                let verdict = validator::validate(name, &nutrition);

                if let Ok(enriched) = serde_json::to_value(&nutrition) {
                    *entry = enriched;
                }
                outcomes.push((name.clone(), verdict, entry.clone()));
            }
        }

        for (name, verdict, entry) in outcomes {
            if verdict.is_valid {
                let document = json!({
                    "name": name,
                    "nutrition_data": entry,
                    "source": "meal_analysis",
                });
                if self.store.save_ingredient(&document) {
                    info!(ingredient = %name, "ingredient saved");
                } else {
                    warn!(ingredient = %name, "failed to save ingredient");
                }
            } else {
                warn!(
                    ingredient = %name,
                    errors = ?verdict.errors,
                    "ingredient failed validation, routing to review"
                );
                if !self.store.save_validation_error(&name, &verdict.errors, &entry) {
                    warn!(ingredient = %name, "failed to save validation error");
                }
            }
        }

        if !self.store.save_meal_analysis(record) {
            warn!("failed to save meal analysis");
        }
    }
}

/// Derives the four per-100g fields from the whole-ingredient values.
///
/// Nothing happens without a weight; an unparsable weight or macro zeroes
/// all four fields rather than leaving stale model-provided values behind.
fn derive_per_100g(nutrition: &mut IngredientNutrition) {
    let Some(weight_raw) = nutrition.weight.clone() else {
        return;
    };

    let scaled = match schema::parse_measure(&weight_raw) {
        Some(weight) if weight > 0.0 => {
            let parse = |raw: &str| schema::parse_measure(raw);
            match (
                parse(&nutrition.proteins),
                parse(&nutrition.carbohydrates),
                parse(&nutrition.fats),
                parse(&nutrition.calories),
            ) {
                (Some(proteins), Some(carbs), Some(fats), Some(calories)) => Some((
                    round2(proteins / weight * 100.0),
                    round2(carbs / weight * 100.0),
                    round2(fats / weight * 100.0),
                    round2(calories / weight * 100.0),
                )),
                _ => None,
            }
        }
        Some(_) => return,
        None => None,
    };

    match scaled {
        Some((proteins, carbs, fats, calories)) => {
            nutrition.proteins_per_100g = proteins;
            nutrition.carbohydrates_per_100g = carbs;
            nutrition.fats_per_100g = fats;
            nutrition.calories_per_100g = calories;
        }
        None => {
            nutrition.proteins_per_100g = 0.0;
            nutrition.carbohydrates_per_100g = 0.0;
            nutrition.fats_per_100g = 0.0;
            nutrition.calories_per_100g = 0.0;
        }
    }
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
