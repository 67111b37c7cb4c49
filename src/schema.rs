//! The nutrition response contract.
//!
//! Vision models are prompted to answer with an object keyed by
//! [`MACROS_BY_INGREDIENT`], mapping each ingredient name to a nutrition
//! sub-record with unit-suffixed string values (`"31g"`, `"165kcal"`).
//! Models stray from that contract constantly, so deserialization here is
//! deliberately tolerant: missing fields get defaults, numbers are accepted
//! where strings were asked for, and unknown fields are carried through
//! untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Key of the per-ingredient map in a meal analysis response.
pub const MACROS_BY_INGREDIENT: &str = "macronutrients_by_ingredient";

/// The categories the model is asked to choose from.
pub const FOOD_CATEGORIES: &[&str] = &[
    "Fruits",
    "Other",
    "Eggs",
    "Grains",
    "Legumes",
    "Dairy",
    "Vegetables/Fruits",
    "Fish",
    "Fat And Oils",
    "Vegetables",
    "Meat",
    "Herb",
    "Leafy Green",
    "Fruit Juice",
    "Nut",
    "Mushroom",
    "Soy",
    "Alcoholic",
    "Fortified Wine",
    "Nut Recipes",
    "Seed",
    "Dried Fruit",
    "Spice",
    "Citrus",
    "Dairy Alternatives",
    "Sweeteners",
    "Condiment",
    "Root Vegetable",
    "Shellfish",
    "Seafood",
    "Liqueur",
    "Alcohol",
    "Poultry",
    "Olive",
    "Nuts and Seeds",
    "Herbs and Spices",
    "Berry",
    "Tree Nut",
    "Fruit And Oils",
    "Sauces",
    "Liquor",
    "Beverages",
];

/// Categories treated as alcoholic by exact match.
const ALCOHOLIC_CATEGORIES: &[&str] = &["Alcoholic", "Alcohol", "Liquor", "Fortified Wine", "Liqueur"];

/// Substrings that mark a category as alcoholic regardless of exact match.
const ALCOHOLIC_TERMS: &[&str] = &["wine", "beer", "spirit", "liquor"];

/// Whether a category names an alcoholic beverage.
///
/// # Examples
///
/// ```
/// use nutriparse::schema::is_alcoholic;
///
/// assert!(is_alcoholic("Alcoholic"));
/// assert!(is_alcoholic("Red Wine"));
/// assert!(!is_alcoholic("Vegetables"));
/// ```
pub fn is_alcoholic(category: &str) -> bool {
    if ALCOHOLIC_CATEGORIES.contains(&category) {
        return true;
    }
    let lowered = category.to_lowercase();
    ALCOHOLIC_TERMS.iter().any(|term| lowered.contains(term))
}

/// Parses a unit-suffixed measurement string into its numeric value.
///
/// Accepts `g`, `kcal`, `mg`, and `ml` suffixes, case-insensitively, with
/// surrounding whitespace. Plain numbers pass through.
///
/// # Examples
///
/// ```
/// use nutriparse::schema::parse_measure;
///
/// assert_eq!(parse_measure("31g"), Some(31.0));
/// assert_eq!(parse_measure(" 165 kcal "), Some(165.0));
/// assert_eq!(parse_measure("12.5"), Some(12.5));
/// assert_eq!(parse_measure("unknown"), None);
/// ```
pub fn parse_measure(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_ascii_lowercase();
    let stripped = lowered
        .strip_suffix("kcal")
        .or_else(|| lowered.strip_suffix("mg"))
        .or_else(|| lowered.strip_suffix("ml"))
        .or_else(|| lowered.strip_suffix('g'))
        .unwrap_or(&lowered);
    stripped.trim().parse().ok()
}

/// One ingredient's nutrition record, as exchanged with the model.
///
/// Fields the model omits take the contract's defaults; fields the model
/// sends with the wrong scalar type are coerced rather than rejected.
/// Anything outside the known fields (alternate names, measurement hints,
/// data source tags) is preserved in `extra` and round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientNutrition {
    /// Category from [`FOOD_CATEGORIES`]; defaults to `"Other"`.
    #[serde(default = "default_category", deserialize_with = "lenient_string")]
    pub category: String,

    /// Serving weight, e.g. `"150g"` or `"250ml"`.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub weight: Option<String>,

    /// Protein content of the serving, e.g. `"31g"`.
    #[serde(default = "default_grams", deserialize_with = "lenient_string")]
    pub proteins: String,

    /// Carbohydrate content of the serving, e.g. `"0g"`.
    #[serde(default = "default_grams", deserialize_with = "lenient_string")]
    pub carbohydrates: String,

    /// Fat content of the serving, e.g. `"3.6g"`.
    #[serde(default = "default_grams", deserialize_with = "lenient_string")]
    pub fats: String,

    /// Energy content of the serving, e.g. `"165kcal"`.
    #[serde(default = "default_kcal", deserialize_with = "lenient_string")]
    pub calories: String,

    /// Protein per 100g, derived from `proteins` and `weight`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub proteins_per_100g: f64,

    /// Carbohydrates per 100g, derived from `carbohydrates` and `weight`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates_per_100g: f64,

    /// Fat per 100g, derived from `fats` and `weight`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fats_per_100g: f64,

    /// Calories per 100g, derived from `calories` and `weight`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories_per_100g: f64,

    /// Fields outside the contract, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for IngredientNutrition {
    fn default() -> Self {
        Self {
            category: default_category(),
            weight: None,
            proteins: default_grams(),
            carbohydrates: default_grams(),
            fats: default_grams(),
            calories: default_kcal(),
            proteins_per_100g: 0.0,
            carbohydrates_per_100g: 0.0,
            fats_per_100g: 0.0,
            calories_per_100g: 0.0,
            extra: Map::new(),
        }
    }
}

fn default_category() -> String {
    "Other".to_string()
}

fn default_grams() -> String {
    "0g".to_string()
}

fn default_kcal() -> String {
    "0kcal".to_string()
}

/// Accepts a string or a bare number where a string was expected.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => "0".to_string(),
    })
}

/// Accepts a string, a bare number, or null; empty strings count as absent.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Accepts a number or a suffixed measurement string where a float was
/// expected; anything else falls back to zero.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_measure(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_full_record_deserializes() {
        let record: IngredientNutrition = serde_json::from_value(json!({
            "category": "Meat",
            "weight": "150g",
            "proteins": "31g",
            "carbohydrates": "0g",
            "fats": "3.6g",
            "calories": "165kcal",
        }))
        .unwrap();

        assert_eq!(record.category, "Meat");
        assert_eq!(record.weight.as_deref(), Some("150g"));
        assert_eq!(record.proteins, "31g");
        assert_eq!(record.calories, "165kcal");
        assert_eq!(record.proteins_per_100g, 0.0);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let record: IngredientNutrition = serde_json::from_value(json!({})).unwrap();

        assert_eq!(record.category, "Other");
        assert_eq!(record.weight, None);
        assert_eq!(record.proteins, "0g");
        assert_eq!(record.carbohydrates, "0g");
        assert_eq!(record.fats, "0g");
        assert_eq!(record.calories, "0kcal");
    }

    #[test]
    fn test_numeric_values_coerced_to_strings() {
        let record: IngredientNutrition = serde_json::from_value(json!({
            "weight": 150,
            "proteins": 31,
            "calories": 165,
        }))
        .unwrap();

        assert_eq!(record.weight.as_deref(), Some("150"));
        assert_eq!(record.proteins, "31");
        assert_eq!(record.calories, "165");
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let record: IngredientNutrition = serde_json::from_value(json!({
            "proteins": "31g",
            "names": ["chicken", "poulet"],
            "data_source": "vision",
        }))
        .unwrap();

        assert_eq!(record.extra["names"], json!(["chicken", "poulet"]));
        assert_eq!(record.extra["data_source"], "vision");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["names"], json!(["chicken", "poulet"]));
    }

    #[test]
    fn test_empty_weight_treated_as_absent() {
        let record: IngredientNutrition =
            serde_json::from_value(json!({"weight": "  "})).unwrap();
        assert_eq!(record.weight, None);
    }

    #[test]
    fn test_parse_measure_suffixes() {
        assert_eq!(parse_measure("100g"), Some(100.0));
        assert_eq!(parse_measure("165kcal"), Some(165.0));
        assert_eq!(parse_measure("250ml"), Some(250.0));
        assert_eq!(parse_measure("500mg"), Some(500.0));
        assert_eq!(parse_measure("3.6G"), Some(3.6));
        assert_eq!(parse_measure("0"), Some(0.0));
        assert_eq!(parse_measure(""), None);
        assert_eq!(parse_measure("a lot"), None);
    }

    #[test]
    fn test_alcohol_detection() {
        for category in ["Alcoholic", "Alcohol", "Liquor", "Fortified Wine", "Liqueur"] {
            assert!(is_alcoholic(category), "{category} should be alcoholic");
        }
        for category in ["Red Wine", "craft beer", "Spirits"] {
            assert!(is_alcoholic(category), "{category} should be alcoholic");
        }
        for category in ["Vegetables", "Meat", "Dairy", "Other"] {
            assert!(!is_alcoholic(category), "{category} should not be alcoholic");
        }
    }
}
