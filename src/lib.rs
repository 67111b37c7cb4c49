//! # nutriparse
//!
//! Recovers structured nutrition data from the malformed JSON that LLM
//! vision services return for meal photos.
//!
//! Model output rarely survives a strict parse: payloads arrive wrapped in
//! markdown fences, truncated mid-object by token limits, or sprinkled with
//! single quotes and trailing commas. This crate normalizes the text, walks
//! an ordered chain of repair stages until one yields valid JSON, then
//! validates and enriches the nutrition records before handing them to a
//! caller-provided store.
//!
//! ## Quick Start
//!
//! ```
//! use nutriparse::parse_with_repair;
//!
//! // Fenced, with a trailing comma — a strict parser rejects this.
//! let raw = "```json\n{\"calories\": \"165kcal\",}\n```";
//!
//! let value = parse_with_repair(raw).unwrap();
//! assert_eq!(value["calories"], "165kcal");
//! ```
//!
//! ## Repair chain
//!
//! Stages run in order until one produces parseable text; the rest never
//! run. [`parse_with_report`] exposes the attempt trail:
//!
//! ```
//! use nutriparse::{parse_with_report, RepairStageId};
//!
//! let (value, report) = parse_with_report("{\"a\": {\"b\": 1}");
//!
//! assert!(value.is_ok());
//! assert_eq!(report.winning_stage(), Some(RepairStageId::Smart));
//! ```
//!
//! ## Validation and processing
//!
//! Parsed meal records are enriched (defaults, per-100g derivation),
//! validated against category-aware bounds, and routed to a
//! [`NutritionStore`] implementation — valid ingredients one way, rejects
//! the other, the full analysis always.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod normalize;
pub mod processor;
pub mod repair;
pub mod schema;
pub mod validator;

pub use error::{RepairError, Result};
pub use normalize::normalize;
pub use processor::{MealProcessor, NutritionStore};
pub use repair::{
    parse_with_repair, parse_with_report, RepairAttempt, RepairEngine, RepairReport, RepairStageId,
};
pub use schema::IngredientNutrition;
pub use validator::{validate, ValidationVerdict};
