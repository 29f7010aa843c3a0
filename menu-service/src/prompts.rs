//! Prompt templates sent to the upstream chat model.
//!
//! The system prompt pins the model's role and the exact JSON shape it must
//! return; the user prompt carries the per-request ingredients, budget and
//! preference.

use crate::models::MenuRequest;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Placeholder used when the request carries no budget.
pub const NO_BUDGET: &str = "none";

/// Placeholder used when the request carries no preference.
pub const NO_PREFERENCE: &str = "no particular preference";

const DUAL_PLAN_SYSTEM_PROMPT: &str = r#"You are an AI assistant who is both a registered dietitian and a recipe developer.

From the ingredients and preferences given by the user, propose the following two menus:

1. A menu made only from the ingredients on hand (plan_without_budget)
2. If a budget is given, a menu that also uses additional ingredients (plan_with_budget)
   - Suggest new ingredients that improve nutrition or variety
   - If no useful suggestion fits within the budget, say "No additional menu fits within the budget."

Always answer in exactly this JSON format:
{
  "menu_title": "menu title",
  "plan_without_budget": {
    "dishes": [
      {
        "name": "dish name",
        "ingredients": [...],
        "steps": [...],
        "calories": number,
        "nutrition": {"protein": "Xg", "fat": "Yg", "carbohydrates": "Zg"}
      }
    ],
    "total_calories": number,
    "notes": "additional notes"
  },
  "plan_with_budget": {
    "dishes": [... or an empty array ...],
    "shopping_list": ["additional ingredient to buy", ...],
    "total_calories": number or 0,
    "notes": "additional notes or 'No additional menu fits within the budget.'"
  }
}
"#;

const SINGLE_PLAN_SYSTEM_PROMPT: &str = r#"You are an AI assistant who is both a registered dietitian and a recipe developer.

From the ingredients, additional budget and preferences given by the user, propose one balanced menu.
You may add ingredients that fit within the budget to improve nutrition or variety.

Always answer in exactly this JSON format:
{
  "menu_title": "menu title",
  "dishes": [
    {
      "name": "dish name",
      "ingredients": [...],
      "steps": [...],
      "calories": number,
      "nutrition": {"protein": "Xg", "fat": "Yg", "carbohydrates": "Zg"}
    }
  ],
  "total_calories": number,
  "notes": "additional notes"
}
"#;

/// Response schema the model is instructed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuSchema {
    /// One `dishes` list with totals and notes.
    SinglePlan,
    /// `plan_without_budget` plus a budget-constrained `plan_with_budget`.
    #[default]
    DualPlan,
}

impl MenuSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuSchema::SinglePlan => "single_plan",
            MenuSchema::DualPlan => "dual_plan",
        }
    }
}

impl fmt::Display for MenuSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single_plan" | "single" => Ok(MenuSchema::SinglePlan),
            "dual_plan" | "dual" => Ok(MenuSchema::DualPlan),
            other => Err(format!(
                "unknown menu schema '{}', expected 'single_plan' or 'dual_plan'",
                other
            )),
        }
    }
}

/// Builds the system and user messages for one menu request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTemplate {
    schema: MenuSchema,
}

impl PromptTemplate {
    pub fn new(schema: MenuSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> MenuSchema {
        self.schema
    }

    pub fn system_prompt(&self) -> &'static str {
        match self.schema {
            MenuSchema::SinglePlan => SINGLE_PLAN_SYSTEM_PROMPT,
            MenuSchema::DualPlan => DUAL_PLAN_SYSTEM_PROMPT,
        }
    }

    pub fn user_prompt(&self, request: &MenuRequest) -> String {
        let ingredients = Value::from(request.ingredients.clone());
        let budget = render_optional(request.budget.as_ref()).unwrap_or_else(|| NO_BUDGET.into());
        let preference = render_optional(request.preference.as_ref())
            .unwrap_or_else(|| NO_PREFERENCE.into());

        format!(
            "Ingredients: {}\nAdditional budget: {}\nPreferences and conditions: {}\nReturn the menu plan in JSON format.",
            ingredients, budget, preference
        )
    }
}

/// Strings are inserted as-is, other JSON values by their JSON text.
/// Null and blank strings count as absent.
fn render_optional(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
