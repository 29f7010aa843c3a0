use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Body of `POST /generate_menu`.
///
/// Only `ingredients` is checked; `budget` and `preference` are passed
/// through to the prompt whatever their JSON type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MenuRequest {
    #[validate(length(min = 1, message = "ingredients must not be empty"))]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub budget: Option<Value>,
    #[serde(default)]
    pub preference: Option<Value>,
}

impl MenuRequest {
    /// Deserialize and validate an untyped JSON body.
    pub fn from_value(body: Value) -> Result<Self, String> {
        let request: MenuRequest = serde_json::from_value(body).map_err(|e| e.to_string())?;
        request.validate().map_err(|e| e.to_string())?;
        Ok(request)
    }
}
