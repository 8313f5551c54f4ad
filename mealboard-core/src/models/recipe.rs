use serde::{Deserialize, Serialize};

/// Recipe data returned by the recipe lookup service.
///
/// Every field is optional; the service may only find part of a recipe.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipeInfo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
    #[serde(default)]
    pub calories: Option<f64>,
}

impl RecipeInfo {
    pub fn has_ingredients(&self) -> bool {
        self.ingredients.as_ref().is_some_and(|i| !i.is_empty())
    }
}
