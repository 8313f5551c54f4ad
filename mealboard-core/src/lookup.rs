//! Client for the server's recipe, suggestion and categorization lookups.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::RecipeInfo;
use crate::store::build_http_url;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Lookup service returned status {0}")]
    Status(u16),
    #[error("Invalid lookup response: {0}")]
    Decode(String),
}

#[derive(Serialize)]
struct RecipeRequest<'a> {
    dish_name: &'a str,
}

#[derive(Serialize)]
struct SuggestRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Serialize)]
struct CategorizeRequest<'a> {
    items: &'a [String],
}

/// Category name to the item texts filed under it.
pub type Categories = HashMap<String, Vec<String>>;

#[derive(Debug, Clone)]
pub struct LookupClient {
    server_url: String,
    client: reqwest::Client,
}

impl LookupClient {
    pub fn new(server_url: impl Into<String>) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| LookupError::Connection(e.to_string()))?;
        Ok(Self {
            server_url: server_url.into(),
            client,
        })
    }

    /// Look up URL, ingredients, instructions and calories for a dish.
    pub async fn recipe(&self, dish_name: &str) -> Result<RecipeInfo, LookupError> {
        self.post("/api/ai/recipe", &RecipeRequest { dish_name })
            .await
    }

    /// Dish name suggestions for a partial query.
    pub async fn suggest(&self, query: &str) -> Result<Vec<String>, LookupError> {
        let response: SuggestResponse = self.post("/api/ai/suggest", &SuggestRequest { query }).await?;
        Ok(response.suggestions)
    }

    /// Sort shopping list lines into store categories.
    pub async fn categorize(&self, items: &[String]) -> Result<Categories, LookupError> {
        self.post("/api/ai/categorize", &CategorizeRequest { items })
            .await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, LookupError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_http_url(&self.server_url, path);
        tracing::debug!(%url, "lookup request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| LookupError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}
