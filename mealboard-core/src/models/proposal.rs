use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::RecipeInfo;

/// A dish candidate for a slot.
///
/// The `id` is assigned by the client that creates the proposal and is never
/// reassigned; it is the identity used when merging. Votes are a set of user
/// ids, transported as a (sorted) JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub proposer: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub votes: BTreeSet<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

impl Proposal {
    /// Create a new proposal. The proposer automatically votes for it.
    pub fn new(name: impl Into<String>, proposer: impl Into<String>) -> Self {
        let proposer = proposer.into();
        let mut votes = BTreeSet::new();
        votes.insert(proposer.clone());
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            proposer,
            votes,
            approved: false,
            recipe_url: None,
            ingredients: None,
            instructions: None,
            calories: None,
        }
    }

    pub fn with_recipe(mut self, recipe: &RecipeInfo) -> Self {
        self.fill_recipe(recipe);
        self
    }

    pub fn vote_count(&self) -> usize {
        self.votes.len()
    }

    pub fn has_voted(&self, user: &str) -> bool {
        self.votes.contains(user)
    }

    /// Toggle a user's vote. Returns true if the vote is now cast.
    pub fn toggle_vote(&mut self, user: &str) -> bool {
        if self.votes.remove(user) {
            false
        } else {
            self.votes.insert(user.to_string());
            true
        }
    }

    pub fn has_recipe_url(&self) -> bool {
        self.recipe_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn has_ingredients(&self) -> bool {
        self.ingredients.as_ref().is_some_and(|i| !i.is_empty())
    }

    pub fn has_instructions(&self) -> bool {
        self.instructions.as_ref().is_some_and(|i| !i.is_empty())
    }

    /// Zero counts as unknown.
    pub fn has_calories(&self) -> bool {
        self.calories.is_some_and(|c| c != 0.0)
    }

    /// Copy recipe fields from another proposal, but only into fields this
    /// proposal has not populated yet. Returns true if anything changed.
    pub fn fill_missing_from(&mut self, other: &Proposal) -> bool {
        self.fill_fields(
            other.recipe_url.as_deref(),
            other.ingredients.as_deref(),
            other.instructions.as_deref(),
            other.calories,
        )
    }

    /// Apply a recipe lookup result under the same fill-if-absent rule.
    pub fn fill_recipe(&mut self, recipe: &RecipeInfo) -> bool {
        self.fill_fields(
            recipe.url.as_deref(),
            recipe.ingredients.as_deref(),
            recipe.instructions.as_deref(),
            recipe.calories,
        )
    }

    fn fill_fields(
        &mut self,
        recipe_url: Option<&str>,
        ingredients: Option<&[String]>,
        instructions: Option<&[String]>,
        calories: Option<f64>,
    ) -> bool {
        let mut changed = false;
        if let Some(url) = recipe_url.filter(|u| !u.is_empty()) {
            if !self.has_recipe_url() {
                self.recipe_url = Some(url.to_string());
                changed = true;
            }
        }
        if let Some(items) = ingredients.filter(|i| !i.is_empty()) {
            if !self.has_ingredients() {
                self.ingredients = Some(items.to_vec());
                changed = true;
            }
        }
        if let Some(steps) = instructions.filter(|i| !i.is_empty()) {
            if !self.has_instructions() {
                self.instructions = Some(steps.to_vec());
                changed = true;
            }
        }
        if let Some(kcal) = calories.filter(|c| *c != 0.0) {
            if !self.has_calories() {
                self.calories = Some(kcal);
                changed = true;
            }
        }
        changed
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.approved { "*" } else { " " };
        write!(
            f,
            "{} {} ({} vote{}, by {})",
            marker,
            self.name,
            self.vote_count(),
            if self.vote_count() == 1 { "" } else { "s" },
            self.proposer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_new_votes_for_itself() {
        let proposal = Proposal::new("Raclette", "Hamburg");
        assert_eq!(proposal.proposer, "Hamburg");
        assert!(proposal.has_voted("Hamburg"));
        assert_eq!(proposal.vote_count(), 1);
        assert!(!proposal.approved);
    }

    #[test]
    fn test_toggle_vote() {
        let mut proposal = Proposal::new("Raclette", "Hamburg");
        assert!(proposal.toggle_vote("Eltern"));
        assert_eq!(proposal.vote_count(), 2);
        assert!(!proposal.toggle_vote("Eltern"));
        assert_eq!(proposal.vote_count(), 1);
    }

    #[test]
    fn test_fill_missing_keeps_local_values() {
        let mut local = Proposal::new("Fondue", "Eltern");
        local.recipe_url = Some("https://local.example/fondue".to_string());

        let mut remote = local.clone();
        remote.recipe_url = Some("https://remote.example/fondue".to_string());
        remote.ingredients = Some(vec!["400g Käse".to_string()]);
        remote.calories = Some(850.0);

        assert!(local.fill_missing_from(&remote));
        assert_eq!(
            local.recipe_url.as_deref(),
            Some("https://local.example/fondue")
        );
        assert_eq!(local.ingredients, Some(vec!["400g Käse".to_string()]));
        assert_eq!(local.calories, Some(850.0));
    }

    #[test]
    fn test_empty_fields_count_as_absent() {
        let mut local = Proposal::new("Gans", "Eltern");
        local.ingredients = Some(Vec::new());
        local.calories = Some(0.0);

        let mut remote = local.clone();
        remote.ingredients = Some(vec!["1 Gans".to_string()]);
        remote.calories = Some(1200.0);

        local.fill_missing_from(&remote);
        assert_eq!(local.ingredients, Some(vec!["1 Gans".to_string()]));
        assert_eq!(local.calories, Some(1200.0));
    }

    #[test]
    fn test_json_uses_wire_names() {
        let mut proposal = Proposal::new("Stollen", "Konstanz");
        proposal.recipe_url = Some("https://example.com/stollen".to_string());

        let value = serde_json::to_value(&proposal).unwrap();
        assert_eq!(value["recipeUrl"], "https://example.com/stollen");
        assert_eq!(value["votes"], serde_json::json!(["Konstanz"]));
        assert!(value.get("ingredients").is_none());
    }

    #[test]
    fn test_duplicate_votes_collapse() {
        let json = r#"{"id":"6f1c1d3e-2b7a-4f63-9a51-0c2f5d1e9b11","name":"Ente","proposer":"A","votes":["A","B","A"]}"#;
        let proposal: Proposal = serde_json::from_str(json).unwrap();
        assert_eq!(proposal.vote_count(), 2);
        assert!(!proposal.approved);
    }
}
