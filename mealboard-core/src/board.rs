//! User-level operations on the board document.
//!
//! These are the mutations a client performs locally before the sync engine
//! writes them back. Every operation that changes proposals records an entry
//! in the activity log for the acting user.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    is_dessert, ActivityEntry, ActivityKind, Document, GroceryItem, Placeholder, Proposal,
    RecipeInfo, Slot, SlotKey,
};

#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("Slot not found: {0}")]
    SlotNotFound(SlotKey),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(Uuid),

    #[error("Proposal name must not be empty")]
    EmptyName,

    #[error("Cannot copy a proposal onto its own slot")]
    SameSlot,

    #[error("Cannot copy a {from} proposal to {to}")]
    IncompatibleMealType { from: String, to: String },

    #[error("\"{name}\" already exists in {slot}")]
    DuplicateName { name: String, slot: SlotKey },

    #[error("No grocery item at position {0}")]
    GroceryIndexOutOfRange(usize),

    #[error("No placeholder for proposal {0}")]
    PlaceholderNotFound(Uuid),

    #[error("Recipe lookup returned no ingredients")]
    NoIngredients,
}

fn short_date(date: NaiveDate) -> String {
    date.format("%d.%m.").to_string()
}

impl Document {
    /// Record an activity entry. Anonymous actions are not logged.
    pub fn log(&mut self, kind: ActivityKind, user: &str, message: impl Into<String>) {
        if user.is_empty() {
            return;
        }
        self.activity.push(ActivityEntry::new(kind, user, message));
    }

    /// Add a proposal to the (date, meal type) slot, creating the slot when
    /// needed. Returns the new proposal's id.
    pub fn add_proposal(
        &mut self,
        date: NaiveDate,
        meal_type: &str,
        mut proposal: Proposal,
        user: &str,
    ) -> Result<Uuid, BoardError> {
        proposal.name = proposal.name.trim().to_string();
        if proposal.name.is_empty() {
            return Err(BoardError::EmptyName);
        }

        let key = SlotKey::new(date, meal_type);
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Slot::new(date, meal_type));
        let id = proposal.id;
        let message = format!(
            "hat \"{}\" für {} am {} vorgeschlagen",
            proposal.name,
            meal_type,
            short_date(date)
        );
        slot.proposals.push(proposal);

        self.log(ActivityKind::Add, user, message);
        Ok(id)
    }

    /// Toggle `user`'s vote on a proposal. Returns true if the vote is now cast.
    pub fn toggle_vote(&mut self, key: &SlotKey, id: Uuid, user: &str) -> Result<bool, BoardError> {
        let proposal = self.proposal_mut(key, id)?;
        let voted = proposal.toggle_vote(user);
        let message = if voted {
            format!("hat für \"{}\" gestimmt", proposal.name)
        } else {
            format!("hat die Stimme für \"{}\" zurückgezogen", proposal.name)
        };

        self.log(ActivityKind::Vote, user, message);
        Ok(voted)
    }

    /// Approve a proposal as the slot's winner.
    ///
    /// Every other proposal in the slot loses its approval. The winner's
    /// ingredients go onto the grocery list (skipping texts already there);
    /// without known ingredients a placeholder is added instead.
    pub fn approve_proposal(&mut self, key: &SlotKey, id: Uuid, user: &str) -> Result<(), BoardError> {
        let slot = self
            .slots
            .get_mut(key)
            .ok_or_else(|| BoardError::SlotNotFound(key.clone()))?;
        if slot.proposal(id).is_none() {
            return Err(BoardError::ProposalNotFound(id));
        }

        for proposal in &mut slot.proposals {
            proposal.approved = proposal.id == id;
        }
        slot.approved = true;

        let (date, meal_type) = (slot.date, slot.meal_type.clone());
        let winner = slot
            .proposal(id)
            .cloned()
            .ok_or(BoardError::ProposalNotFound(id))?;

        match winner.ingredients.as_ref().filter(|i| !i.is_empty()) {
            Some(ingredients) => {
                self.add_ingredients(ingredients);
            }
            None if !self.groceries.iter().any(|g| g.is_placeholder_for(id)) => {
                let placeholder = Placeholder::new(winner.id, &winner.name, date, meal_type);
                self.groceries.push(GroceryItem::Placeholder(placeholder));
            }
            None => {}
        }

        self.log(
            ActivityKind::Approve,
            user,
            format!("hat \"{}\" genehmigt", winner.name),
        );
        Ok(())
    }

    /// Delete a proposal. Deleting the approved winner also takes its
    /// ingredients (or placeholder) off the grocery list and reopens the slot.
    pub fn delete_proposal(&mut self, key: &SlotKey, id: Uuid, user: &str) -> Result<Proposal, BoardError> {
        let slot = self
            .slots
            .get_mut(key)
            .ok_or_else(|| BoardError::SlotNotFound(key.clone()))?;
        let position = slot
            .proposals
            .iter()
            .position(|p| p.id == id)
            .ok_or(BoardError::ProposalNotFound(id))?;
        let removed = slot.proposals.remove(position);

        if removed.approved {
            slot.approved = false;
            for ingredient in removed.ingredients.iter().flatten() {
                if let Some(index) = self.groceries.iter().position(|g| g.text() == ingredient.as_str()) {
                    self.groceries.remove(index);
                }
            }
            self.groceries.retain(|g| !g.is_placeholder_for(id));
        }

        self.log(
            ActivityKind::Delete,
            user,
            format!("hat \"{}\" gelöscht", removed.name),
        );
        Ok(removed)
    }

    /// Whether a proposal from `source` may be copied to the slot
    /// (`date`, `meal_type`). Desserts only go to desserts, main meals only
    /// to main meals, and never onto the source slot itself.
    pub fn can_copy_to(source: &Slot, date: NaiveDate, meal_type: &str) -> Result<(), BoardError> {
        if source.date == date && source.meal_type.eq_ignore_ascii_case(meal_type) {
            return Err(BoardError::SameSlot);
        }
        if source.is_dessert() != is_dessert(meal_type) {
            return Err(BoardError::IncompatibleMealType {
                from: source.meal_type.clone(),
                to: meal_type.to_string(),
            });
        }
        Ok(())
    }

    /// Copy a proposal to another slot as a fresh proposal owned by `user`.
    pub fn copy_proposal(
        &mut self,
        from: &SlotKey,
        id: Uuid,
        date: NaiveDate,
        meal_type: &str,
        user: &str,
    ) -> Result<Uuid, BoardError> {
        let source = self
            .slots
            .get(from)
            .ok_or_else(|| BoardError::SlotNotFound(from.clone()))?;
        Self::can_copy_to(source, date, meal_type)?;
        let original = source
            .proposal(id)
            .ok_or(BoardError::ProposalNotFound(id))?;

        let target_key = SlotKey::new(date, meal_type);
        if self
            .slots
            .get(&target_key)
            .is_some_and(|s| s.has_proposal_named(&original.name))
        {
            return Err(BoardError::DuplicateName {
                name: original.name.clone(),
                slot: target_key,
            });
        }

        let mut copy = Proposal::new(original.name.clone(), user);
        copy.recipe_url = original.recipe_url.clone();
        copy.ingredients = Some(original.ingredients.clone().unwrap_or_default());
        copy.instructions = Some(original.instructions.clone().unwrap_or_default());
        let name = copy.name.clone();
        let copy_id = copy.id;

        self.slots
            .entry(target_key)
            .or_insert_with(|| Slot::new(date, meal_type))
            .proposals
            .push(copy);

        self.log(
            ActivityKind::Add,
            user,
            format!("hat \"{}\" kopiert nach {}", name, short_date(date)),
        );
        Ok(copy_id)
    }

    /// Apply a recipe lookup result to a proposal, filling only the fields
    /// it does not have yet.
    pub fn apply_recipe(&mut self, key: &SlotKey, id: Uuid, recipe: &RecipeInfo) -> Result<bool, BoardError> {
        Ok(self.proposal_mut(key, id)?.fill_recipe(recipe))
    }

    /// Replace the placeholder of an approved proposal with the ingredients
    /// of a freshly looked-up recipe. Returns the number of grocery items
    /// added.
    pub fn resolve_placeholder(
        &mut self,
        proposal_id: Uuid,
        recipe: &RecipeInfo,
        user: &str,
    ) -> Result<usize, BoardError> {
        let placeholder = self
            .groceries
            .iter()
            .find_map(|g| g.as_placeholder().filter(|p| p.proposal_id == proposal_id))
            .cloned()
            .ok_or(BoardError::PlaceholderNotFound(proposal_id))?;
        let ingredients = recipe
            .ingredients
            .clone()
            .filter(|i| !i.is_empty())
            .ok_or(BoardError::NoIngredients)?;

        let key = SlotKey::new(placeholder.date, &placeholder.meal_type);
        if let Some(proposal) = self
            .slots
            .get_mut(&key)
            .and_then(|s| s.proposal_mut(proposal_id))
        {
            proposal.fill_recipe(recipe);
        }

        self.groceries.retain(|g| !g.is_placeholder_for(proposal_id));
        let added = self.add_ingredients(&ingredients);

        self.log(
            ActivityKind::Edit,
            user,
            format!("hat Zutaten für \"{}\" nachgeladen", placeholder.dish_name),
        );
        Ok(added)
    }

    /// Append ingredients whose text is not on the grocery list yet.
    fn add_ingredients(&mut self, ingredients: &[String]) -> usize {
        let mut added = 0;
        for ingredient in ingredients {
            if !self.groceries.iter().any(|g| g.text() == ingredient.as_str()) {
                self.groceries.push(GroceryItem::Text(ingredient.clone()));
                added += 1;
            }
        }
        added
    }

    /// Add a free-text grocery item. Blank input is ignored.
    pub fn add_grocery(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.groceries.push(GroceryItem::from(text));
        true
    }

    /// Replace the item at `index` with new text. Blank input leaves the item
    /// unchanged.
    pub fn edit_grocery(&mut self, index: usize, text: &str) -> Result<bool, BoardError> {
        let item = self
            .groceries
            .get_mut(index)
            .ok_or(BoardError::GroceryIndexOutOfRange(index))?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        *item = GroceryItem::from(text);
        Ok(true)
    }

    pub fn remove_grocery(&mut self, index: usize) -> Result<GroceryItem, BoardError> {
        if index >= self.groceries.len() {
            return Err(BoardError::GroceryIndexOutOfRange(index));
        }
        Ok(self.groceries.remove(index))
    }

    pub fn set_organizer_pin(&mut self, pin: &str) {
        self.settings.organizer_pin = pin.to_string();
    }

    /// Clear all dishes, groceries and activity. Settings are kept.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.groceries.clear();
        self.activity.clear();
    }

    /// Calories of a slot's approved winner; zero while undecided or unknown.
    pub fn slot_calories(&self, key: &SlotKey) -> f64 {
        self.slots
            .get(key)
            .and_then(Slot::winner)
            .and_then(|p| p.calories)
            .unwrap_or(0.0)
    }

    pub fn daily_calories<S: AsRef<str>>(&self, date: NaiveDate, meal_types: &[S]) -> f64 {
        meal_types
            .iter()
            .map(|t| self.slot_calories(&SlotKey::new(date, t.as_ref())))
            .sum()
    }

    /// Find the slot holding a proposal.
    pub fn find_proposal(&self, id: Uuid) -> Option<(&SlotKey, &Proposal)> {
        self.slots
            .iter()
            .find_map(|(key, slot)| slot.proposal(id).map(|p| (key, p)))
    }

    fn proposal_mut(&mut self, key: &SlotKey, id: Uuid) -> Result<&mut Proposal, BoardError> {
        self.slots
            .get_mut(key)
            .ok_or_else(|| BoardError::SlotNotFound(key.clone()))?
            .proposal_mut(id)
            .ok_or(BoardError::ProposalNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eve() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 24).unwrap()
    }

    fn board_with_proposal(name: &str) -> (Document, SlotKey, Uuid) {
        let mut doc = Document::new();
        let id = doc
            .add_proposal(eve(), "Abendessen", Proposal::new(name, "Eltern"), "Eltern")
            .unwrap();
        (doc, SlotKey::new(eve(), "Abendessen"), id)
    }

    #[test]
    fn test_add_proposal_creates_slot_and_logs() {
        let (doc, key, id) = board_with_proposal("  Fondue ");

        let slot = doc.slot(&key).unwrap();
        assert_eq!(slot.meal_type, "Abendessen");
        assert_eq!(slot.proposal(id).unwrap().name, "Fondue");
        assert_eq!(doc.activity.len(), 1);
        assert_eq!(doc.activity[0].kind, "add");
        assert!(doc.activity[0].message.contains("24.12."));
    }

    #[test]
    fn test_add_proposal_rejects_blank_name() {
        let mut doc = Document::new();
        let result = doc.add_proposal(eve(), "Abendessen", Proposal::new("   ", "Eltern"), "Eltern");
        assert_eq!(result, Err(BoardError::EmptyName));
        assert!(doc.slots.is_empty());
    }

    #[test]
    fn test_anonymous_actions_are_not_logged() {
        let mut doc = Document::new();
        doc.add_proposal(eve(), "Abendessen", Proposal::new("Fondue", ""), "")
            .unwrap();
        assert!(doc.activity.is_empty());
    }

    #[test]
    fn test_toggle_vote() {
        let (mut doc, key, id) = board_with_proposal("Fondue");

        assert!(doc.toggle_vote(&key, id, "Hamburg").unwrap());
        assert_eq!(doc.slot(&key).unwrap().proposal(id).unwrap().vote_count(), 2);
        assert!(!doc.toggle_vote(&key, id, "Hamburg").unwrap());
        assert_eq!(doc.activity.len(), 3);
    }

    #[test]
    fn test_toggle_vote_unknown_proposal() {
        let (mut doc, key, _) = board_with_proposal("Fondue");
        let missing = Uuid::new_v4();
        assert_eq!(
            doc.toggle_vote(&key, missing, "Hamburg"),
            Err(BoardError::ProposalNotFound(missing))
        );
    }

    #[test]
    fn test_approve_single_winner_with_ingredients() {
        let (mut doc, key, fondue) = board_with_proposal("Fondue");
        let raclette = doc
            .add_proposal(eve(), "Abendessen", Proposal::new("Raclette", "Hamburg"), "Hamburg")
            .unwrap();
        doc.slot_mut(&key).unwrap().proposal_mut(fondue).unwrap().ingredients =
            Some(vec!["400g Käse".to_string(), "Brot".to_string()]);
        doc.add_grocery("Brot");

        doc.approve_proposal(&key, raclette, "Organisator").unwrap();
        doc.approve_proposal(&key, fondue, "Organisator").unwrap();

        let slot = doc.slot(&key).unwrap();
        assert!(slot.approved);
        assert!(slot.proposal(fondue).unwrap().approved);
        assert!(!slot.proposal(raclette).unwrap().approved);

        let texts: Vec<&str> = doc.groceries.iter().map(|g| g.text()).collect();
        assert!(texts.contains(&"400g Käse"));
        assert_eq!(texts.iter().filter(|t| **t == "Brot").count(), 1);
    }

    #[test]
    fn test_approve_without_ingredients_adds_placeholder() {
        let (mut doc, key, id) = board_with_proposal("Gans");
        doc.approve_proposal(&key, id, "Organisator").unwrap();

        assert_eq!(doc.groceries.len(), 1);
        let placeholder = doc.groceries[0].as_placeholder().unwrap();
        assert_eq!(placeholder.proposal_id, id);
        assert_eq!(placeholder.text, "Gans (Zutaten prüfen)");

        doc.approve_proposal(&key, id, "Organisator").unwrap();
        assert_eq!(doc.groceries.len(), 1);
    }

    #[test]
    fn test_delete_approved_cleans_groceries() {
        let (mut doc, key, id) = board_with_proposal("Fondue");
        doc.slot_mut(&key).unwrap().proposal_mut(id).unwrap().ingredients =
            Some(vec!["400g Käse".to_string()]);
        doc.add_grocery("Salz");
        doc.approve_proposal(&key, id, "Organisator").unwrap();

        let removed = doc.delete_proposal(&key, id, "Organisator").unwrap();

        assert_eq!(removed.name, "Fondue");
        assert!(!doc.slot(&key).unwrap().approved);
        assert_eq!(doc.groceries, vec![GroceryItem::from("Salz")]);
    }

    #[test]
    fn test_delete_approved_removes_placeholder() {
        let (mut doc, key, id) = board_with_proposal("Gans");
        doc.approve_proposal(&key, id, "Organisator").unwrap();
        doc.delete_proposal(&key, id, "Organisator").unwrap();
        assert!(doc.groceries.is_empty());
    }

    #[test]
    fn test_delete_unapproved_keeps_slot_state() {
        let (mut doc, key, fondue) = board_with_proposal("Fondue");
        let raclette = doc
            .add_proposal(eve(), "Abendessen", Proposal::new("Raclette", "Hamburg"), "Hamburg")
            .unwrap();
        doc.approve_proposal(&key, fondue, "Organisator").unwrap();

        doc.delete_proposal(&key, raclette, "Hamburg").unwrap();
        assert!(doc.slot(&key).unwrap().approved);
    }

    #[test]
    fn test_copy_proposal() {
        let (mut doc, key, id) = board_with_proposal("Fondue");
        doc.slot_mut(&key).unwrap().proposal_mut(id).unwrap().recipe_url =
            Some("https://example.com/fondue".to_string());
        let boxing_day = NaiveDate::from_ymd_opt(2025, 12, 26).unwrap();

        let copy_id = doc
            .copy_proposal(&key, id, boxing_day, "Mittagessen", "Konstanz")
            .unwrap();

        let target = doc.slot(&SlotKey::new(boxing_day, "Mittagessen")).unwrap();
        let copy = target.proposal(copy_id).unwrap();
        assert_ne!(copy_id, id);
        assert_eq!(copy.proposer, "Konstanz");
        assert!(copy.has_voted("Konstanz"));
        assert_eq!(copy.recipe_url.as_deref(), Some("https://example.com/fondue"));
    }

    #[test]
    fn test_copy_rules() {
        let (mut doc, key, id) = board_with_proposal("Fondue");
        let boxing_day = NaiveDate::from_ymd_opt(2025, 12, 26).unwrap();

        assert_eq!(
            doc.copy_proposal(&key, id, eve(), "Abendessen", "Konstanz"),
            Err(BoardError::SameSlot)
        );
        assert!(matches!(
            doc.copy_proposal(&key, id, boxing_day, "Dessert", "Konstanz"),
            Err(BoardError::IncompatibleMealType { .. })
        ));

        doc.copy_proposal(&key, id, boxing_day, "Abendessen", "Konstanz")
            .unwrap();
        assert!(matches!(
            doc.copy_proposal(&key, id, boxing_day, "Abendessen", "Konstanz"),
            Err(BoardError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_apply_recipe_fills_gaps() {
        let (mut doc, key, id) = board_with_proposal("Fondue");
        let recipe = RecipeInfo {
            url: Some("https://example.com/fondue".to_string()),
            ingredients: Some(vec!["400g Käse".to_string()]),
            instructions: None,
            calories: Some(900.0),
        };

        assert!(doc.apply_recipe(&key, id, &recipe).unwrap());
        assert!(!doc.apply_recipe(&key, id, &recipe).unwrap());
        let proposal = doc.slot(&key).unwrap().proposal(id).unwrap();
        assert_eq!(proposal.calories, Some(900.0));
    }

    #[test]
    fn test_resolve_placeholder() {
        let (mut doc, key, id) = board_with_proposal("Gans");
        doc.add_grocery("1 Rotkohl");
        doc.approve_proposal(&key, id, "Organisator").unwrap();

        let recipe = RecipeInfo {
            ingredients: Some(vec!["1 Gans".to_string(), "1 Rotkohl".to_string()]),
            ..RecipeInfo::default()
        };
        let added = doc.resolve_placeholder(id, &recipe, "Eltern").unwrap();

        assert_eq!(added, 1);
        assert!(doc.groceries.iter().all(|g| g.as_placeholder().is_none()));
        let proposal = doc.slot(&key).unwrap().proposal(id).unwrap();
        assert!(proposal.has_ingredients());
    }

    #[test]
    fn test_resolve_placeholder_without_ingredients() {
        let (mut doc, key, id) = board_with_proposal("Gans");
        doc.approve_proposal(&key, id, "Organisator").unwrap();

        let result = doc.resolve_placeholder(id, &RecipeInfo::default(), "Eltern");
        assert_eq!(result, Err(BoardError::NoIngredients));
        assert_eq!(doc.groceries.len(), 1);
    }

    #[test]
    fn test_grocery_edit_and_remove() {
        let mut doc = Document::new();
        assert!(doc.add_grocery(" Salz "));
        assert!(!doc.add_grocery("   "));

        assert!(doc.edit_grocery(0, "Meersalz").unwrap());
        assert!(!doc.edit_grocery(0, "").unwrap());
        assert_eq!(doc.groceries[0].text(), "Meersalz");

        assert_eq!(
            doc.remove_grocery(3),
            Err(BoardError::GroceryIndexOutOfRange(3))
        );
        assert_eq!(doc.remove_grocery(0).unwrap().text(), "Meersalz");
    }

    #[test]
    fn test_calories() {
        let (mut doc, key, id) = board_with_proposal("Fondue");
        doc.slot_mut(&key).unwrap().proposal_mut(id).unwrap().calories = Some(900.0);
        assert_eq!(doc.slot_calories(&key), 0.0);

        doc.approve_proposal(&key, id, "Organisator").unwrap();
        assert_eq!(doc.slot_calories(&key), 900.0);
        assert_eq!(
            doc.daily_calories(eve(), &["Mittagessen", "Abendessen", "Dessert"]),
            900.0
        );
    }

    #[test]
    fn test_reset_keeps_settings() {
        let (mut doc, _, _) = board_with_proposal("Fondue");
        doc.add_grocery("Salz");
        doc.set_organizer_pin("1234");

        doc.reset();
        assert!(doc.is_empty());
        assert_eq!(doc.settings.organizer_pin, "1234");
    }
}
