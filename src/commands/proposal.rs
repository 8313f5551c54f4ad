//! Proposal commands: propose, vote, approve, delete, copy, recipe.

use clap::Args;
use mealboard_core::{BoardError, Document, Proposal, RecipeInfo};

use super::{confirm, format_calories, meal_type, parse_date};
use crate::config::Config;
use crate::context::{short_id, BoardContext};

/// Propose a dish for a meal
#[derive(Args)]
pub struct ProposeCommand {
    /// Date (YYYY-MM-DD)
    date: String,

    /// Meal type (e.g. Abendessen)
    meal_type: String,

    /// Dish name
    name: String,

    /// Look up recipe details before adding
    #[arg(long)]
    lookup: bool,
}

impl ProposeCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(&self.date)?;
        let meal_type = meal_type(&config.board, &self.meal_type)?;
        let ctx = BoardContext::open(config)?;
        let user = ctx.user()?;

        let mut proposal = Proposal::new(self.name.clone(), user.clone());
        if self.lookup {
            match ctx.runtime.block_on(ctx.lookup()?.recipe(&self.name)) {
                Ok(recipe) => proposal = proposal.with_recipe(&recipe),
                Err(e) => eprintln!("Recipe lookup failed: {}", e),
            }
        }

        let id = ctx.mutate(|doc| doc.add_proposal(date, meal_type, proposal, &user))??;
        println!(
            "Proposed '{}' for {} on {} ({})",
            self.name,
            meal_type,
            date,
            short_id(&id)
        );
        Ok(())
    }
}

/// Vote for a proposal, or take the vote back
#[derive(Args)]
pub struct VoteCommand {
    /// Proposal id (or unique prefix)
    id: String,
}

impl VoteCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let user = ctx.user()?;
        let (key, id) = ctx.find_proposal(&self.id)?;

        let voted = ctx.mutate(|doc| doc.toggle_vote(&key, id, &user))??;
        if voted {
            println!("Voted for {}", short_id(&id));
        } else {
            println!("Vote for {} withdrawn", short_id(&id));
        }
        Ok(())
    }
}

/// Approve a proposal as the winner of its meal (organizer only)
#[derive(Args)]
pub struct ApproveCommand {
    /// Proposal id (or unique prefix)
    id: String,

    /// Don't look up missing ingredients first
    #[arg(long)]
    no_lookup: bool,
}

impl ApproveCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let user = ctx.organizer()?;
        let (key, id) = ctx.find_proposal(&self.id)?;
        let proposal = proposal_named(&ctx.document(), id)?;

        // Try to fill in ingredients so the grocery list gets real items
        // rather than a placeholder.
        let recipe = if !self.no_lookup && !proposal.has_ingredients() {
            match ctx.runtime.block_on(ctx.lookup()?.recipe(&proposal.name)) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    eprintln!("Recipe lookup failed: {}", e);
                    None
                }
            }
        } else {
            None
        };

        ctx.mutate(|doc| {
            if let Some(recipe) = &recipe {
                doc.apply_recipe(&key, id, recipe)?;
            }
            doc.approve_proposal(&key, id, &user)
        })??;

        println!("Approved '{}'", proposal.name);
        let document = ctx.document();
        if document.groceries.iter().any(|g| g.is_placeholder_for(id)) {
            println!("No ingredients known yet; added a placeholder to the grocery list.");
        }
        Ok(())
    }
}

/// Delete a proposal (organizer or proposer)
#[derive(Args)]
pub struct DeleteCommand {
    /// Proposal id (or unique prefix)
    id: String,

    /// Skip confirmation
    #[arg(long, short)]
    force: bool,
}

impl DeleteCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let user = ctx.user()?;
        let (key, id) = ctx.find_proposal(&self.id)?;
        let proposal = proposal_named(&ctx.document(), id)?;

        if proposal.proposer != user {
            ctx.organizer()?;
        }
        if !self.force && !confirm(&format!("Delete '{}'?", proposal.name))? {
            println!("Deletion cancelled.");
            return Ok(());
        }

        let removed = ctx.mutate(|doc| doc.delete_proposal(&key, id, &user))??;
        println!("Deleted '{}'", removed.name);
        Ok(())
    }
}

/// Copy a proposal to another day
#[derive(Args)]
pub struct CopyCommand {
    /// Proposal id (or unique prefix)
    id: String,

    /// Target date (YYYY-MM-DD)
    date: String,

    /// Target meal type (defaults to the source meal type)
    #[arg(long, short)]
    meal_type: Option<String>,
}

impl CopyCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(&self.date)?;
        let ctx = BoardContext::open(config)?;
        let user = ctx.user()?;
        let (from, id) = ctx.find_proposal(&self.id)?;

        let target_type = match &self.meal_type {
            Some(t) => meal_type(&config.board, t)?.to_string(),
            None => ctx
                .document()
                .slot(&from)
                .map(|s| s.meal_type.clone())
                .ok_or_else(|| BoardError::SlotNotFound(from.clone()))?,
        };

        let copy_id =
            ctx.mutate(|doc| doc.copy_proposal(&from, id, date, &target_type, &user))??;
        println!(
            "Copied to {} on {} ({})",
            target_type,
            date,
            short_id(&copy_id)
        );
        Ok(())
    }
}

/// Show a proposal's recipe, optionally looking it up
#[derive(Args)]
pub struct RecipeCommand {
    /// Proposal id (or unique prefix)
    id: String,

    /// Fetch recipe details and fill in what is missing
    #[arg(long)]
    lookup: bool,
}

impl RecipeCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let (key, id) = ctx.find_proposal(&self.id)?;

        if self.lookup {
            let name = proposal_named(&ctx.document(), id)?.name;
            let recipe: RecipeInfo = ctx.runtime.block_on(ctx.lookup()?.recipe(&name))?;
            let changed = ctx.mutate(|doc| doc.apply_recipe(&key, id, &recipe))??;
            if !changed {
                println!("Nothing new found; existing details kept.");
            }
        }

        let proposal = proposal_named(&ctx.document(), id)?;
        println!("{}", proposal.name);
        println!("{}", "-".repeat(proposal.name.chars().count()));
        if let Some(url) = proposal.recipe_url.as_deref().filter(|u| !u.is_empty()) {
            println!("Recipe: {}", url);
        }
        if let Some(kcal) = proposal.calories.filter(|c| *c > 0.0) {
            println!("Calories: {}", format_calories(kcal));
        }
        if let Some(ingredients) = proposal.ingredients.as_ref().filter(|i| !i.is_empty()) {
            println!("\nIngredients:");
            for ingredient in ingredients {
                println!("  - {}", ingredient);
            }
        }
        if let Some(steps) = proposal.instructions.as_ref().filter(|i| !i.is_empty()) {
            println!("\nInstructions:");
            for (i, step) in steps.iter().enumerate() {
                println!("  {}. {}", i + 1, step);
            }
        }
        if !proposal.has_ingredients() && !proposal.has_recipe_url() {
            println!("No recipe details yet. Try --lookup.");
        }
        Ok(())
    }
}

fn proposal_named(document: &Document, id: uuid::Uuid) -> Result<Proposal, BoardError> {
    document
        .find_proposal(id)
        .map(|(_, p)| p.clone())
        .ok_or(BoardError::ProposalNotFound(id))
}
