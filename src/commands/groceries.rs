//! Shared grocery list commands.

use clap::{Args, Subcommand};
use mealboard_core::shopping::{aggregate, format_export, format_flat, ShoppingLine};

use super::OutputFormat;
use crate::config::Config;
use crate::context::{short_id, BoardContext};

#[derive(Args)]
pub struct GroceriesCommand {
    #[command(subcommand)]
    pub command: GroceriesSubcommand,
}

#[derive(Subcommand)]
pub enum GroceriesSubcommand {
    /// Show the grocery list with quantities combined
    List {
        /// Show the raw entries with their index instead
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add an item
    Add {
        /// Item text, e.g. "500g Mehl"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Change the text of an item (index from `list --raw`)
    Edit {
        index: usize,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Remove an item (index from `list --raw`)
    Remove { index: usize },

    /// Look up the ingredients for a placeholder and replace it
    Resolve {
        /// Proposal id (or unique prefix) of the approved dish
        id: String,
    },

    /// Print the list grouped by store category, ready to share
    Export,
}

impl GroceriesCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;

        match &self.command {
            GroceriesSubcommand::List { raw, format } => {
                let document = ctx.document();
                if *raw {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&document.groceries)?)
                        }
                        OutputFormat::Text => {
                            for (i, item) in document.groceries.iter().enumerate() {
                                println!("{:>3}  {}", i, item);
                            }
                        }
                    }
                    return Ok(());
                }

                let lines = aggregate(&document.groceries);
                match format {
                    OutputFormat::Json => {
                        let texts: Vec<String> = lines.iter().map(ShoppingLine::text).collect();
                        println!("{}", serde_json::to_string_pretty(&texts)?);
                    }
                    OutputFormat::Text => {
                        if lines.is_empty() {
                            println!("Grocery list is empty.");
                        }
                        for line in &lines {
                            match line {
                                ShoppingLine::Placeholder(p) => {
                                    println!("[?] {}  ({})", p.text, short_id(&p.proposal_id))
                                }
                                ShoppingLine::Ingredient(_) => println!("[ ] {}", line.text()),
                            }
                        }
                    }
                }
            }

            GroceriesSubcommand::Add { text } => {
                let text = text.join(" ");
                if ctx.mutate(|doc| doc.add_grocery(&text))? {
                    println!("Added '{}'", text.trim());
                } else {
                    println!("Nothing added.");
                }
            }

            GroceriesSubcommand::Edit { index, text } => {
                let text = text.join(" ");
                let changed = ctx.mutate(|doc| doc.edit_grocery(*index, &text))??;
                if changed {
                    println!("Updated item {}", index);
                } else {
                    println!("Item {} unchanged.", index);
                }
            }

            GroceriesSubcommand::Remove { index } => {
                let removed = ctx.mutate(|doc| doc.remove_grocery(*index))??;
                println!("Removed '{}'", removed);
            }

            GroceriesSubcommand::Resolve { id } => {
                let user = ctx.user()?;
                let (_, id) = ctx.find_proposal(id)?;
                let dish = ctx
                    .document()
                    .find_proposal(id)
                    .map(|(_, p)| p.name.clone())
                    .unwrap_or_default();

                let recipe = ctx.runtime.block_on(ctx.lookup()?.recipe(&dish))?;
                let added = ctx.mutate(|doc| doc.resolve_placeholder(id, &recipe, &user))??;
                println!("Added {} ingredient(s) for '{}'", added, dish);
            }

            GroceriesSubcommand::Export => {
                let lines = aggregate(&ctx.document().groceries);
                let texts: Vec<String> = lines.iter().map(ShoppingLine::text).collect();

                let text = match ctx.runtime.block_on(ctx.lookup()?.categorize(&texts)) {
                    Ok(categories) => format_export(&lines, &categories),
                    Err(e) => {
                        tracing::warn!(error = %e, "categorization unavailable");
                        format_flat(&lines)
                    }
                };
                println!("{}", text);
            }
        }
        Ok(())
    }
}
