use clap::Args;
use mealboard_core::Document;

use super::confirm;
use crate::config::Config;
use crate::context::BoardContext;

/// Clear all proposals, groceries and activity (organizer only)
#[derive(Args)]
pub struct ResetCommand {
    /// Skip confirmation
    #[arg(long, short)]
    force: bool,
}

impl ResetCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        ctx.organizer()?;

        if !self.force && !confirm("Delete all proposals, groceries and activity for everyone?")? {
            println!("Reset cancelled.");
            return Ok(());
        }

        ctx.runtime.block_on(ctx.engine.overwrite_now(Document::reset))?;
        println!("Board reset. Settings were kept.");
        Ok(())
    }
}
