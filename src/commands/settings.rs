use clap::{Args, Subcommand};

use crate::config::Config;
use crate::context::BoardContext;

/// Board settings (organizer only)
#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show the current settings
    Show,

    /// Set the PIN that guards the organizer role
    Pin {
        /// New PIN
        #[arg(conflicts_with = "clear", required_unless_present = "clear")]
        pin: Option<String>,

        /// Remove the PIN
        #[arg(long)]
        clear: bool,
    },
}

impl SettingsCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        ctx.organizer()?;

        match &self.command {
            SettingsSubcommand::Show => {
                let settings = ctx.document().settings;
                if settings.requires_pin() {
                    println!("Organizer PIN: set");
                } else {
                    println!("Organizer PIN: not set");
                }
            }
            SettingsSubcommand::Pin { pin, .. } => {
                let pin = pin.clone().unwrap_or_default();
                // Settings are taken from the server on every merge, so the
                // change is written on top of the latest server copy.
                ctx.runtime
                    .block_on(ctx.engine.overwrite_now(|doc| doc.set_organizer_pin(&pin)))?;
                if pin.is_empty() {
                    println!("Organizer PIN removed.");
                } else {
                    println!("Organizer PIN updated.");
                }
            }
        }
        Ok(())
    }
}
