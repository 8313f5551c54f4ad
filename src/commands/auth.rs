//! Role selection for the CLI.
//!
//! There are no accounts. Logging in picks one of the configured roles; the
//! organizer role is guarded by the board's PIN when one is set.

use std::io::{self, Write};

use clap::Args;
use mealboard_core::SessionStore;

use crate::config::Config;
use crate::context::{BoardContext, CliError};

/// Log in as one of the board's roles
#[derive(Args)]
pub struct LoginCommand {
    /// Role name (e.g. Eltern)
    role: String,

    /// Organizer PIN (prompted for when needed)
    #[arg(long)]
    pin: Option<String>,
}

impl LoginCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let role = config
            .board
            .find_role(&self.role)
            .ok_or_else(|| CliError::UnknownRole(self.role.clone()))?;

        let ctx = BoardContext::open(config)?;
        if config.board.is_organizer(role) {
            let settings = ctx.document().settings;
            if settings.requires_pin() {
                let pin = match &self.pin {
                    Some(pin) => pin.clone(),
                    None => prompt("PIN: ")?,
                };
                if !settings.check_pin(&pin) {
                    return Err(CliError::WrongPin.into());
                }
            }
        }

        ctx.session.save(role)?;
        println!("Logged in as {}", role);
        Ok(())
    }
}

/// Forget the current role
#[derive(Args)]
pub struct LogoutCommand;

impl LogoutCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        SessionStore::new(&config.data_dir.value).clear()?;
        println!("Logged out.");
        Ok(())
    }
}

/// Show the current role
#[derive(Args)]
pub struct WhoamiCommand;

impl WhoamiCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match SessionStore::new(&config.data_dir.value).load()? {
            Some(role) if config.board.is_organizer(&role) => println!("{} (organizer)", role),
            Some(role) => println!("{}", role),
            None => println!("Not logged in."),
        }
        Ok(())
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
