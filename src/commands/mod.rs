mod activity;
mod auth;
mod board;
mod config_cmd;
mod groceries;
mod proposal;
mod reset;
mod settings;
mod watch;

pub use activity::ActivityCommand;
pub use auth::{LoginCommand, LogoutCommand, WhoamiCommand};
pub use board::BoardCommand;
pub use config_cmd::ConfigCommand;
pub use groceries::GroceriesCommand;
pub use proposal::{
    ApproveCommand, CopyCommand, DeleteCommand, ProposeCommand, RecipeCommand, VoteCommand,
};
pub use reset::ResetCommand;
pub use settings::SettingsCommand;
pub use watch::WatchCommand;

use chrono::NaiveDate;
use clap::ValueEnum;
use std::io::{self, Write};

use crate::config::BoardConfig;
use crate::context::CliError;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

pub(crate) fn meal_type<'a>(board: &'a BoardConfig, s: &str) -> Result<&'a str, CliError> {
    board
        .find_meal_type(s)
        .ok_or_else(|| CliError::UnknownMealType(s.to_string()))
}

/// Ask a yes/no question on stdin. Anything but "y" means no.
pub(crate) fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub(crate) fn format_calories(kcal: f64) -> String {
    format!("{:.0} kcal", kcal)
}
