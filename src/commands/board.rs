//! Board overview.

use clap::Args;
use mealboard_core::{Document, Slot, SlotKey};

use super::{format_calories, parse_date, OutputFormat};
use crate::config::{BoardConfig, Config, DayConfig};
use crate::context::{short_id, BoardContext};

/// Show all days, meals and proposals
#[derive(Args)]
pub struct BoardCommand {
    /// Only show this day (YYYY-MM-DD)
    #[arg(long, short)]
    day: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl BoardCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let document = ctx.document();

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
            OutputFormat::Text => {
                let day = self.day.as_deref().map(parse_date).transpose()?;
                let days: Vec<&DayConfig> = config
                    .board
                    .days
                    .iter()
                    .filter(|d| day.map_or(true, |wanted| d.date == wanted))
                    .collect();

                let user = ctx.session.load()?;
                for (i, day) in days.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    print_day(&document, &config.board, day, user.as_deref());
                }
                println!();
                println!("Status: {}", ctx.engine.status());
            }
        }
        Ok(())
    }
}

fn print_day(document: &Document, board: &BoardConfig, day: &DayConfig, user: Option<&str>) {
    let kcal = document.daily_calories(day.date, &board.meal_types);
    let title = format!("{} ({})", day.name, day.date.format("%d.%m."));
    if kcal > 0.0 {
        println!("{}  {}", title, format_calories(kcal));
    } else {
        println!("{}", title);
    }
    println!("{}", "=".repeat(title.chars().count()));

    for meal_type in &board.meal_types {
        let key = SlotKey::new(day.date, meal_type);
        match document.slot(&key) {
            Some(slot) if !slot.proposals.is_empty() => print_slot(slot, user),
            _ => println!("  {:<12} -", meal_type),
        }
    }
}

fn print_slot(slot: &Slot, user: Option<&str>) {
    let state = if slot.approved { "✓" } else { " " };
    println!("  {:<12} {}", slot.meal_type, state);

    let leader = slot.leader().map(|p| p.id);
    for proposal in slot.ranked() {
        let marker = if proposal.approved {
            "[x]"
        } else if Some(proposal.id) == leader && !slot.approved {
            "[*]"
        } else {
            "[ ]"
        };
        let mine = match user {
            Some(user) if proposal.has_voted(user) => " (deine Stimme)",
            _ => "",
        };
        println!(
            "    {} {} {:<28} {} Stimme(n){}",
            marker,
            short_id(&proposal.id),
            proposal.name,
            proposal.vote_count(),
            mine
        );
    }
}
