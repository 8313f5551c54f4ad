use clap::Args;

use super::OutputFormat;
use crate::config::Config;
use crate::context::BoardContext;

/// Show who did what, newest first
#[derive(Args)]
pub struct ActivityCommand {
    /// Number of entries to show
    #[arg(long, short = 'n', default_value = "20")]
    limit: usize,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ActivityCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let document = ctx.document();
        let recent: Vec<_> = document.activity.iter().rev().take(self.limit).collect();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recent)?),
            OutputFormat::Text => {
                if recent.is_empty() {
                    println!("No activity yet.");
                }
                for entry in recent {
                    println!("{}", entry);
                }
            }
        }
        Ok(())
    }
}
