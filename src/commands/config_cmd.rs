use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# mealboard configuration

# Board server (MEALBOARD_SERVER_URL)
server_url: http://localhost:8080

# Where the login state is kept (MEALBOARD_DATA_DIR)
# data_dir: ~/.local/share/mealboard

sync:
  # Seconds between background reads (MEALBOARD_POLL_INTERVAL_SECS)
  poll_interval_secs: 5
  # Quiet period before local changes are written
  debounce_ms: 2000
  # Merge-and-retry cycles before a conflicting save gives up
  max_conflict_retries: 3

# board:
#   roles: [Organisator, Eltern, Hamburg, Konstanz]
#   organizer_role: Organisator
#   meal_types: [Mittagessen, Abendessen, Dessert]
#   days:
#     - date: 2025-12-24
#       name: Heiligabend
"#;

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        cli_config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("server_url: {}", config.server_url.value);
                        println!("  source: {}", config.server_url.source);
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("sync:");
                        println!("  poll_interval_secs: {}", config.sync.poll_interval_secs);
                        println!("  debounce_ms: {}", config.sync.debounce_ms);
                        println!(
                            "  max_conflict_retries: {}",
                            config.sync.max_conflict_retries
                        );
                        println!();

                        println!("board:");
                        println!("  roles: {}", config.board.roles.join(", "));
                        println!("  organizer_role: {}", config.board.organizer_role);
                        println!("  meal_types: {}", config.board.meal_types.join(", "));
                        println!("  days: {}", config.board.days.len());
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = cli_config_path.unwrap_or_else(Config::default_config_path);

                // Check if config already exists
                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'mealboard config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
