use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod context;

use commands::{
    ActivityCommand, ApproveCommand, BoardCommand, ConfigCommand, CopyCommand, DeleteCommand,
    GroceriesCommand, LoginCommand, LogoutCommand, ProposeCommand, RecipeCommand, ResetCommand,
    SettingsCommand, VoteCommand, WatchCommand, WhoamiCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "mealboard")]
#[command(version)]
#[command(about = "Plan shared holiday meals together", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board
    Board(BoardCommand),

    /// Propose a dish
    Propose(ProposeCommand),

    /// Vote for a proposal (again to take the vote back)
    Vote(VoteCommand),

    /// Approve a proposal
    Approve(ApproveCommand),

    /// Delete a proposal
    Delete(DeleteCommand),

    /// Copy a proposal to another day
    Copy(CopyCommand),

    /// Show or look up a proposal's recipe
    Recipe(RecipeCommand),

    /// Manage the shared grocery list
    Groceries(GroceriesCommand),

    /// Show recent activity
    Activity(ActivityCommand),

    /// Log in as a role
    Login(LoginCommand),

    /// Log out
    Logout(LogoutCommand),

    /// Show the current role
    Whoami(WhoamiCommand),

    /// Manage board settings
    Settings(SettingsCommand),

    /// Clear the board
    Reset(ResetCommand),

    /// Follow changes live
    Watch(WatchCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MEALBOARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| "mealboard=info,mealboard_core=warn".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Board(cmd)) => cmd.run(&config),
        Some(Commands::Propose(cmd)) => cmd.run(&config),
        Some(Commands::Vote(cmd)) => cmd.run(&config),
        Some(Commands::Approve(cmd)) => cmd.run(&config),
        Some(Commands::Delete(cmd)) => cmd.run(&config),
        Some(Commands::Copy(cmd)) => cmd.run(&config),
        Some(Commands::Recipe(cmd)) => cmd.run(&config),
        Some(Commands::Groceries(cmd)) => cmd.run(&config),
        Some(Commands::Activity(cmd)) => cmd.run(&config),
        Some(Commands::Login(cmd)) => cmd.run(&config),
        Some(Commands::Logout(cmd)) => cmd.run(&config),
        Some(Commands::Whoami(cmd)) => cmd.run(&config),
        Some(Commands::Settings(cmd)) => cmd.run(&config),
        Some(Commands::Reset(cmd)) => cmd.run(&config),
        Some(Commands::Watch(cmd)) => cmd.run(&config),
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path),
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}
