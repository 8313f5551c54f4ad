//! Follow the board live.

use std::collections::HashSet;
use std::time::Duration;

use clap::Args;
use mealboard_core::models::EntryKey;

use crate::config::Config;
use crate::context::BoardContext;

/// How often the local copy is checked for changes to print.
const REFRESH: Duration = Duration::from_secs(1);

/// Poll the server and print new activity until Ctrl-C
#[derive(Args)]
pub struct WatchCommand {
    /// Also print entries that already happened
    #[arg(long)]
    history: bool,
}

impl WatchCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ctx = BoardContext::open(config)?;
        let engine = &ctx.engine;

        let mut seen: HashSet<EntryKey> = HashSet::new();
        for entry in engine.snapshot().activity {
            if self.history {
                println!("{}", entry);
            }
            seen.insert(entry.key());
        }
        println!(
            "Watching {} (every {}s). Press Ctrl-C to stop.",
            config.server_url.value,
            engine.options().poll_interval.as_secs()
        );

        ctx.runtime.block_on(async {
            let poller = engine.spawn_poller();
            let mut status = engine.status();

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = tokio::time::sleep(REFRESH) => {}
                }

                for entry in engine.snapshot().activity {
                    if seen.insert(entry.key()) {
                        println!("{}", entry);
                    }
                }
                let current = engine.status();
                if current != status {
                    println!("-- {}", current);
                    status = current;
                }
            }

            poller.abort();
            engine.flush().await
        })?;
        Ok(())
    }
}
