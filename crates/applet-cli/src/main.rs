//! Adaptive Applet CLI — drive applet cards from the terminal.
//!
//! `applet` loads a card, renders a text summary of it, and runs its
//! `Action.Execute` actions against a channel endpoint.

mod commands;
mod render;
mod surface;

use clap::Parser;
use commands::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
