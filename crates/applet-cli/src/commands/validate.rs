//! `applet validate` — check a card and summarize it.

use clap::Args;
use colored::Colorize;

use super::{load_card, preview_card, print_json, CardArgs, Context};
use crate::render;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub card: CardArgs,
}

pub async fn execute(args: ValidateArgs, ctx: &Context) -> anyhow::Result<()> {
    let payload = load_card(&args.card)?;

    let card = match preview_card(payload) {
        Ok(card) => card,
        Err(e) => {
            if ctx.is_json() {
                print_json(&serde_json::json!({"valid": false, "error": e.to_string()}))?;
            } else {
                println!("  {} {}", "✗".red().bold(), e);
            }
            anyhow::bail!("{} is not a valid applet card", args.card.card.display());
        }
    };

    if ctx.is_json() {
        return print_json(&serde_json::json!({"valid": true, "card": card}));
    }

    render::print_card(&card);
    println!(
        "  {} {} is a valid applet card.",
        "✓".green().bold(),
        args.card.card.display().to_string().cyan()
    );
    Ok(())
}
