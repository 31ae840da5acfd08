//! `applet run` — show a card and run its actions interactively.

use std::sync::Arc;

use applet_core::{Action, CardChange};
use clap::Args;
use colored::Colorize;

use super::{banner, build_applet, follow, load_card, CardArgs, Context};
use crate::render;
use crate::surface::TerminalSurface;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub card: CardArgs,
}

pub async fn execute(args: RunArgs, ctx: &Context) -> anyhow::Result<()> {
    if ctx.is_json() {
        anyhow::bail!("`applet run` is interactive; use `applet invoke` for JSON output");
    }

    banner();
    let surface = Arc::new(TerminalSurface::new(false));
    let applet = build_applet(ctx, surface.clone())?;
    if let Some(user) = applet.user_id() {
        println!("  {} Signed in as {}", "→".dimmed(), user.bold());
    }

    if let CardChange::Swapped {
        auto_refresh: Some(refresh),
        ..
    } = applet.set_card(load_card(&args.card)?)?
    {
        follow(refresh.await?, ctx).await?;
    }

    loop {
        let Some(card) = applet.card() else {
            anyhow::bail!("no card on screen");
        };

        let mut labels: Vec<String> = card.actions.iter().map(render::action_label).collect();
        labels.push("Quit".dimmed().to_string());

        let choice = match dialoguer::Select::new()
            .with_prompt(format!("  {}", "Action".cyan().bold()))
            .items(&labels)
            .default(0)
            .interact_opt()
        {
            Ok(Some(choice)) => choice,
            Ok(None) | Err(_) => break,
        };
        let Some(action) = card.actions.get(choice) else {
            break;
        };

        match action {
            Action::Execute(_) => {
                let Some(invoker) = surface.invoker() else {
                    anyhow::bail!("no card on screen");
                };
                follow(invoker.execute(action).await, ctx).await?;
            }
            Action::OpenUrl(open) => {
                println!("  {} Open {}\n", "→".dimmed(), open.url.as_str().cyan());
            }
            Action::ShowCard(show) => {
                println!("\n  {} {}", "▸".dimmed(), show.title.as_deref().unwrap_or("Details").bold());
                println!("{}\n", serde_json::to_string_pretty(&show.card)?);
            }
        }
    }

    println!("\n  {} Bye.", "→".dimmed());
    Ok(())
}
