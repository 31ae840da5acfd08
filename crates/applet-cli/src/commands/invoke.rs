//! `applet invoke` — run one action against the channel.

use std::sync::Arc;

use anyhow::Context as _;
use applet_core::CardChange;
use clap::Args;

use super::{build_applet, follow, load_card, print_json, CardArgs, Context};
use crate::surface::TerminalSurface;

#[derive(Args)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub card: CardArgs,

    /// Id of the action to run.
    #[arg(long, short)]
    pub action: String,
}

pub async fn execute(args: InvokeArgs, ctx: &Context) -> anyhow::Result<()> {
    let surface = Arc::new(TerminalSurface::new(ctx.is_json()));
    let applet = build_applet(ctx, surface)?;

    let mut records = Vec::new();
    match applet.set_card(load_card(&args.card)?)? {
        CardChange::Swapped {
            auto_refresh: Some(refresh),
            ..
        } => {
            let result = refresh.await.context("auto-refresh task failed")?;
            records.extend(follow(result, ctx).await?);
        }
        CardChange::Swapped { .. } => {}
        CardChange::Vetoed | CardChange::NoTemplate => anyhow::bail!("the card was not displayed"),
    }

    let card = applet.card().context("no card on screen")?;
    let action = card
        .find_action(&args.action)
        .with_context(|| format!("no action with id \"{}\" in the card", args.action))?
        .clone();
    let invoker = applet.invoker().context("no card on screen")?;

    records.extend(follow(invoker.execute(&action).await, ctx).await?);

    if ctx.is_json() {
        print_json(&records)?;
    }
    Ok(())
}
