//! `applet request` — print the request an action would send.

use anyhow::Context as _;
use applet_core::request::build_request;
use applet_core::{DefaultHooks, InvocationContext};
use clap::Args;
use colored::Colorize;

use super::{load_card, preview_card, print_json, CardArgs, Context};

#[derive(Args)]
pub struct RequestArgs {
    #[command(flatten)]
    pub card: CardArgs,

    /// Id of the `Action.Execute` to send.
    #[arg(long, short, conflicts_with = "auto_refresh")]
    pub action: Option<String>,

    /// Use the card's auto-refresh action.
    #[arg(long)]
    pub auto_refresh: bool,
}

pub async fn execute(args: RequestArgs, ctx: &Context) -> anyhow::Result<()> {
    let card = preview_card(load_card(&args.card)?)?;
    let app_id = card.app_id().unwrap_or_default();

    let (action, context) = if args.auto_refresh {
        let refresh = card
            .auto_refresh
            .as_ref()
            .context("the card has no autoRefresh definition")?;
        (&refresh.action, InvocationContext::AutoRefresh)
    } else {
        let id = args
            .action
            .as_deref()
            .context("pass --action <id> or --auto-refresh")?;
        let action = card
            .find_action(id)
            .with_context(|| format!("no action with id \"{id}\" in the card"))?;
        let execute = action.as_execute().with_context(|| {
            format!("\"{id}\" is an {}, only Action.Execute is sent", action.type_name())
        })?;
        (execute, InvocationContext::UserInteraction)
    };

    let Some(request) = build_request(app_id, action, context, &DefaultHooks) else {
        anyhow::bail!("request was vetoed");
    };

    if !ctx.is_json() {
        println!(
            "\n  {} {} request for {}:\n",
            "📨".to_string(),
            context.to_string().cyan(),
            app_id.bold()
        );
    }
    print_json(&request)
}
