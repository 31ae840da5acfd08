//! CLI command definitions and dispatch.

pub mod invoke;
pub mod request;
pub mod run;
pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use applet_core::session::DATA_KEY;
use applet_core::{
    prepare_card, AppletCard, AppletConfig, AppletError, AppletResult, CardChange,
    ExecutionOutcome, HttpChannelAdapter, PathTemplateEngine,
};
use applet_protocol::JsonCardParser;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde_json::{json, Value};

const BANNER: &str = r#"
   ▣ Adaptive Applet
   Drive applet cards from the terminal.
"#;

/// Auto-refresh sequences followed after one action, before giving up on a
/// card that keeps refreshing itself.
const MAX_FOLLOWED_REFRESHES: usize = 5;

/// Adaptive Applet CLI.
#[derive(Parser)]
#[command(
    name = "applet",
    version,
    about = "▣ Adaptive Applet — validate, inspect and drive applet cards",
    long_about = BANNER,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Channel invoke endpoint (overrides config and APPLET_CHANNEL_URL).
    #[arg(long, global = true, env = "APPLET_CHANNEL_URL")]
    pub channel_url: Option<String>,

    /// Bearer token for the channel (overrides config and APPLET_AUTH_TOKEN).
    #[arg(long, global = true, env = "APPLET_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Config file (defaults to ~/.adaptive-applet/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log runtime activity to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ✅ Check that a card is a valid applet card and summarize it.
    Validate(validate::ValidateArgs),

    /// 📨 Print the request an action would send, without sending it.
    Request(request::RequestArgs),

    /// 🚀 Run one action of a card against the channel.
    Invoke(invoke::InvokeArgs),

    /// 🖥️  Show a card and run its actions interactively.
    Run(run::RunArgs),

    /// 📐 Print the JSON schema of a wire type.
    Schema(schema::SchemaArgs),
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// A card file with optional bound data.
#[derive(Args)]
pub struct CardArgs {
    /// Card file (JSON or YAML).
    pub card: PathBuf,

    /// Data file (JSON or YAML) bound to the card template as `$data`.
    #[arg(long, short)]
    pub data: Option<PathBuf>,
}

/// Settings shared by every command.
pub struct Context {
    pub config: AppletConfig,
    pub output: OutputFormat,
}

impl Context {
    pub fn is_json(&self) -> bool {
        self.output == OutputFormat::Json
    }

    /// The channel adapter from the resolved config.
    pub fn channel(&self) -> anyhow::Result<HttpChannelAdapter> {
        let url = self.config.channel_url.as_deref().context(
            "no channel endpoint; pass --channel-url, set APPLET_CHANNEL_URL or add channel_url to the config file",
        )?;
        let channel = HttpChannelAdapter::new(url)?;
        Ok(match &self.config.auth_token {
            Some(token) => channel.with_auth(token),
            None => channel,
        })
    }
}

/// Execute the CLI command.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    let mut telemetry = config.telemetry.clone();
    if telemetry.filter.is_none() {
        telemetry.filter = Some(if cli.verbose { "info" } else { "warn" }.into());
    }
    applet_core::telemetry::init_telemetry(&telemetry)?;

    let ctx = Context {
        config,
        output: cli.output,
    };

    match cli.command {
        Commands::Validate(args) => validate::execute(args, &ctx).await,
        Commands::Request(args) => request::execute(args, &ctx).await,
        Commands::Invoke(args) => invoke::execute(args, &ctx).await,
        Commands::Run(args) => run::execute(args, &ctx).await,
        Commands::Schema(args) => schema::execute(args, &ctx).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppletConfig> {
    let mut config = match &cli.config {
        Some(path) => AppletConfig::from_path(path)?.with_env_overrides(),
        None => AppletConfig::load()?,
    };
    if let Some(url) = &cli.channel_url {
        config.channel_url = Some(url.clone());
    }
    if let Some(token) = &cli.auth_token {
        config.auth_token = Some(token.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Read a JSON or YAML document; the extension decides.
pub fn read_document(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("Invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

/// Load the card payload, with `--data` bound under `$data`.
pub fn load_card(args: &CardArgs) -> anyhow::Result<Value> {
    let mut payload = read_document(&args.card)?;

    if let Some(data_path) = &args.data {
        let data = read_document(data_path)?;
        let object = payload
            .as_object_mut()
            .context("the card file must contain a JSON object")?;
        object.insert(DATA_KEY.to_string(), data);
    }
    Ok(payload)
}

/// Expand and parse a card payload the way the applet would, without
/// mounting it.
pub fn preview_card(payload: Value) -> AppletResult<AppletCard> {
    prepare_card(payload, None, &PathTemplateEngine, &JsonCardParser)?
        .map(|prepared| prepared.card)
        .ok_or_else(|| {
            AppletError::InvalidPayload("expected an AdaptiveCard, found bare data".into())
        })
}

/// One line of what happened during an action.
pub fn describe(outcome: &ExecutionOutcome) -> Value {
    match outcome {
        ExecutionOutcome::Vetoed => json!({"outcome": "vetoed"}),
        ExecutionOutcome::MessageShown(text) => json!({"outcome": "message", "message": text}),
        ExecutionOutcome::CardUpdated(CardChange::Swapped { app_id, .. }) => {
            json!({"outcome": "card", "appId": app_id})
        }
        ExecutionOutcome::CardUpdated(CardChange::Vetoed) => json!({"outcome": "card_vetoed"}),
        ExecutionOutcome::CardUpdated(CardChange::NoTemplate) => json!({"outcome": "no_template"}),
        ExecutionOutcome::CardRejected(error) => {
            json!({"outcome": "card_rejected", "error": error.to_string()})
        }
        ExecutionOutcome::LoginRequested(url) => json!({"outcome": "login", "loginUrl": url.as_str()}),
    }
}

/// Wait for `result` and for any auto-refresh it started, reporting each
/// step. Returns one JSON record per sequence.
pub async fn follow(
    mut result: AppletResult<ExecutionOutcome>,
    ctx: &Context,
) -> anyhow::Result<Vec<Value>> {
    let mut records = Vec::new();

    loop {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                report_error(&error, ctx);
                records.push(json!({"outcome": "error", "error": error.to_string()}));
                return Ok(records);
            }
        };

        records.push(describe(&outcome));
        report(&outcome, ctx);

        let ExecutionOutcome::CardUpdated(CardChange::Swapped {
            auto_refresh: Some(refresh),
            ..
        }) = outcome
        else {
            return Ok(records);
        };

        if records.len() > MAX_FOLLOWED_REFRESHES {
            refresh.abort();
            if !ctx.is_json() {
                println!(
                    "  {} Card keeps refreshing itself; stopped following.",
                    "⚠".yellow().bold()
                );
            }
            return Ok(records);
        }
        result = refresh.await.context("auto-refresh task failed")?;
    }
}

fn report(outcome: &ExecutionOutcome, ctx: &Context) {
    if ctx.is_json() {
        return;
    }
    match outcome {
        ExecutionOutcome::Vetoed => println!("  {} Request vetoed.", "→".dimmed()),
        ExecutionOutcome::CardUpdated(CardChange::Swapped { app_id, auto_refresh }) => {
            println!("  {} Card updated ({}).", "✓".green().bold(), app_id.cyan());
            if auto_refresh.is_some() {
                println!("  {} Auto-refresh started.", "↻".dimmed());
            }
        }
        ExecutionOutcome::CardUpdated(_) => println!("  {} Card unchanged.", "→".dimmed()),
        ExecutionOutcome::CardRejected(error) => println!(
            "  {} Channel returned an unusable card: {}",
            "⚠".yellow().bold(),
            error.to_string().dimmed()
        ),
        ExecutionOutcome::MessageShown(_) | ExecutionOutcome::LoginRequested(_) => {}
    }
}

fn report_error(error: &AppletError, ctx: &Context) {
    if ctx.is_json() {
        return;
    }
    if error.is_user_visible() {
        println!("  {} Action failed.", "✗".red().bold());
    } else {
        println!("  {} {}", "✗".red().bold(), error.to_string().dimmed());
    }
}

/// Print `value` as pretty JSON.
pub fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn banner() {
    println!("{BANNER}");
}

/// Channel and surface wiring shared by `invoke` and `run`.
pub fn build_applet(
    ctx: &Context,
    surface: Arc<crate::surface::TerminalSurface>,
) -> anyhow::Result<applet_core::Applet> {
    let channel = ctx.channel()?;
    Ok(applet_core::Applet::builder(surface)
        .channel(Arc::new(channel))
        .config(&ctx.config)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("applet-cli-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn test_yaml_card_with_data() {
        let card = temp_file(
            "card.yaml",
            "type: AdaptiveCard\nappId: greeter\nbody:\n  - type: TextBlock\n    text: Hello ${name}\n",
        );
        let data = temp_file("data.json", r#"{"name": "Sam"}"#);

        let payload = load_card(&CardArgs {
            card,
            data: Some(data),
        })
        .unwrap();
        assert_eq!(payload["$data"], json!({"name": "Sam"}));

        let card = preview_card(payload).unwrap();
        assert_eq!(card.app_id(), Some("greeter"));
        assert_eq!(card.body[0]["text"], "Hello Sam");
    }

    #[test]
    fn test_preview_rejects_missing_app_id() {
        let err = preview_card(json!({"type": "AdaptiveCard"})).unwrap_err();
        assert!(matches!(err, AppletError::MissingAppId));

        let err = preview_card(json!({"name": "data only"})).unwrap_err();
        assert!(matches!(err, AppletError::InvalidPayload(_)));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&ExecutionOutcome::MessageShown("hi".into())),
            json!({"outcome": "message", "message": "hi"})
        );
        assert_eq!(describe(&ExecutionOutcome::Vetoed), json!({"outcome": "vetoed"}));
    }
}
