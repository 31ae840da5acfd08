//! `applet schema` — JSON schema of the wire types.

use applet_protocol::{Action, ActivityRequest, ActivityResponse};
use clap::Args;

use super::{print_json, Context};

#[derive(Args)]
pub struct SchemaArgs {
    /// Which type to describe.
    #[arg(value_enum)]
    pub kind: SchemaKind,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum SchemaKind {
    /// An invoke request, with its attempt bookkeeping.
    Request,
    /// A channel response.
    Response,
    /// A card action.
    Action,
}

pub async fn execute(args: SchemaArgs, _ctx: &Context) -> anyhow::Result<()> {
    let schema = match args.kind {
        SchemaKind::Request => schemars::schema_for!(ActivityRequest),
        SchemaKind::Response => schemars::schema_for!(ActivityResponse),
        SchemaKind::Action => schemars::schema_for!(Action),
    };
    print_json(&schema)
}
