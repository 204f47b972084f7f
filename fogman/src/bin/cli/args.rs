// SPDX-License-Identifier: Apache-2.0
// Copyright Authors of fogman

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use fogman::{directories::CFGPATH_FOGMAN_CONFIG, instances::NetworkMode};

#[derive(Parser, Debug)]
#[command(
    long_about = "Manage element instances and strace diagnostics for the fog nodes of an ioFog fleet."
)]
#[command(name = "fogman")]
#[command(disable_version_flag = true)]
pub(crate) struct Cli {
    /// Optional: Location of the fogman configuration file.
    #[clap(long, global = true, default_value = CFGPATH_FOGMAN_CONFIG)]
    pub(crate) config: PathBuf,

    /// Optional: Path of the SQLite database. Overrides the configuration file.
    /// Example: --db /var/lib/fogman/fogman.db
    #[clap(long, global = true, verbatim_doc_comment)]
    pub(crate) db: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Element instance related commands.
    #[command(subcommand)]
    Instance(InstanceSubcommand),
    /// Strace diagnostics related commands.
    #[command(subcommand)]
    Strace(StraceSubcommand),
    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completions(crate::completions::Args),
    /// Print build information.
    Version,
}

#[derive(Subcommand, Debug)]
#[command(disable_version_flag = true)]
pub(crate) enum InstanceSubcommand {
    /// Show an element instance and the element it runs.
    Get(GetArgs),
    /// List the element instances of a fog or a track.
    List(ListArgs),
    /// Create an element instance.
    #[command(subcommand)]
    Create(CreateSubcommand),
    /// Delete an element instance using its uuid.
    Delete(DeleteArgs),
    /// Delete the network instances paired with an element instance.
    DeleteNetwork(DeleteNetworkArgs),
}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub(crate) struct GetArgs {
    /// Required: Element instance uuid.
    pub(crate) uuid: String,
}

#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
#[clap(group(ArgGroup::new("scope").required(true).args(&["fog", "track"])))]
pub(crate) struct ListArgs {
    /// List the instances a fog should be running: track independent
    /// instances and those on an activated track.
    #[clap(long, verbatim_doc_comment)]
    pub(crate) fog: Option<String>,

    /// List the non-system instances of a track, one row per fog type.
    #[clap(long)]
    pub(crate) track: Option<i64>,
}

#[derive(Subcommand, Debug)]
#[command(disable_version_flag = true)]
pub(crate) enum CreateSubcommand {
    /// Create a user-deployed instance of an element.
    Element(CreateElementArgs),
    /// Create the stream viewer of a fog.
    StreamViewer(CreateRoleArgs),
    /// Create the debug console of a fog.
    DebugConsole(CreateRoleArgs),
    /// Create a network bridge instance through a satellite.
    Network(CreateNetworkArgs),
}

#[derive(Args, Debug)]
pub(crate) struct CreateElementArgs {
    /// Required: Id of the element to instantiate.
    #[clap(long)]
    pub(crate) element: i64,

    /// Required: Id of the user creating the instance.
    #[clap(long)]
    pub(crate) user_id: i64,

    /// Required: Display name of the instance.
    #[clap(long)]
    pub(crate) name: String,

    /// Optional: Track the instance belongs to. 0 runs it regardless of any track.
    #[clap(long, default_value_t = 0)]
    pub(crate) track_id: i64,

    /// Optional: JSON configuration handed to the agent.
    /// Example: --config '{"interval":5}'
    #[clap(long, verbatim_doc_comment, value_parser = parse_json)]
    pub(crate) config: Option<serde_json::Value>,

    /// Optional: Log size allowance of the instance.
    #[clap(long)]
    pub(crate) log_size: Option<i64>,

    /// Optional: Fog the instance is scheduled on.
    #[clap(long)]
    pub(crate) fog: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct CreateRoleArgs {
    /// Required: Id of the built-in element backing the instance.
    #[clap(long)]
    pub(crate) element_key: i64,

    /// Required: Id of the user creating the instance.
    #[clap(long)]
    pub(crate) user_id: i64,

    /// Required: Fog the instance runs on.
    #[clap(long)]
    pub(crate) fog: String,
}

#[derive(Args, Debug)]
pub(crate) struct CreateNetworkArgs {
    /// Required: Id of the network element.
    #[clap(long)]
    pub(crate) element: i64,

    /// Required: Id of the user creating the instance.
    #[clap(long)]
    pub(crate) user_id: i64,

    /// Required: Fog the instance runs on.
    #[clap(long)]
    pub(crate) fog: String,

    /// Required: Domain of the satellite relaying the traffic.
    #[clap(long)]
    pub(crate) satellite_domain: String,

    /// Required: Satellite port assigned to this bridge.
    #[clap(long)]
    pub(crate) satellite_port: u16,

    /// Required: Display name of the instance.
    #[clap(long)]
    pub(crate) name: String,

    /// Required: Port on the fog the bridge connects to.
    #[clap(long)]
    pub(crate) local_port: u16,

    /// Optional: Whether the bridge is reachable from outside the satellite.
    /// [possible values: public, private]
    #[clap(long, verbatim_doc_comment, default_value = "private")]
    pub(crate) mode: NetworkMode,

    /// Optional: Track the instance belongs to.
    #[clap(long, default_value_t = 0)]
    pub(crate) track_id: i64,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteArgs {
    /// Required: Element instance uuid.
    pub(crate) uuid: String,
}

#[derive(Args, Debug)]
pub(crate) struct DeleteNetworkArgs {
    /// Required: Uuid of the element instance whose network pairings are removed.
    pub(crate) element_id: String,
}

#[derive(Subcommand, Debug)]
#[command(disable_version_flag = true)]
pub(crate) enum StraceSubcommand {
    /// Enable or disable strace for an element instance.
    Switch(SwitchArgs),
    /// Append trace output to an element instance's buffer.
    Push(PushArgs),
    /// Print and clear an element instance's buffered trace output.
    Pop(PopArgs),
    /// Show the strace state of every instance on a fog.
    Status(StatusArgs),
}

#[derive(Args, Debug)]
#[clap(group(ArgGroup::new("state").required(true).args(&["enable", "disable"])))]
pub(crate) struct SwitchArgs {
    /// Required: Element instance uuid.
    #[clap(long)]
    pub(crate) instance: String,

    /// Optional: Fog the instance runs on. Strace cannot run without one.
    #[clap(long)]
    pub(crate) fog: Option<String>,

    #[clap(long)]
    pub(crate) enable: bool,

    #[clap(long)]
    pub(crate) disable: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PushArgs {
    /// Required: Element instance uuid.
    #[clap(long)]
    pub(crate) instance: String,

    /// Required: Trace output to append.
    pub(crate) chunk: String,
}

#[derive(Args, Debug)]
pub(crate) struct PopArgs {
    /// Required: Element instance uuid.
    #[clap(long)]
    pub(crate) instance: String,
}

#[derive(Args, Debug)]
pub(crate) struct StatusArgs {
    /// Required: Fog uuid.
    #[clap(long)]
    pub(crate) fog: String,
}

fn parse_json(arg: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(arg)
}
