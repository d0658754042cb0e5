use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use lesprims_wire::Protocol;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod ids;
pub mod status;
pub mod version;

/// Mainnet genesis block hash.
const MAINNET_GENESIS: &str = "0xd4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List message identifiers and their dispatch codes.
    Ids(IdsArgs),
    /// Decode a wire message.
    Decode(DecodeArgs),
    /// Encode a status message.
    Status(StatusArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ids(args) => ids::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    Les,
    Pip,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Les => Protocol::Les,
            ProtocolArg::Pip => Protocol::Pip,
        }
    }
}

#[derive(Args, Debug)]
pub struct IdsArgs {
    /// Only list this sub-protocol. Default: both.
    #[arg(long, value_enum)]
    pub protocol: Option<ProtocolArg>,
    /// Sub-protocol offset added to every base code.
    #[arg(long, default_value = "0")]
    pub offset: u16,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded message (dispatch code followed by payload).
    #[arg(conflicts_with = "file", required_unless_present = "file")]
    pub hex: Option<String>,
    /// Read the raw message bytes from a file.
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Sub-protocol the offset was negotiated for.
    #[arg(long, value_enum, default_value = "les")]
    pub protocol: ProtocolArg,
    /// Sub-protocol offset.
    #[arg(long, default_value = "0")]
    pub offset: u16,
    /// Chain id used to check transactions.
    #[arg(long, default_value = "1")]
    pub chain_id: u64,
    /// Skip unknown status and announce keys instead of rejecting them.
    #[arg(long)]
    pub permissive: bool,
    /// Maximum payload size in bytes.
    #[arg(long)]
    pub max_payload: Option<usize>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Sub-protocol offset.
    #[arg(long, default_value = "0")]
    pub offset: u16,
    #[arg(long, default_value = "2")]
    pub protocol_version: u64,
    #[arg(long, default_value = "1")]
    pub network_id: u64,
    /// Total difficulty of the head block (decimal or 0x-hex).
    #[arg(long, default_value = "0")]
    pub head_td: String,
    #[arg(long, default_value = MAINNET_GENESIS)]
    pub head_hash: String,
    #[arg(long, default_value = "0")]
    pub head_number: u64,
    #[arg(long, default_value = MAINNET_GENESIS)]
    pub genesis_hash: String,
    #[arg(long)]
    pub serve_headers: bool,
    #[arg(long)]
    pub serve_chain_since: Option<u64>,
    #[arg(long)]
    pub serve_state_since: Option<u64>,
    #[arg(long)]
    pub tx_relay: bool,
    /// Flow-control buffer limit.
    #[arg(long)]
    pub flow_control_bl: Option<u64>,
    /// Flow-control recharge rate.
    #[arg(long)]
    pub flow_control_mrr: Option<u64>,
    /// Cost table entry as CODE:BASE:REQ (repeatable).
    #[arg(long = "cost", value_name = "CODE:BASE:REQ")]
    pub costs: Vec<String>,
    #[arg(long)]
    pub announce_type: Option<u8>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
