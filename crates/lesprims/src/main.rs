mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lesprims", version, about = "LES/PIP light-client message codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::ProtocolArg;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "lesprims",
            "decode",
            "0x13c0",
            "--protocol",
            "pip",
            "--offset",
            "16",
        ])
        .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.hex.as_deref(), Some("0x13c0"));
                assert_eq!(args.protocol, ProtocolArg::Pip);
                assert_eq!(args.offset, 16);
                assert_eq!(args.chain_id, 1);
            }
            other => panic!("expected decode, got {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_input_args() {
        let err = Cli::try_parse_from([
            "lesprims",
            "decode",
            "0x00c0",
            "--file",
            "/tmp/message.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn decode_requires_input() {
        let err = Cli::try_parse_from(["lesprims", "decode"]).expect_err("input is required");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_repeated_costs() {
        let cli = Cli::try_parse_from([
            "lesprims",
            "status",
            "--serve-headers",
            "--cost",
            "2:150:30",
            "--cost",
            "4:10:5",
        ])
        .expect("status args should parse");

        match cli.command {
            Command::Status(args) => {
                assert!(args.serve_headers);
                assert!(!args.tx_relay);
                assert_eq!(args.costs, vec!["2:150:30", "4:10:5"]);
            }
            other => panic!("expected status, got {other:?}"),
        }
    }
}
