use alloy_primitives::{B256, U256};
use lesprims_codec::{encode_status, CostEntry, StatusMessage};
use lesprims_wire::MessageId;
use serde::Serialize;

use crate::cmd::StatusArgs;
use crate::exit::{CliError, CliResult, SUCCESS};
use crate::output::{
    code_string, hex_string, parse_hex, print_json, print_pretty_json, print_raw, print_table,
    OutputFormat,
};

#[derive(Serialize)]
struct StatusOutput {
    message: &'static str,
    code: u64,
    size: usize,
    hex: String,
}

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    let offset = args.offset;
    let status = build_status(&args)?;
    status.log_flow_control();

    let wire = encode_status(offset, &status);
    let out = StatusOutput {
        message: MessageId::Status.name(),
        code: MessageId::Status.wire_code(offset),
        size: wire.len(),
        hex: hex_string(&wire),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Pretty => print_pretty_json(&out),
        OutputFormat::Table => print_table(
            &["MESSAGE", "CODE", "SIZE", "HEX"],
            vec![vec![
                out.message.to_string(),
                code_string(out.code),
                out.size.to_string(),
                out.hex.clone(),
            ]],
        ),
        OutputFormat::Raw => print_raw(&wire),
    }
    Ok(SUCCESS)
}

fn build_status(args: &StatusArgs) -> CliResult<StatusMessage> {
    let mut status = StatusMessage::new(
        args.protocol_version,
        args.network_id,
        parse_u256("--head-td", &args.head_td)?,
        parse_hash("--head-hash", &args.head_hash)?,
        args.head_number,
        parse_hash("--genesis-hash", &args.genesis_hash)?,
    );
    status.serve_headers = args.serve_headers;
    status.serve_chain_since = args.serve_chain_since;
    status.serve_state_since = args.serve_state_since;
    status.tx_relay = args.tx_relay;
    status.flow_control_bl = args.flow_control_bl;
    status.flow_control_mrr = args.flow_control_mrr;
    if !args.costs.is_empty() {
        let table = args
            .costs
            .iter()
            .map(|cost| parse_cost(cost))
            .collect::<CliResult<Vec<_>>>()?;
        status.flow_control_mrc = Some(table);
    }
    status.announce_type = args.announce_type;
    Ok(status)
}

fn parse_hash(flag: &str, input: &str) -> CliResult<B256> {
    let bytes = parse_hex(input).map_err(|err| CliError::usage(format!("{flag}: {err}")))?;
    if bytes.len() != 32 {
        return Err(CliError::usage(format!(
            "{flag}: expected 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

fn parse_u256(flag: &str, input: &str) -> CliResult<U256> {
    input
        .trim()
        .parse::<U256>()
        .map_err(|err| CliError::usage(format!("{flag}: {err}")))
}

fn parse_cost(input: &str) -> CliResult<CostEntry> {
    let parts: Vec<&str> = input.split(':').collect();
    let [code, base, req] = parts.as_slice() else {
        return Err(CliError::usage(format!(
            "--cost: expected CODE:BASE:REQ, got {input}"
        )));
    };
    let number = |field: &str| -> CliResult<u64> {
        let field = field.trim();
        let parsed = match field.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => field.parse(),
        };
        parsed.map_err(|err| CliError::usage(format!("--cost: {input}: {err}")))
    };
    Ok(CostEntry::new(number(*code)?, number(*base)?, number(*req)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn parses_cost_entries() {
        assert_eq!(parse_cost("0x02:150:30").unwrap(), CostEntry::new(2, 150, 30));
        assert_eq!(parse_cost("4:10:0").unwrap(), CostEntry::new(4, 10, 0));
        assert_eq!(parse_cost("4:10").unwrap_err().code, USAGE);
        assert_eq!(parse_cost("4:x:1").unwrap_err().code, USAGE);
    }

    #[test]
    fn hash_must_be_full_width() {
        assert_eq!(
            parse_hash("--head-hash", &format!("0x{}", "ab".repeat(32))).unwrap(),
            B256::repeat_byte(0xab)
        );
        assert!(parse_hash("--head-hash", "0xabcd").is_err());
    }

    #[test]
    fn td_accepts_decimal_and_hex() {
        assert_eq!(parse_u256("--head-td", "1000").unwrap(), U256::from(1000u64));
        assert_eq!(parse_u256("--head-td", "0x10").unwrap(), U256::from(16u64));
        assert!(parse_u256("--head-td", "ten").is_err());
    }
}
