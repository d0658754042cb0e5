use lesprims_codec::{decode_payload, FlowControlled, Incoming, Network};
use lesprims_wire::{decode_message, DecodeConfig, Protocol};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cmd::DecodeArgs;
use crate::exit::{decode_error, io_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{
    code_string, hex_string, parse_hex, print_json, print_pretty_json, print_raw, print_table,
    OutputFormat,
};

#[derive(Serialize)]
struct DecodeOutput {
    protocol: &'static str,
    message: &'static str,
    code: u64,
    payload_size: usize,
    req_id: Option<u64>,
    buffer_value: Option<u64>,
    detail: Value,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = read_input(&args)?;
    let protocol = Protocol::from(args.protocol);
    let offset = args.offset;
    let network = Network::from_chain_id(args.chain_id)
        .unwrap_or_else(|| Network::new("custom", args.chain_id));

    let mut config = if args.permissive {
        DecodeConfig::permissive()
    } else {
        DecodeConfig::default()
    };
    if let Some(max) = args.max_payload {
        config.max_payload_size = max;
    }

    let message = decode_message(&wire, protocol, offset, config.max_payload_size)
        .map_err(|err| decode_error("decode failed", err))?;
    debug!(
        message = message.id.name(),
        code = message.code,
        network = network.name,
        "split message envelope"
    );
    let payload = message.payload.clone();
    let code = message.code;
    let incoming = decode_payload(message, &network, &config)
        .map_err(|err| decode_error("decode failed", err))?;

    if let Incoming::Status(status) = &incoming {
        status.log_flow_control();
    }

    let (req_id, buffer_value) = budget(&incoming);
    let out = DecodeOutput {
        protocol: protocol.name(),
        message: incoming.id().name(),
        code,
        payload_size: payload.len(),
        req_id,
        buffer_value,
        detail: detail(&incoming)?,
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Pretty => print_pretty_json(&out),
        OutputFormat::Table => {
            let optional =
                |value: Option<u64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
            let rows = vec![
                vec!["protocol".to_string(), out.protocol.to_string()],
                vec!["message".to_string(), out.message.to_string()],
                vec!["code".to_string(), code_string(out.code)],
                vec!["payload size".to_string(), out.payload_size.to_string()],
                vec!["req id".to_string(), optional(out.req_id)],
                vec!["buffer value".to_string(), optional(out.buffer_value)],
                vec!["detail".to_string(), out.detail.to_string()],
            ];
            print_table(&["FIELD", "VALUE"], rows);
        }
        OutputFormat::Raw => print_raw(&payload),
    }
    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(path) = &args.file {
        return std::fs::read(path).map_err(|err| io_error("read input", err));
    }
    let hex = args
        .hex
        .as_deref()
        .ok_or_else(|| CliError::usage("either a hex message or --file is required"))?;
    parse_hex(hex).map_err(|err| CliError::usage(format!("invalid hex input: {err}")))
}

fn budget(incoming: &Incoming) -> (Option<u64>, Option<u64>) {
    fn of(reply: &dyn FlowControlled) -> (Option<u64>, Option<u64>) {
        (Some(reply.req_id()), Some(reply.buffer_value()))
    }
    match incoming {
        Incoming::BlockHeaders(reply) => of(reply),
        Incoming::BlockBodies(reply) => of(reply),
        Incoming::Receipts(reply) => of(reply),
        Incoming::ProofsV2(reply) => of(reply),
        Incoming::TxStatus(reply) => of(reply),
        Incoming::Account(reply) => of(reply),
        Incoming::Status(_) | Incoming::Announce(_) | Incoming::Request(_) => (None, None),
    }
}

fn detail(incoming: &Incoming) -> CliResult<Value> {
    let value = match incoming {
        Incoming::Status(status) => to_value(status)?,
        Incoming::Announce(announce) => to_value(announce)?,
        Incoming::BlockHeaders(reply) => Value::Array(
            reply
                .headers
                .iter()
                .map(|header| {
                    json!({
                        "number": header.number,
                        "hash": hex_string(header.hash_slow().as_slice()),
                        "parent_hash": hex_string(header.parent_hash.as_slice()),
                        "timestamp": header.timestamp,
                    })
                })
                .collect(),
        ),
        Incoming::BlockBodies(reply) => Value::Array(
            reply
                .bodies
                .iter()
                .map(|body| {
                    let hashes: Vec<String> = body
                        .transactions
                        .iter()
                        .map(|tx| hex_string(tx.tx_hash().as_slice()))
                        .collect();
                    json!({ "transactions": hashes, "ommers": body.ommers.len() })
                })
                .collect(),
        ),
        Incoming::Receipts(reply) => json!({
            "receipts_per_block": reply.receipts.iter().map(Vec::len).collect::<Vec<_>>(),
        }),
        Incoming::ProofsV2(reply) => json!({
            "nodes": reply.nodes.iter().map(|node| hex_string(node)).collect::<Vec<_>>(),
        }),
        Incoming::TxStatus(reply) => to_value(&reply.statuses)?,
        Incoming::Account(reply) => to_value(&reply.account)?,
        Incoming::Request(message) => json!({ "payload": hex_string(&message.payload) }),
    };
    Ok(value)
}

fn to_value<T: Serialize>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| CliError::new(INTERNAL, format!("serialize output: {err}")))
}
