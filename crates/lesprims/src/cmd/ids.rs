use lesprims_wire::{MessageId, Protocol};
use serde::Serialize;

use crate::cmd::IdsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{code_string, print_json, print_pretty_json, print_table, OutputFormat};

#[derive(Serialize)]
struct IdEntry {
    protocol: &'static str,
    name: &'static str,
    code: u64,
    wire_code: u64,
    flow_controlled_reply: bool,
}

#[derive(Serialize)]
struct IdsOutput {
    offset: u16,
    messages: Vec<IdEntry>,
}

pub fn run(args: IdsArgs, format: OutputFormat) -> CliResult<i32> {
    let offset = args.offset;
    let protocols = match args.protocol {
        Some(protocol) => vec![Protocol::from(protocol)],
        None => vec![Protocol::Les, Protocol::Pip],
    };

    let out = IdsOutput {
        offset,
        messages: entries(&protocols, offset),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Pretty => print_pretty_json(&out),
        OutputFormat::Table => {
            let rows = out
                .messages
                .iter()
                .map(|entry| {
                    vec![
                        entry.protocol.to_string(),
                        entry.name.to_string(),
                        code_string(entry.code),
                        code_string(entry.wire_code),
                    ]
                })
                .collect();
            print_table(&["PROTOCOL", "MESSAGE", "CODE", "WIRE"], rows);
        }
        OutputFormat::Raw => {
            for entry in &out.messages {
                println!("{} {} {}", entry.protocol, entry.wire_code, entry.name);
            }
        }
    }
    Ok(SUCCESS)
}

fn entries(protocols: &[Protocol], offset: u16) -> Vec<IdEntry> {
    protocols
        .iter()
        .flat_map(|protocol| {
            protocol.messages().iter().map(move |id: &MessageId| IdEntry {
                protocol: protocol.name(),
                name: id.name(),
                code: id.code(),
                wire_code: id.wire_code(offset),
                flow_controlled_reply: id.is_flow_controlled_reply(),
            })
        })
        .collect()
}
