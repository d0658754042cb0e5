use lesprims_wire::Protocol;
use serde::Serialize;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_pretty_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ProtocolInfo {
    name: &'static str,
    messages: usize,
}

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    rustc: &'static str,
    git_hash: &'static str,
    protocols: Vec<ProtocolInfo>,
    serde: bool,
}

impl VersionInfo {
    fn collect() -> Self {
        Self {
            name: "lesprims",
            version: env!("CARGO_PKG_VERSION"),
            target: option_env!("LESPRIMS_BUILD_TARGET").unwrap_or("unknown"),
            rustc: option_env!("RUSTC_VERSION").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            protocols: [Protocol::Les, Protocol::Pip]
                .into_iter()
                .map(|protocol| ProtocolInfo {
                    name: protocol.name(),
                    messages: protocol.messages().len(),
                })
                .collect(),
            serde: cfg!(feature = "serde"),
        }
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![
            vec!["name".to_string(), self.name.to_string()],
            vec!["version".to_string(), self.version.to_string()],
            vec!["target".to_string(), self.target.to_string()],
            vec!["rustc".to_string(), self.rustc.to_string()],
            vec!["git_hash".to_string(), self.git_hash.to_string()],
        ];
        for protocol in &self.protocols {
            rows.push(vec![
                format!("protocol.{}", protocol.name),
                format!("{} messages", protocol.messages),
            ]);
        }
        rows.push(vec!["serde".to_string(), self.serde.to_string()]);
        rows
    }
}

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.extended {
        println!("lesprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let info = VersionInfo::collect();
    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Pretty => print_pretty_json(&info),
        OutputFormat::Table => print_table(&["FIELD", "VALUE"], info.rows()),
        OutputFormat::Raw => {
            for row in info.rows() {
                println!("{}: {}", row[0], row[1]);
            }
        }
    }
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_info_counts_registry_messages() {
        let info = VersionInfo::collect();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        let les = info.protocols.iter().find(|p| p.name == "les").unwrap();
        assert_eq!(les.messages, Protocol::Les.messages().len());
        assert!(info
            .rows()
            .iter()
            .any(|row| row[0] == "protocol.pip" && row[1].ends_with("messages")));
    }
}
