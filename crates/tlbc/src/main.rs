use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sha2::{Digest, Sha256};

use tlbc::compile::{self, AddressStrategy, GenOptions};

#[derive(Parser)]
#[command(name = "tlbc")]
#[command(about = "TL-B message validator generator (schema -> FunC).", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Emit the FunC validator source.
    Generate {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        diagnostics: bool,
        #[arg(long, value_enum, default_value_t = AddressStrategy::Simplified)]
        address_strategy: AddressStrategy,
    },
    /// Print a JSON report about the emitted source without writing it.
    Meta {
        #[arg(long)]
        diagnostics: bool,
        #[arg(long, value_enum, default_value_t = AddressStrategy::Simplified)]
        address_strategy: AddressStrategy,
    },
}

#[derive(Debug, Serialize)]
struct ToolReport {
    ok: bool,
    entry_point: &'static str,
    address_strategy: AddressStrategy,
    diagnostics: bool,
    source_sha256: String,
    source_bytes: usize,
}

fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    let out = h.finalize();
    out.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> std::process::ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Generate {
            out,
            diagnostics,
            address_strategy,
        } => {
            let options = GenOptions {
                diagnostics,
                address_strategy,
            };
            let src = compile::generate_validator(&options)?;
            match out {
                Some(path) => std::fs::write(&path, &src)
                    .with_context(|| format!("write {}", path.display()))?,
                None => print!("{src}"),
            }
            Ok(std::process::ExitCode::SUCCESS)
        }
        Cmd::Meta {
            diagnostics,
            address_strategy,
        } => {
            let options = GenOptions {
                diagnostics,
                address_strategy,
            };
            let src = compile::generate_validator(&options)?;
            let report = ToolReport {
                ok: true,
                entry_point: compile::ENTRY_POINT,
                address_strategy,
                diagnostics,
                source_sha256: sha256_hex(&src),
                source_bytes: src.len(),
            };
            println!("{}", serde_json::to_string(&report)?);
            Ok(std::process::ExitCode::SUCCESS)
        }
    }
}
