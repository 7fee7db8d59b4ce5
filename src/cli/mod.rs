//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate commands.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::core::config::io::{default_registry_path, load_registry};
use crate::mcp::client::ToolDispatcher;
use crate::mcp::result::unwrap_text_content;

#[derive(Parser)]
#[command(name = "mcpget")]
#[command(about = "Invoke tools on SSE-transport MCP servers directly over HTTP")]
#[command(
    long_about = "mcpget calls named tools on remote MCP servers that speak the legacy SSE \
transport, without routing the request through a model. It opens the server's event \
stream, learns the per-session callback endpoint from it, POSTs the call as a JSON-RPC \
envelope, and waits for the correlated reply on the stream.\n\n\
Servers are read from an mcp.json registry (default: ~/.cursor/mcp.json):\n\
  {\"mcpServers\": {\"logs\": {\"url\": \"https://...\", \"transport\": \"sse\"}}}\n\n\
Set RUST_LOG=mcpget=debug for wire-level diagnostics on stderr."
)]
pub struct Args {
    /// Path to the mcp.json registry (defaults to ~/.cursor/mcp.json)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List servers reachable over the SSE transport
    Servers,
    /// Call a tool and print (or save) its result
    Call {
        /// Server name from the registry
        server: String,
        /// Tool name to invoke
        tool: String,
        /// Tool arguments as a JSON object, passed through unmodified
        #[arg(long, default_value = "{}", value_name = "JSON")]
        args: String,
        /// Overall call timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,
        /// Save the result to FILE instead of printing it; with no FILE,
        /// a timestamped name derived from the tool is used
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "")]
        output: Option<String>,
        /// Print the raw result without unwrapping embedded text content
        #[arg(long)]
        raw: bool,
    },
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let registry_path = match args.registry {
        Some(path) => path,
        None => default_registry_path()?,
    };
    let registry = load_registry(&registry_path)?;

    match args.command {
        Commands::Servers => {
            for name in registry.sse_servers() {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Call {
            server,
            tool,
            args: raw_args,
            timeout,
            output,
            raw,
        } => {
            let arguments: serde_json::Value = serde_json::from_str(&raw_args)
                .map_err(|err| format!("--args is not valid JSON: {err}"))?;

            let dispatcher = ToolDispatcher::new(registry)?;
            let result = dispatcher
                .call(&server, &tool, arguments, Duration::from_secs(timeout))
                .await?;
            let result = if raw { result } else { unwrap_text_content(&result) };
            let rendered = serde_json::to_string_pretty(&result)?;

            match output {
                Some(path) => {
                    let path = if path.is_empty() {
                        format!("{}_{}.json", tool, chrono::Local::now().format("%Y%m%d_%H%M%S"))
                    } else {
                        path
                    };
                    std::fs::write(&path, rendered)?;
                    eprintln!("Saved result to {path}");
                }
                None => println!("{rendered}"),
            }
            Ok(())
        }
    }
}
