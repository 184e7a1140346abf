//! rail-graph binary.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rail_graph::{serve::serve, Cli, Command, Handler, Response, Settings};
use rail_graph_core::GraphStore;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only JSON responses.
    // Example: RUST_LOG=rail_graph=debug,rail_graph_core=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rail_graph=info,rail_graph_core=info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli);

    let store = GraphStore::new();
    settings
        .load_initial(&store)
        .context("failed to load initial graph")?;

    let handler = Handler::new(&store, &settings);

    let request = match cli.command {
        Command::Serve => {
            let stdin = io::stdin();
            let answered = serve(&handler, stdin.lock(), io::stdout().lock())?;
            tracing::info!(answered, "rail_graph: input closed, shutting down");
            return Ok(ExitCode::SUCCESS);
        }
        command => command.into_request().context("command has no request form")?,
    };

    let response = handler.respond(request);
    let mut stdout = io::stdout().lock();
    write_json(&mut stdout, &response, settings.pretty)?;

    Ok(if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn write_json<W: Write>(out: &mut W, response: &Response, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, response)?;
    } else {
        serde_json::to_writer(&mut *out, response)?;
    }
    writeln!(out)?;
    Ok(())
}
