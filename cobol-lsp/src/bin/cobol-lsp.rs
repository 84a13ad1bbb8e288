use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cobol_config::{CobolConfig, Loader};
use cobol_lsp::CobolLanguageServer;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// COBOL language server speaking LSP over stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "cobol-lsp", version, about)]
struct Cli {
    /// TOML file layered over the built-in defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter directive (e.g. `cobol_lsp=debug`); RUST_LOG takes precedence
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,
}

fn load_config(cli: &Cli) -> Result<CobolConfig, config::ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader = loader.with_env();
    if let Some(filter) = &cli.log_filter {
        loader = loader.set_override("logging.filter", filter.as_str())?;
    }
    loader.build()
}

fn init_logging(config: &CobolConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("cobol-lsp: failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);
    info!(
        language_ids = ?config.documents.language_ids,
        "starting COBOL language server"
    );

    let stdin = stdin();
    let stdout = stdout();
    let (service, socket) =
        LspService::new(move |client| CobolLanguageServer::new(client, config.clone()));
    Server::new(stdin, stdout, socket).serve(service).await;
    ExitCode::SUCCESS
}
