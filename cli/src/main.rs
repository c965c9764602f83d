//! CLI entrypoint for agentry
//!
//! Wires the configuration, LLM client, approval parser, snapshot store and
//! agent registry together, then feeds messages to the session's agent.

mod args;
mod notes;
mod session;

use agentry_application::{
    AgentBuildContext, AgentRegistry, ConversationLogger, DomainToolContext, NoConversationLogger,
};
use agentry_domain::AgentResult;
use agentry_infrastructure::{
    ConfigLoader, FileConfig, JsonFileSnapshotStore, JsonlConversationLogger,
    KeywordApprovalParser, OpenAiCompatibleClient, OpenAiConfig,
};
use anyhow::{Context, Result, anyhow};
use args::Cli;
use clap::Parser;
use session::SessionRunner;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TENANT_ID: &str = "local";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_ref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    config.validate().context("Invalid configuration")?;

    let store_dir = resolve_store_dir(&cli, &config)?;
    info!(store_dir = %store_dir.display(), session = %cli.session, "Starting agentry");

    // === Dependency Injection ===
    let llm = Arc::new(OpenAiCompatibleClient::new(OpenAiConfig::from_file_config(
        &config.llm,
    )?)?);
    let approval_parser = Arc::new(KeywordApprovalParser::new()?);
    let logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_log {
        Some(path) => match JsonlConversationLogger::open(path) {
            Some(logger) => Arc::new(logger.with_session(cli.session.clone())),
            None => {
                warn!(path = %path.display(), "Conversation log unavailable, continuing without it");
                Arc::new(NoConversationLogger)
            }
        },
        None => Arc::new(NoConversationLogger),
    };

    let cancellation = CancellationToken::new();
    let interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut registry = AgentRegistry::new();
    notes::register(&mut registry, store_dir.join("notes.json"))?;

    let ctx = AgentBuildContext::new(
        Arc::new(DomainToolContext::new(llm, TENANT_ID)),
        approval_parser,
    )
    .with_params(config.react.to_params())
    .with_logger(logger)
    .with_cancellation(cancellation.clone());

    let runner = SessionRunner::new(
        Arc::new(registry),
        ctx,
        Arc::new(JsonFileSnapshotStore::new(store_dir)),
        cli.session.clone(),
        notes::AGENT_NAME,
    );

    if let Some(message) = &cli.message {
        let result = runner.send(message).await?;
        print_result(&result);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = next_input(&mut lines, &cancellation).await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let result = runner.send(line).await?;
        print_result(&result);
        if cancellation.is_cancelled() {
            break;
        }
    }

    Ok(())
}

/// Next stdin line, or `None` on end of input or once `cancellation` fires.
async fn next_input<R>(
    lines: &mut Lines<R>,
    cancellation: &CancellationToken,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        _ = cancellation.cancelled() => {
            info!("Interrupted, leaving the session as it is");
            Ok(None)
        }
        line = lines.next_line() => line,
    }
}

fn resolve_store_dir(cli: &Cli, config: &FileConfig) -> Result<PathBuf> {
    cli.store_dir
        .clone()
        .or_else(|| config.store.dir.clone())
        .or_else(ConfigLoader::default_store_dir)
        .ok_or_else(|| anyhow!("No data directory found; pass --store-dir"))
}

fn print_result(result: &AgentResult) {
    println!("[{}] {}", result.status, result.raw_message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_next_input_reads_lines() {
        let mut lines = BufReader::new(&b"note milk\nyes\n"[..]).lines();
        let token = CancellationToken::new();

        assert_eq!(next_input(&mut lines, &token).await.unwrap().as_deref(), Some("note milk"));
        assert_eq!(next_input(&mut lines, &token).await.unwrap().as_deref(), Some("yes"));
        assert_eq!(next_input(&mut lines, &token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_input_stops_on_interrupt_while_idle() {
        // The writer half stays open, so the reader would block forever.
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();
        let token = CancellationToken::new();
        token.cancel();

        let line = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            next_input(&mut lines, &token),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(line, None);
    }
}
