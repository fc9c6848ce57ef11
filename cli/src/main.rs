//! `sukoon`: build the Sukoon AI index and talk to the companion.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sukoon_companion::{Companion, GeminiGenerator, ReplyKind};
use sukoon_retrieval::{Credentials, RetrievalEngine};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::SukoonConfig;

#[derive(Parser, Debug)]
#[command(name = "sukoon", about = "Sukoon AI: a calm, retrieval-grounded companion")]
struct Cli {
    /// TOML config file with `[retrieval]` and `[generation]` tables
    #[arg(long, global = true, env = "SUKOON_CONFIG")]
    config: Option<PathBuf>,

    /// Override the vector index name
    #[arg(long, global = true)]
    index_name: Option<String>,

    /// Override where full chunk texts are stored
    #[arg(long, global = true)]
    chunk_map: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk a corpus file, reconcile the index and upsert every chunk
    Index {
        /// UTF-8 corpus; blocks are separated by blank lines
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Answer one message and exit
    Ask {
        /// The message to answer
        message: String,
    },

    /// Read messages from stdin, one per line, until EOF or `exit`
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = SukoonConfig::load(cli.config.as_deref())?
        .with_overrides(cli.index_name.clone(), cli.chunk_map.clone());
    let credentials = Credentials::from_env()?;

    let engine = RetrievalEngine::builder()
        .with_config(config.retrieval.clone())
        .with_credentials(&credentials)?
        .build()?;

    match cli.command {
        Command::Index { corpus } => run_index(&engine, corpus).await,
        Command::Ask { message } => {
            let companion = open_companion(&engine, &config, &credentials).await?;
            run_ask(&companion, &message).await
        }
        Command::Chat => {
            let companion = open_companion(&engine, &config, &credentials).await?;
            run_chat(&companion).await
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_companion(
    engine: &RetrievalEngine,
    config: &SukoonConfig,
    credentials: &Credentials,
) -> Result<Companion> {
    let retriever = engine
        .open_retriever()
        .await
        .context("failed to open retriever")?;
    let generator = GeminiGenerator::from_config(&config.generation)
        .with_api_key(credentials.gemini_api_key.clone());

    Ok(Companion::new(retriever, Arc::new(generator)))
}

async fn run_index(engine: &RetrievalEngine, corpus: PathBuf) -> Result<()> {
    let report = engine
        .build_index_from_file(&corpus)
        .await
        .with_context(|| format!("indexing {} failed", corpus.display()))?;

    info!("Index outcome: {:?}", report.outcome);
    println!(
        "Indexed {} blocks as {} chunks (dim={}, {} vectors upserted); full texts in {}",
        report.blocks,
        report.chunks,
        report.dimension,
        report.vectors_upserted,
        report.chunk_map_path.display()
    );
    Ok(())
}

async fn run_ask(companion: &Companion, message: &str) -> Result<()> {
    let reply = companion.respond(message).await?;
    println!("{}", reply.text);

    if reply.kind == ReplyKind::Generated && reply.degraded {
        eprintln!("note: some context came from truncated previews; re-run `sukoon index`");
    }
    Ok(())
}

async fn run_chat(companion: &Companion) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        let reply = companion.handle_user_input(message).await;
        stdout
            .write_all(format!("Sukoon AI: {reply}\n\n").as_bytes())
            .await?;
    }

    stdout.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::parse_from(["sukoon", "index", "--corpus", "data.txt"]);
        assert!(matches!(
            cli.command,
            Command::Index { ref corpus } if corpus == &PathBuf::from("data.txt")
        ));

        let cli = Cli::parse_from(["sukoon", "--index-name", "alt", "ask", "I feel low"]);
        assert_eq!(cli.index_name.as_deref(), Some("alt"));
        assert!(matches!(cli.command, Command::Ask { ref message } if message == "I feel low"));

        let cli = Cli::parse_from(["sukoon", "chat", "--chunk-map", "map.json"]);
        assert!(matches!(cli.command, Command::Chat));
        assert_eq!(cli.chunk_map, Some(PathBuf::from("map.json")));
    }
}
