use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use billguard_cli::{
    print_answer, print_error, print_ingestion_report, print_inspection, print_llm_probe,
    print_store_missing,
};
use billguard_core::{Error, LLMProvider, PipelineConfig, VectorStore};
use billguard_ollama::{OllamaClient, OllamaConfig, OllamaEmbedder};
use billguard_pii::PatternDetector;
use billguard_rag::{
    IngestionPipeline, LocalVectorStore, PdfLoader, PromptTemplate, QueryResponder,
};

const PROBE_PROMPT: &str = "Say 'Hello, World!' if you can hear me.";
const INSPECT_TAIL: usize = 3;

#[derive(Parser)]
#[command(name = "billguard")]
#[command(about = "Ask questions about your PDF bills without exposing personal data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mask PII in every PDF under the data directory and index the result
    Ingest,
    /// Answer a question from the indexed bills
    Query {
        query: String,
        /// Custom prompt template containing {context} and {input}
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Show the record count and the most recent records in the store
    Inspect,
    /// Check that the language model answers a probe prompt
    CheckLlm,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(error) => print_error(error),
                None => eprintln!("{} {}", "❌".red(), format!("Error: {:#}", e).red()),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::from_env()?;
    let ollama = OllamaConfig::from_env()?;
    debug!("Using Ollama at {}", ollama.base_url);

    match cli.command {
        Commands::Ingest => ingest(config, ollama).await,
        Commands::Query { query, prompt } => answer(config, ollama, &query, prompt.as_deref()).await,
        Commands::Inspect => inspect(config).await,
        Commands::CheckLlm => check_llm(config, ollama).await,
    }
}

async fn ingest(config: PipelineConfig, ollama: OllamaConfig) -> Result<()> {
    let embedder = OllamaEmbedder::new(ollama, config.embedding_model.clone())?;
    let store = LocalVectorStore::new(config.store_dir.clone());

    let mut pipeline = IngestionPipeline::new(
        config,
        PdfLoader::new(),
        PatternDetector::new()?,
        embedder,
        store,
    )?;
    let report = pipeline.run().await?;

    print_ingestion_report(&report);
    Ok(())
}

async fn answer(
    config: PipelineConfig,
    ollama: OllamaConfig,
    query: &str,
    prompt: Option<&str>,
) -> Result<()> {
    // reject a bad template before either model is contacted
    let template = match prompt {
        Some(custom) => PromptTemplate::parse(custom)?,
        None => PromptTemplate::default(),
    };

    let embedder = OllamaEmbedder::new(ollama.clone(), config.embedding_model.clone())?;
    let llm = OllamaClient::new(ollama)?.with_model(config.llm_model.clone());
    let store = LocalVectorStore::new(config.store_dir.clone());

    let mut responder = QueryResponder::new(config, embedder, store, llm);
    responder.initialize().await?;

    println!("{} {}", "🔍 Question:".cyan(), query);
    let response = responder.answer_with_template(query, &template).await?;
    print_answer(&response);
    Ok(())
}

async fn inspect(config: PipelineConfig) -> Result<()> {
    let mut store = LocalVectorStore::new(config.store_dir.clone());
    if !store.exists() {
        print_store_missing(&config.store_dir);
        return Ok(());
    }

    store.connect().await?;
    let total = store.count().await?;
    print_inspection(total, store.tail(INSPECT_TAIL));
    Ok(())
}

async fn check_llm(config: PipelineConfig, ollama: OllamaConfig) -> Result<()> {
    println!("Attempting to connect to Ollama with model '{}'...", config.llm_model);

    let mut llm = OllamaClient::new(ollama)?.with_model(config.llm_model.clone());
    let outcome = match llm.connect().await {
        Ok(()) => llm.generate(PROBE_PROMPT).await.map(|result| result.text),
        Err(e) => Err(e),
    };

    print_llm_probe(&config.llm_model, &outcome);
    match outcome {
        Ok(_) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_with_prompt() {
        let cli = Cli::try_parse_from([
            "billguard",
            "query",
            "How much do I owe?",
            "--prompt",
            "{context} / {input}",
        ])
        .unwrap();

        match cli.command {
            Commands::Query { query, prompt } => {
                assert_eq!(query, "How much do I owe?");
                assert_eq!(prompt.as_deref(), Some("{context} / {input}"));
            }
            _ => panic!("expected query subcommand"),
        }
    }

    #[test]
    fn test_parse_subcommands() {
        assert!(matches!(
            Cli::try_parse_from(["billguard", "ingest"]).unwrap().command,
            Commands::Ingest
        ));
        assert!(matches!(
            Cli::try_parse_from(["billguard", "inspect"]).unwrap().command,
            Commands::Inspect
        ));
        assert!(matches!(
            Cli::try_parse_from(["billguard", "check-llm"]).unwrap().command,
            Commands::CheckLlm
        ));
    }

    #[tokio::test]
    async fn test_bad_prompt_rejected_before_store_and_models() {
        let config = PipelineConfig {
            store_dir: "no-such-billguard-store".into(),
            ..Default::default()
        };
        let ollama = OllamaConfig::new("http://127.0.0.1:9", 1).unwrap();

        let err = answer(config, ollama, "How much do I owe?", Some("no slots"))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidInput(_))));
    }

    #[test]
    fn test_query_requires_text() {
        assert!(Cli::try_parse_from(["billguard", "query"]).is_err());
        assert!(Cli::try_parse_from(["billguard"]).is_err());
    }
}
