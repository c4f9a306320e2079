use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use bedrag_bedrock::{BedrockClient, BedrockGenerator, TitanEmbedder};
use bedrag_cli::{
    display_banner, format_generation_stats, format_model_list, format_sources, select_model,
    ChatSession, InteractiveSession,
};
use bedrag_core::{logging::init_logging, Embedder, VectorStore};
use bedrag_rag::{
    sample_documents, Answer, CachedEmbedder, DocumentIndexer, HashEmbedder, InMemoryVectorStore,
    RagConfig, RagPipeline,
};

#[derive(Parser)]
#[command(name = "bedrag")]
#[command(about = "Retrieval-Augmented Generation over Amazon Bedrock", version, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Embed with the offline hash embedder instead of Titan
    #[arg(long, global = true)]
    local_embeddings: bool,

    /// Load the knowledge base from this snapshot and save it back on exit
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Menu-driven session (default)
    Interactive,
    /// Answer one question
    Ask {
        query: String,
        /// Send the bare question without retrieved context
        #[arg(long)]
        no_rag: bool,
        #[arg(long, default_value_t = 3)]
        top_k: usize,
    },
    /// Answer one question with and without retrieved context
    Compare {
        query: String,
        #[arg(long, default_value_t = 3)]
        top_k: usize,
    },
    /// List on-demand chat models
    Models,
    /// Chat with a foundation model
    Chat {
        /// Model id; prompts for a choice when omitted
        #[arg(long)]
        model: Option<String>,
    },
}

struct App {
    pipeline: RagPipeline,
    indexer: DocumentIndexer,
    store: Arc<InMemoryVectorStore>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let client = Arc::new(BedrockClient::from_env().context("Failed to configure Bedrock client")?);

    match cli.command.as_ref().unwrap_or(&Commands::Interactive) {
        Commands::Interactive => {
            let app = build_app(&cli, client, RagConfig::default()).await?;
            display_banner(&format!(
                "{} documents · embeddings: {}",
                app.store.count().await?,
                app.pipeline.embedder().model_id()
            ));
            let store = app.store.clone();
            let embedder = app.pipeline.embedder().clone();
            InteractiveSession::new(app.pipeline, app.indexer).run().await?;
            save_snapshot(&cli, &store, embedder.model_id())?;
        }
        Commands::Ask { query, no_rag, top_k } => {
            let app = build_app(&cli, client, rag_config(*top_k)).await?;
            if *no_rag {
                print_answer(&app.pipeline.answer_without_rag(query).await?, false);
            } else {
                print_answer(&app.pipeline.answer_with_rag(query).await?, true);
            }
        }
        Commands::Compare { query, top_k } => {
            let app = build_app(&cli, client, rag_config(*top_k)).await?;
            let comparison = app.pipeline.compare(query).await;

            println!("{}", "With RAG".bold().underline());
            match &comparison.with_rag {
                Ok(answer) => print_answer(answer, true),
                Err(e) => println!("{} {}", "✗".red(), e),
            }
            println!();
            println!("{}", "Without RAG".bold().underline());
            match &comparison.without_rag {
                Ok(answer) => print_answer(answer, false),
                Err(e) => println!("{} {}", "✗".red(), e),
            }
        }
        Commands::Models => {
            let models = client.list_chat_models().await?;
            println!("{} ({})", "On-demand chat models".bold(), models.len());
            println!("{}", format_model_list(&models));
        }
        Commands::Chat { model } => {
            let model_id = match model {
                Some(id) => id.clone(),
                None => {
                    let models = client.list_chat_models().await?;
                    let selected = select_model(&models, &mut io::stdin().lock(), &mut io::stdout())?;
                    match selected {
                        Some(model) => model.model_id,
                        None => return Ok(()),
                    }
                }
            };
            let generator = BedrockGenerator::for_model(client, model_id)?;
            ChatSession::new(Arc::new(generator), RagConfig::default().max_tokens)
                .run()
                .await?;
        }
    }

    Ok(())
}

fn rag_config(top_k: usize) -> RagConfig {
    RagConfig {
        top_k,
        ..RagConfig::default()
    }
}

async fn build_app(cli: &Cli, client: Arc<BedrockClient>, config: RagConfig) -> Result<App> {
    let embedder: Arc<dyn Embedder> = if cli.local_embeddings {
        Arc::new(CachedEmbedder::new(HashEmbedder::default()))
    } else {
        Arc::new(CachedEmbedder::new(TitanEmbedder::new(client.clone())))
    };

    let store = match cli.snapshot.as_deref().filter(|path| path.exists()) {
        Some(path) => Arc::new(
            InMemoryVectorStore::load_snapshot_for(path, embedder.model_id())
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?,
        ),
        None => Arc::new(InMemoryVectorStore::new()),
    };

    let indexer = DocumentIndexer::new(embedder.clone(), store.clone());
    if store.count().await? == 0 {
        let result = indexer.index_documents(sample_documents()).await;
        if !result.is_complete() {
            for error in &result.errors {
                eprintln!("{} {}", "⚠️".yellow(), error);
            }
        }
        info!(documents = result.documents_indexed, "seeded knowledge base");
    }

    let generator = Arc::new(BedrockGenerator::new(client)?);
    let pipeline = RagPipeline::new(embedder, store.clone(), generator).with_config(config);

    Ok(App {
        pipeline,
        indexer,
        store,
    })
}

fn save_snapshot(cli: &Cli, store: &InMemoryVectorStore, embedding_model: &str) -> Result<()> {
    if let Some(path) = cli.snapshot.as_deref() {
        store
            .save_snapshot(path, embedding_model)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
        println!("{} Saved knowledge base to {}", "✓".green(), path.display());
    }
    Ok(())
}

fn print_answer(answer: &Answer, show_sources: bool) {
    if show_sources {
        println!("{}", "Retrieved documents:".dimmed());
        println!("{}", format_sources(&answer.sources));
        println!();
    }
    println!("{}", answer.text());
    println!("{}", format_generation_stats(&answer.generation).dimmed());
}
