mod display;
mod ingest;
mod setup;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lexbrief_core::{Query, Settings};
use lexbrief_pipeline::{Orchestrator, RetryPolicy};
use lexbrief_sources::{CaselawSearcher, CourtListenerSearcher, SemanticSearcher, SourceSearcher};
use tracing_subscriber::EnvFilter;

/// Lexbrief: legal research briefs from case-law sources and a local passage index
#[derive(Parser, Debug)]
#[command(name = "lexbrief", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides applied on top of the built-in defaults.
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    generation_url: Option<String>,

    /// API key for the generation endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Model name passed to the generation endpoint
    #[arg(long, env = "LEXBRIEF_MODEL", global = true)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "LEXBRIEF_TEMPERATURE", global = true)]
    temperature: Option<f32>,

    /// Per-request timeout for generation calls, in seconds
    #[arg(long, env = "LEXBRIEF_GENERATION_TIMEOUT", global = true)]
    generation_timeout: Option<u64>,

    /// CourtListener REST base URL
    #[arg(long, env = "COURTLISTENER_URL", global = true)]
    courtlistener_url: Option<String>,

    /// CourtListener API token
    #[arg(long, env = "COURTLISTENER_API_KEY", hide_env_values = true, global = true)]
    courtlistener_api_key: Option<String>,

    /// Harvard Caselaw Access Project base URL
    #[arg(long, env = "CASELAW_URL", global = true)]
    caselaw_url: Option<String>,

    /// Per-request timeout for case-law sources, in seconds
    #[arg(long, env = "LEXBRIEF_SOURCE_TIMEOUT", global = true)]
    source_timeout: Option<u64>,

    /// Vector index location (`.json` file, or a LanceDB directory)
    #[arg(long, env = "LEXBRIEF_INDEX", global = true)]
    index: Option<PathBuf>,

    /// ONNX sentence-transformer directory (model.onnx + tokenizer.json)
    #[arg(long, env = "LEXBRIEF_EMBED_MODEL", global = true)]
    embed_model: Option<PathBuf>,

    /// Attempts per stage before giving up
    #[arg(long, env = "LEXBRIEF_MAX_ATTEMPTS", global = true)]
    max_attempts: Option<u32>,

    /// Accept every successful stage without asking the evaluator
    #[arg(long, global = true)]
    no_self_evaluation: bool,

    /// Treat evaluator errors as rejections
    #[arg(long, global = true)]
    fail_closed: bool,
}

impl ConfigArgs {
    fn into_settings(self) -> Settings {
        let mut settings = Settings::default();
        if let Some(v) = self.generation_url {
            settings.generation_url = v;
        }
        if let Some(v) = self.api_key {
            settings.generation_api_key = v;
        }
        if let Some(v) = self.model {
            settings.model = v;
        }
        if let Some(v) = self.temperature {
            settings.temperature = v;
        }
        if let Some(v) = self.generation_timeout {
            settings.generation_timeout_secs = v;
        }
        if let Some(v) = self.courtlistener_url {
            settings.courtlistener_url = v;
        }
        if let Some(v) = self.courtlistener_api_key {
            settings.courtlistener_api_key = v;
        }
        if let Some(v) = self.caselaw_url {
            settings.caselaw_url = v;
        }
        if let Some(v) = self.source_timeout {
            settings.source_timeout_secs = v;
        }
        if let Some(v) = self.index {
            settings.index_path = v;
        }
        if let Some(v) = self.max_attempts {
            settings.retry.max_attempts = v;
        }
        settings.retry.self_evaluation &= !self.no_self_evaluation;
        settings.retry.fail_open &= !self.fail_closed;
        settings
    }
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// The research question
    query: String,

    /// Restrict case-law sources to a jurisdiction or court
    #[arg(short, long)]
    jurisdiction: Option<String>,

    /// Case types of interest (repeatable)
    #[arg(long = "case-type")]
    case_types: Vec<String>,
}

impl QueryArgs {
    fn into_query(self) -> Query {
        let mut query = Query::new(self.query);
        if let Some(j) = self.jurisdiction {
            query = query.with_jurisdiction(j);
        }
        if !self.case_types.is_empty() {
            query = query.with_case_types(self.case_types);
        }
        query
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and print the brief
    Research {
        #[command(flatten)]
        query: QueryArgs,
        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a query without running the pipeline
    Validate {
        #[command(flatten)]
        query: QueryArgs,
        #[arg(long)]
        json: bool,
    },
    /// Similarity search over the local passage index
    Search {
        query: String,
        /// Number of passages to return
        #[arg(short, default_value_t = 5)]
        k: usize,
    },
    /// Append passages from a JSON file with `documents` and `metadata` arrays
    AddDocuments { file: PathBuf },
    /// Report orchestrator and agent status
    Health {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let embed_model = cli.config.embed_model.clone();
    let settings = cli.config.into_settings();
    tracing::debug!("lexbrief v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Research { query, json } => {
            let orchestrator = build_orchestrator(&settings, embed_model).await?;
            let response = orchestrator.research(&query.into_query()).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                display::print_response(&response);
            }
            if !response.success {
                std::process::exit(1);
            }
        }
        Command::Validate { query, json } => {
            let report = lexbrief_core::validate_query(&query.into_query());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_validation(&report);
            }
            if !report.valid {
                std::process::exit(1);
            }
        }
        Command::Search { query, k } => {
            let embedder = setup::embedder(embed_model.as_deref())?;
            let index = setup::open_index(&settings.index_path, embedder).await?;
            let hits = index
                .search(&query, k)
                .await
                .with_context(|| format!("searching {}", settings.index_path.display()))?;
            display::print_hits(&hits);
        }
        Command::AddDocuments { file } => {
            let documents = ingest::read_documents(&file)?;
            let embedder = setup::embedder(embed_model.as_deref())?;
            let index = setup::open_index(&settings.index_path, embedder).await?;
            let added = index
                .add_documents(documents)
                .await
                .with_context(|| format!("indexing {}", file.display()))?;
            let total = index.len().await?;
            eprintln!(
                "Added {added} passages to {} ({total} total)",
                settings.index_path.display()
            );
        }
        Command::Health { json } => {
            let orchestrator = build_orchestrator(&settings, embed_model).await?;
            let health = orchestrator.health().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                display::print_health(&health);
            }
        }
    }
    Ok(())
}

/// Wire the live sources, generator, and retry policy.
async fn build_orchestrator(
    settings: &Settings,
    embed_model: Option<PathBuf>,
) -> anyhow::Result<Orchestrator> {
    let embedder = setup::embedder(embed_model.as_deref())?;
    let index = setup::open_index(&settings.index_path, embedder).await?;
    let searchers: Vec<Arc<dyn SourceSearcher>> = vec![
        Arc::new(CourtListenerSearcher::from_settings(settings)),
        Arc::new(CaselawSearcher::from_settings(settings)),
        Arc::new(SemanticSearcher::new(index)),
    ];
    let generator = Arc::new(lexbrief_ai::ChatClient::from_settings(settings));
    tracing::info!(model = generator.model(), sources = searchers.len(), "pipeline ready");
    Ok(Orchestrator::standard(
        generator,
        searchers,
        RetryPolicy::from(&settings.retry),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "lexbrief",
            "research",
            "What is the standard for summary judgment?",
            "--jurisdiction",
            "ca9",
            "--case-type",
            "civil",
            "--model",
            "gpt-4o",
            "--max-attempts",
            "5",
            "--generation-timeout",
            "45",
            "--fail-closed",
        ])
        .unwrap();
        let Command::Research { query, json } = cli.command else {
            panic!("expected research");
        };
        assert!(!json);
        let query = query.into_query();
        assert_eq!(query.jurisdiction.as_deref(), Some("ca9"));
        assert_eq!(query.case_types, Some(vec!["civil".to_string()]));

        let settings = cli.config.into_settings();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.generation_timeout_secs, 45);
        assert!(!settings.retry.fail_open);
        assert!(settings.retry.self_evaluation);
    }

    #[test]
    fn untouched_settings_keep_defaults() {
        let settings = ConfigArgs::default().into_settings();
        let defaults = Settings::default();
        assert_eq!(settings.courtlistener_url, defaults.courtlistener_url);
        assert_eq!(settings.retry, defaults.retry);
    }
}
