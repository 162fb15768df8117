use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use trendpress_core::config::Settings;
use trendpress_core::domain::{
    NewProvider, ProviderConfig, ProviderId, ProviderKind, ProviderSettings, TaskId, TaskStatus,
};
use trendpress_core::impls::{InMemoryStore, SqliteStore};
use trendpress_core::observability::{PipelineStatus, init_tracing};
use trendpress_core::ports::{ContentStore, ProviderStore, TaskFilter, TaskStore};
use trendpress_core::{Orchestrator, OrchestratorBuilder};

#[derive(Debug, Parser)]
#[command(name = "trendpress", version, about = "AI content pipeline: trends -> tasks -> draft posts")]
struct Cli {
    /// Use a throwaway in-memory store instead of DATABASE_URL.
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for trending topics and create pending tasks.
    FetchTrends(FetchArgs),

    /// Process a single pending task.
    Process { task_id: TaskId },

    /// Process pending tasks, oldest first.
    ProcessPending {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Reset a failed task and process it again.
    Retry { task_id: TaskId },

    /// Show task and post counts.
    Stats,

    /// Full pipeline: fetch trends, process tasks, print a summary.
    Run(RunArgs),

    /// Inspect tasks.
    Tasks {
        #[command(subcommand)]
        command: TasksCommand,
    },

    /// Manage stored AI providers.
    Providers {
        #[command(subcommand)]
        command: ProvidersCommand,
    },
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// Number of trends (defaults to AI_TRENDS_COUNT).
    #[arg(long)]
    count: Option<u32>,

    /// Article language, e.g. `en` or `ar`.
    #[arg(long)]
    language: Option<String>,

    /// Stored provider to use instead of the default.
    #[arg(long)]
    provider: Option<ProviderId>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    fetch: FetchArgs,

    /// Skip the fetch phase.
    #[arg(long)]
    only_process: bool,

    /// Process at most this many tasks.
    #[arg(long)]
    limit: Option<usize>,

    /// Override the minimum article length.
    #[arg(long)]
    min_words: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum TasksCommand {
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Show {
        task_id: TaskId,
    },
}

#[derive(Debug, Subcommand)]
enum ProvidersCommand {
    Add {
        name: String,
        /// gemini | openai | openrouter | mock (unknown values mean gemini).
        #[arg(long, default_value = "gemini")]
        kind: String,
        #[arg(long, default_value = "")]
        api_key: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long, default_value_t = 0)]
        priority: i32,
        /// Make this the default provider.
        #[arg(long)]
        default: bool,
        #[arg(long)]
        description: Option<String>,
    },
    List {
        /// Include inactive providers.
        #[arg(long)]
        all: bool,
    },
    SetDefault {
        provider_id: ProviderId,
    },
}

struct Stores {
    tasks: Arc<dyn TaskStore>,
    content: Arc<dyn ContentStore>,
    providers: Arc<dyn ProviderStore>,
}

async fn open_stores(memory: bool, settings: &Settings) -> Result<Stores> {
    if memory {
        let store = Arc::new(InMemoryStore::new());
        return Ok(Stores {
            tasks: store.clone(),
            content: store.clone(),
            providers: store,
        });
    }
    let store = Arc::new(
        SqliteStore::connect(&settings.database_url)
            .await
            .with_context(|| format!("opening {}", settings.database_url))?,
    );
    Ok(Stores {
        tasks: store.clone(),
        content: store.clone(),
        providers: store,
    })
}

/// Explicit provider, else the stored default, else environment settings.
async fn resolve_provider(
    stores: &Stores,
    requested: Option<ProviderId>,
) -> Result<Option<ProviderConfig>> {
    match requested {
        Some(id) => {
            let provider = stores
                .providers
                .get_provider(id)
                .await?
                .with_context(|| format!("provider {id} not found"))?;
            Ok(Some(provider))
        }
        None => Ok(stores.providers.default_provider().await?),
    }
}

async fn orchestrator(
    settings: &Settings,
    stores: &Stores,
    provider: Option<ProviderId>,
) -> Result<Orchestrator> {
    let provider = resolve_provider(stores, provider).await?;
    if let Some(p) = &provider {
        info!(provider = %p.name, kind = %p.kind, "using stored provider");
    }
    let orchestrator = OrchestratorBuilder::new(settings.clone())
        .task_store(stores.tasks.clone())
        .content_store(stores.content.clone())
        .provider(provider.as_ref())
        .build()?;
    Ok(orchestrator)
}

fn print_status(status: &PipelineStatus) {
    println!("{:<14} {:>8}", "Metric", "Count");
    println!("{}", "-".repeat(23));
    for (label, value) in status.rows() {
        println!("{label:<14} {value:>8}");
    }
}

async fn run_pipeline(settings: &Settings, stores: &Stores, args: RunArgs) -> Result<()> {
    let mut orchestrator = orchestrator(settings, stores, args.fetch.provider).await?;
    if let Some(min_words) = args.min_words {
        let content = orchestrator.content_settings_mut();
        content.min_words = min_words;
        content.max_words = content.max_words.max(min_words);
    }

    println!("== trendpress pipeline ==");
    if !args.only_process {
        if !orchestrator.validate_api_key().await {
            bail!(
                "{} API key is missing or was rejected",
                orchestrator.trend_source_name()
            );
        }
        println!("Fetching trends...");
        let fetched = orchestrator
            .fetch_trends(args.fetch.count, args.fetch.language.as_deref())
            .await?;
        println!("Created {} task(s)", fetched.created);
    }

    println!("Processing pending tasks...");
    let batch = orchestrator.process_pending_tasks(args.limit).await?;
    println!(
        "Processed {}: {} succeeded, {} failed",
        batch.total, batch.successful, batch.failed
    );
    println!();
    print_status(&orchestrator.status().await?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let stores = open_stores(cli.memory, &settings).await?;

    match cli.command {
        Command::FetchTrends(args) => {
            let orchestrator = orchestrator(&settings, &stores, args.provider).await?;
            let outcome = orchestrator
                .fetch_trends(args.count, args.language.as_deref())
                .await?;
            println!("Created {} task(s)", outcome.created);
            for id in outcome.task_ids {
                println!("  {id}");
            }
        }
        Command::Process { task_id } => {
            let orchestrator = orchestrator(&settings, &stores, None).await?;
            let task = orchestrator.run_task(task_id).await?;
            println!("{task_id} {}", task.status);
        }
        Command::ProcessPending { limit } => {
            let orchestrator = orchestrator(&settings, &stores, None).await?;
            let batch = orchestrator.process_pending_tasks(limit).await?;
            println!(
                "Processed {}: {} succeeded, {} failed",
                batch.total, batch.successful, batch.failed
            );
        }
        Command::Retry { task_id } => {
            let orchestrator = orchestrator(&settings, &stores, None).await?;
            if !orchestrator.retry_failed_task(task_id).await {
                bail!("{task_id} was not completed by the retry");
            }
            println!("{task_id} completed");
        }
        Command::Stats => {
            let orchestrator = orchestrator(&settings, &stores, None).await?;
            print_status(&orchestrator.status().await?);
        }
        Command::Run(args) => run_pipeline(&settings, &stores, args).await?,
        Command::Tasks { command } => match command {
            TasksCommand::List { status, limit } => {
                let tasks = stores.tasks.list_tasks(TaskFilter { status, limit }).await?;
                for task in tasks {
                    let scheduled = task
                        .scheduled_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!(
                        "{:<10} {:<10} {:<17} {}",
                        task.id.to_string(),
                        task.status.as_str(),
                        scheduled,
                        task.display_title()
                    );
                }
            }
            TasksCommand::Show { task_id } => {
                let task = stores
                    .tasks
                    .get_task(task_id)
                    .await?
                    .with_context(|| format!("{task_id} not found"))?;
                println!("{}", serde_json::to_string_pretty(&task)?);
            }
        },
        Command::Providers { command } => match command {
            ProvidersCommand::Add {
                name,
                kind,
                api_key,
                model,
                base_url,
                temperature,
                max_tokens,
                priority,
                default,
                description,
            } => {
                let defaults = ProviderSettings::default();
                let mut new = NewProvider::new(name, ProviderKind::parse_lenient(&kind), api_key, model);
                new.base_url = base_url;
                new.settings = ProviderSettings {
                    temperature: temperature.unwrap_or(defaults.temperature),
                    max_tokens: max_tokens.unwrap_or(defaults.max_tokens),
                };
                new.priority = priority;
                new.is_default = default;
                new.description = description;
                let provider = stores.providers.insert_provider(new).await?;
                println!("Added {} ({})", provider.id, provider.kind);
            }
            ProvidersCommand::List { all } => {
                for p in stores.providers.list_providers(!all).await? {
                    println!(
                        "{:<12} {:<20} {:<11} {:<28} priority={}{}",
                        p.id.to_string(),
                        p.name,
                        p.kind.as_str(),
                        p.model,
                        p.priority,
                        if p.is_default { " (default)" } else { "" }
                    );
                }
            }
            ProvidersCommand::SetDefault { provider_id } => {
                let provider = stores.providers.set_default(provider_id).await?;
                println!("{} is now the default provider", provider.name);
            }
        },
    }
    Ok(())
}
