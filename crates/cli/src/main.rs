mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use quorum_core::pipeline::Pipeline;
use quorum_core::routing;
use quorum_core::state::{ChangeType, ReviewInput, ReviewState, Verdict};
use quorum_core::streaming::ReviewEvent;
use quorum_core::vcs::{FileChange, GitRepository, DEFAULT_CONTEXT_LINES};

#[derive(Parser)]
#[command(name = "quorum", about = "Multi-agent LLM code review for staged changes", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository to review (defaults to the current directory)
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Review unstaged changes instead of staged ones
    #[arg(long)]
    unstaged: bool,

    /// Gateway backend to use (ollama, openai)
    #[arg(short, long)]
    backend: Option<String>,

    /// Model to use (e.g. qwen2.5-coder:7b, gpt-4.1-mini)
    #[arg(short, long)]
    model: Option<String>,

    /// Gateway base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// Per-agent timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable the per-agent result cache
    #[arg(long)]
    no_cache: bool,

    /// Emit final review states as JSON instead of the human rendering
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain which agents would review a path and why
    Route {
        /// File path to classify
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quorum=warn".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Route { path }) = &cli.command {
        let summary = routing::routing_summary(path);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let repo = match GitRepository::open(&cli.repo) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let mut config = quorum_config::Config::resolve(repo.root())?;
    if let Some(backend) = &cli.backend {
        config.gateway.backend = backend.clone();
    }
    if let Some(model) = &cli.model {
        config.gateway.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.gateway.base_url = Some(base_url.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.scheduler.agent_timeout_secs = timeout;
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }

    let changes = if cli.unstaged {
        repo.unstaged_changes()?
    } else {
        repo.staged_changes()?
    };
    if changes.is_empty() {
        if cli.json {
            println!("[]");
        } else {
            println!("No changes to review.");
            if !cli.unstaged {
                println!("Tip: use 'git add <file>' to stage changes first.");
            }
        }
        return Ok(());
    }

    let gateway = match quorum_provider::create_gateway(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    info!(
        backend = gateway.name(),
        model = %config.gateway.model,
        files = changes.len(),
        "starting review"
    );
    let pipeline = Arc::new(Pipeline::new(gateway, &config));

    let states = tokio::select! {
        states = review_changes(&pipeline, &repo, &changes, cli.json) => states?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nReview cancelled.");
            std::process::exit(130);
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&states)?);
    } else {
        render::render_results(&states);
    }

    let rejected = states
        .iter()
        .any(|s| s.verdict == Some(Verdict::Reject));
    if rejected {
        std::process::exit(1);
    }
    Ok(())
}

/// Review each changed file in turn, streaming per-node progress. Agents
/// within a file run in parallel; files run sequentially so the output
/// stays readable.
async fn review_changes(
    pipeline: &Arc<Pipeline>,
    repo: &GitRepository,
    changes: &[FileChange],
    quiet: bool,
) -> Result<Vec<ReviewState>> {
    let mut states = Vec::new();

    for change in changes {
        if change.change_type == ChangeType::Deleted {
            if !quiet {
                println!("  skipped {} (deleted)", change.file_path);
            }
            continue;
        }

        let code = code_for_change(repo, change);
        let input = ReviewInput {
            file_path: change.file_path.clone(),
            file_type: None,
            code,
            diff: change.diff.clone(),
            change_type: change.change_type,
        };

        if !quiet {
            println!("Reviewing {}...", change.file_path);
        }
        let mut rx = pipeline.stream(input);
        while let Some(event) = rx.recv().await {
            match event {
                ReviewEvent::Router {
                    file_type,
                    agents_to_invoke,
                    ..
                } => {
                    if !quiet {
                        println!(
                            "  routed as {} -> {}",
                            file_type,
                            agents_to_invoke.join(", ")
                        );
                    }
                }
                ReviewEvent::Agent {
                    name,
                    issues,
                    elapsed_secs,
                    error,
                    cache_hit,
                } => {
                    if quiet {
                        continue;
                    }
                    match error {
                        Some(error) => println!("  {name}: failed ({error})"),
                        None => {
                            let cached = if cache_hit { ", cached" } else { "" };
                            println!(
                                "  {name}: {} issue(s) in {elapsed_secs:.2}s{cached}",
                                issues.len()
                            );
                        }
                    }
                }
                ReviewEvent::Aggregator { state } => {
                    states.push(*state);
                }
            }
        }
    }

    Ok(states)
}

/// Added files are reviewed whole; modified files get a numbered context
/// window around the changed lines. Any read failure degrades to the
/// diff alone rather than skipping the file.
fn code_for_change(repo: &GitRepository, change: &FileChange) -> String {
    let result = if change.change_type == ChangeType::Added || !change.has_changes() {
        repo.full_file_content(&change.file_path)
    } else {
        let mut lines = change.added_lines.clone();
        lines.extend(&change.removed_lines);
        repo.content_with_context(&change.file_path, &lines, DEFAULT_CONTEXT_LINES)
    };
    result.unwrap_or_else(|e| {
        tracing::warn!(file = %change.file_path, error = %e, "could not read file content");
        String::new()
    })
}
