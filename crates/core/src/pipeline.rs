//! The review pipeline: classify, route, fan out to the selected agents
//! in parallel, then fuse. The pipeline owns the [`ReviewState`]; agents
//! get a read-only view and report back over a channel, and no fused
//! result exists until every dispatched agent has terminated.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use quorum_config::Config;
use quorum_provider::{Gateway, Issue};

use crate::agents::{self, ReviewAgent};
use crate::cache::{cache_key, CacheEntry, ResultCache};
use crate::classify;
use crate::dedup;
use crate::routing;
use crate::scoring;
use crate::state::{ReviewInput, ReviewState, ReviewSummary, SeverityCounts};
use crate::streaming::ReviewEvent;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub agent_timeout: Duration,
    pub cache_enabled: bool,
    pub cache_capacity: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(30),
            cache_enabled: true,
            cache_capacity: 128,
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            agent_timeout: Duration::from_secs(config.scheduler.agent_timeout_secs),
            cache_enabled: config.cache.enabled,
            cache_capacity: config.cache.capacity,
        }
    }
}

/// What one agent task reports back to the collector.
struct AgentOutcome {
    name: String,
    issues: Vec<Issue>,
    elapsed_secs: f64,
    error: Option<String>,
    cache_hit: bool,
}

pub struct Pipeline {
    agents: BTreeMap<String, Arc<dyn ReviewAgent>>,
    cache: Option<ResultCache>,
    settings: PipelineSettings,
}

impl Pipeline {
    /// The standard pipeline: all six built-in specialists behind the
    /// given gateway, settings taken from config.
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        let agents = agents::builtin_agents(gateway, config.retry.clone());
        Self::with_agents(agents, PipelineSettings::from(config))
    }

    pub fn with_agents(
        agents: Vec<Arc<dyn ReviewAgent>>,
        settings: PipelineSettings,
    ) -> Self {
        let agents = agents
            .into_iter()
            .map(|a| (a.name().to_string(), a))
            .collect();
        let cache = settings
            .cache_enabled
            .then(|| ResultCache::new(settings.cache_capacity));
        Self {
            agents,
            cache,
            settings,
        }
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    pub async fn review(&self, input: ReviewInput) -> ReviewState {
        self.review_with_events(input, None).await
    }

    /// Run a review, emitting one [`ReviewEvent`] per completed node when
    /// a sender is supplied. Agent failures never escape their slot.
    pub async fn review_with_events(
        &self,
        input: ReviewInput,
        events: Option<mpsc::UnboundedSender<ReviewEvent>>,
    ) -> ReviewState {
        // Router node: classify, then pick the agent set.
        let file_type = input
            .file_type
            .clone()
            .unwrap_or_else(|| classify::detect_file_type(&input.file_path).to_string());
        let agents_to_invoke: Vec<String> = routing::agents_for(&input.file_path, &file_type)
            .into_iter()
            .map(|a| a.to_string())
            .collect();
        let mut state = ReviewState::new(input, file_type, agents_to_invoke);

        info!(
            file = %state.file_path,
            file_type = %state.file_type,
            agents = state.agents_to_invoke.len(),
            "routed review"
        );
        if let Some(tx) = &events {
            let _ = tx.send(ReviewEvent::Router {
                file_path: state.file_path.clone(),
                file_type: state.file_type.clone(),
                agents_to_invoke: state.agents_to_invoke.clone(),
            });
        }

        // Fan out. Every selected agent runs as its own task against a
        // shared read-only view; outcomes come back in completion order.
        let view = Arc::new(state.clone());
        let (tx_outcome, mut rx_outcome) = mpsc::unbounded_channel::<AgentOutcome>();
        let mut dispatched = 0usize;

        for name in &state.agents_to_invoke {
            let Some(agent) = self.agents.get(name) else {
                warn!(agent = %name, "route selected an unregistered agent");
                continue;
            };
            dispatched += 1;

            let agent = agent.clone();
            let view = view.clone();
            let cache = self.cache.clone();
            let key = cache_key(&state.file_path, &state.code, &state.diff, name);
            let timeout = self.settings.agent_timeout;
            let tx = tx_outcome.clone();

            tokio::spawn(async move {
                let outcome = run_agent(agent, view, cache, key, timeout).await;
                let _ = tx.send(outcome);
            });
        }
        drop(tx_outcome);

        // Collect until every dispatched agent has terminated. Each agent
        // writes only its own slot and telemetry entry.
        let mut completed = 0usize;
        while let Some(outcome) = rx_outcome.recv().await {
            completed += 1;
            debug!(
                agent = %outcome.name,
                elapsed = outcome.elapsed_secs,
                cache_hit = outcome.cache_hit,
                error = outcome.error.as_deref().unwrap_or(""),
                "agent terminated"
            );
            if let Some(tx) = &events {
                let _ = tx.send(ReviewEvent::Agent {
                    name: outcome.name.clone(),
                    issues: outcome.issues.clone(),
                    elapsed_secs: outcome.elapsed_secs,
                    error: outcome.error.clone(),
                    cache_hit: outcome.cache_hit,
                });
            }

            state
                .agent_issues
                .insert(outcome.name.clone(), outcome.issues);
            state
                .agent_execution_times
                .insert(outcome.name.clone(), outcome.elapsed_secs);
            if let Some(error) = outcome.error {
                state.agent_errors.insert(outcome.name.clone(), error);
            }
            if outcome.cache_hit {
                state.agent_cache_hits.insert(outcome.name);
            }
        }
        debug_assert_eq!(completed, dispatched);

        // Aggregator node: fuse, score, decide. Concatenation follows the
        // router order so clustering is deterministic.
        state.all_issues = state.collect_all_issues();
        state.deduplicated_issues = dedup::deduplicate(&state.all_issues);
        state.final_score = scoring::weighted_score(&state.deduplicated_issues);
        let verdict = scoring::verdict(state.final_score, &state.deduplicated_issues);
        state.verdict = Some(verdict);
        state.summary = Some(ReviewSummary {
            total_issues: state.deduplicated_issues.len(),
            original_count: state.all_issues.len(),
            duplicates_removed: state.all_issues.len() - state.deduplicated_issues.len(),
            severity_counts: SeverityCounts::tally(&state.deduplicated_issues),
        });

        info!(
            file = %state.file_path,
            score = state.final_score,
            issues = state.deduplicated_issues.len(),
            verdict = %verdict,
            "review complete"
        );
        if let Some(tx) = &events {
            let _ = tx.send(ReviewEvent::Aggregator {
                state: Box::new(state.clone()),
            });
        }

        state
    }

    /// Lazy event sequence for one review: spawns the pipeline and hands
    /// back the receiving end. Finite, terminates after the aggregator
    /// event, not restartable.
    pub fn stream(self: &Arc<Self>, input: ReviewInput) -> mpsc::UnboundedReceiver<ReviewEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            let _ = pipeline.review_with_events(input, Some(tx)).await;
        });
        rx
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

async fn run_agent(
    agent: Arc<dyn ReviewAgent>,
    view: Arc<ReviewState>,
    cache: Option<ResultCache>,
    key: String,
    timeout: Duration,
) -> AgentOutcome {
    let name = agent.name().to_string();
    let start = Instant::now();

    if let Some(cache) = &cache {
        if let Some(entry) = cache.get(&key) {
            info!(agent = %name, "cache hit");
            return AgentOutcome {
                name,
                issues: entry.issues,
                elapsed_secs: round2(start.elapsed().as_secs_f64()),
                error: None,
                cache_hit: true,
            };
        }
    }

    match tokio::time::timeout(timeout, agent.analyze(&view)).await {
        Ok(Ok(issues)) => {
            let elapsed_secs = round2(start.elapsed().as_secs_f64());
            if let Some(cache) = &cache {
                cache.insert(
                    key,
                    CacheEntry {
                        issues: issues.clone(),
                        execution_time: elapsed_secs,
                    },
                );
            }
            AgentOutcome {
                name,
                issues,
                elapsed_secs,
                error: None,
                cache_hit: false,
            }
        }
        Ok(Err(err)) => {
            warn!(agent = %name, error = %err, "agent failed");
            AgentOutcome {
                name,
                issues: Vec::new(),
                elapsed_secs: round2(start.elapsed().as_secs_f64()),
                error: Some(err.to_string()),
                cache_hit: false,
            }
        }
        Err(_) => {
            warn!(agent = %name, timeout_secs = timeout.as_secs_f64(), "agent timed out");
            AgentOutcome {
                name,
                issues: Vec::new(),
                elapsed_secs: round2(start.elapsed().as_secs_f64()),
                error: Some("timeout".to_string()),
                cache_hit: false,
            }
        }
    }
}
