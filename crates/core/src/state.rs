//! The record threaded through the review pipeline. The pipeline driver is
//! the sole writer; agents only ever see a read-only view and hand their
//! results back over a channel.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use quorum_provider::{Issue, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
            ChangeType::Renamed => "renamed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Approve,
    Comment,
    Reject,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Approve => "approve",
            Verdict::Comment => "comment",
            Verdict::Reject => "reject",
        };
        write!(f, "{s}")
    }
}

/// What the caller hands the pipeline. `file_type` may be left out, in
/// which case the classifier computes it.
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub file_path: String,
    pub file_type: Option<String>,
    pub code: String,
    pub diff: String,
    pub change_type: ChangeType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn tally(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Critical => counts.critical += 1,
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
                Severity::Info => counts.info += 1,
            }
        }
        counts
    }
}

/// Aggregation statistics attached to the state by the final fusion step.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub total_issues: usize,
    pub original_count: usize,
    pub duplicates_removed: usize,
    pub severity_counts: SeverityCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewState {
    pub file_path: String,
    pub file_type: String,
    pub code: String,
    pub diff: String,
    pub change_type: ChangeType,

    /// Set once by the router; read-only afterwards.
    pub agents_to_invoke: Vec<String>,

    /// One slot per terminated agent. An errored agent still gets a slot,
    /// holding an empty list.
    pub agent_issues: BTreeMap<String, Vec<Issue>>,
    /// Wall-clock seconds per agent, rounded to two decimals.
    pub agent_execution_times: BTreeMap<String, f64>,
    /// Terminal error message per failed agent.
    pub agent_errors: BTreeMap<String, String>,
    /// Agents whose result came out of the cache.
    pub agent_cache_hits: BTreeSet<String>,

    pub all_issues: Vec<Issue>,
    pub deduplicated_issues: Vec<Issue>,
    pub final_score: f64,
    pub verdict: Option<Verdict>,
    pub summary: Option<ReviewSummary>,
}

impl ReviewState {
    pub fn new(input: ReviewInput, file_type: String, agents_to_invoke: Vec<String>) -> Self {
        Self {
            file_path: input.file_path,
            file_type,
            code: input.code,
            diff: input.diff,
            change_type: input.change_type,
            agents_to_invoke,
            agent_issues: BTreeMap::new(),
            agent_execution_times: BTreeMap::new(),
            agent_errors: BTreeMap::new(),
            agent_cache_hits: BTreeSet::new(),
            all_issues: Vec::new(),
            deduplicated_issues: Vec::new(),
            final_score: 0.0,
            verdict: None,
            summary: None,
        }
    }

    /// All agent issues concatenated in the router's invocation order, so
    /// the downstream clustering walk is deterministic for equal inputs.
    pub fn collect_all_issues(&self) -> Vec<Issue> {
        let mut all = Vec::new();
        for agent in &self.agents_to_invoke {
            if let Some(issues) = self.agent_issues.get(agent) {
                all.extend(issues.iter().cloned());
            }
        }
        all
    }

    pub fn has_critical_issues(&self) -> bool {
        self.deduplicated_issues
            .iter()
            .any(|i| i.severity == Severity::Critical)
    }
}
