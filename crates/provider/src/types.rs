use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Security,
    Quality,
    Performance,
    Testing,
    Documentation,
    Style,
    Bug,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IssueKind::Security => "security",
            IssueKind::Quality => "quality",
            IssueKind::Performance => "performance",
            IssueKind::Testing => "testing",
            IssueKind::Documentation => "documentation",
            IssueKind::Style => "style",
            IssueKind::Bug => "bug",
        };
        write!(f, "{s}")
    }
}

/// Ordered least to most severe, so `Ord` gives "max severity" directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

fn default_confidence() -> f64 {
    1.0
}

fn default_duplicate_count() -> usize {
    1
}

/// A single finding, as produced by a specialist and carried through fusion.
///
/// The `agents`, `duplicate_count`, and `related` fields stay at their
/// defaults until the deduplicator merges a cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type", alias = "kind")]
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(default)]
    pub line_number: Option<u32>,
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub code_snippet: Option<String>,
    /// Name of the producing agent, stamped on emission.
    #[serde(default)]
    pub agent: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Every agent that reported this issue (set by the deduplicator).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
    /// Size of the cluster this issue was merged from.
    #[serde(default = "default_duplicate_count")]
    pub duplicate_count: usize,
    /// Near-duplicate descriptions suppressed during the merge.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl Issue {
    pub fn new(kind: IssueKind, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            line_number: None,
            description: description.into(),
            suggestion: String::new(),
            code_snippet: None,
            agent: String::new(),
            confidence: default_confidence(),
            agents: Vec::new(),
            duplicate_count: default_duplicate_count(),
            related: Vec::new(),
        }
    }
}

/// Structured model output. `issues` is mandatory: a reply without it does
/// not deserialize and surfaces as a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPayload {
    pub issues: Vec<Issue>,
    #[serde(default)]
    pub summary: String,
}

/// Everything a gateway call needs: the role prompt plus the template
/// variables every specialist shares.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub system_prompt: String,
    pub file_path: String,
    pub file_type: String,
    pub code: String,
    pub diff: String,
}
