//! Progress events emitted as pipeline nodes complete. The router event
//! is always first, agent events arrive in completion order, and the
//! aggregator event terminates the sequence.

use quorum_provider::Issue;

use crate::state::ReviewState;

#[derive(Debug, Clone)]
pub enum ReviewEvent {
    Router {
        file_path: String,
        file_type: String,
        agents_to_invoke: Vec<String>,
    },
    Agent {
        name: String,
        issues: Vec<Issue>,
        elapsed_secs: f64,
        error: Option<String>,
        cache_hit: bool,
    },
    Aggregator {
        state: Box<ReviewState>,
    },
}

impl ReviewEvent {
    pub fn node(&self) -> &str {
        match self {
            ReviewEvent::Router { .. } => "router",
            ReviewEvent::Agent { name, .. } => name,
            ReviewEvent::Aggregator { .. } => "aggregator",
        }
    }
}
