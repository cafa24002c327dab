//! The agent contract and the built-in specialists: a fixed role prompt,
//! a gateway call with bounded retry, and attribution of every finding.

pub mod roles;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use quorum_config::RetrySettings;
use quorum_provider::{Gateway, GatewayError, Issue, ReviewRequest};

use crate::state::ReviewState;

/// What the scheduler dispatches. Implementations must be pure over the
/// state view they are given: read anything, write nothing.
#[async_trait]
pub trait ReviewAgent: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, state: &ReviewState) -> Result<Vec<Issue>, GatewayError>;
}

/// A role prompt bound to a gateway. All six built-in specialists share
/// this implementation; only the role differs.
pub struct SpecialistAgent {
    role: &'static roles::RoleSpec,
    gateway: Arc<dyn Gateway>,
    retry: RetrySettings,
}

impl SpecialistAgent {
    pub fn new(
        role: &'static roles::RoleSpec,
        gateway: Arc<dyn Gateway>,
        retry: RetrySettings,
    ) -> Self {
        Self {
            role,
            gateway,
            retry,
        }
    }

    fn request_for(&self, state: &ReviewState) -> ReviewRequest {
        ReviewRequest {
            system_prompt: self.role.system_prompt.to_string(),
            file_path: state.file_path.clone(),
            file_type: state.file_type.clone(),
            code: state.code.clone(),
            diff: state.diff.clone(),
        }
    }
}

#[async_trait]
impl ReviewAgent for SpecialistAgent {
    fn name(&self) -> &str {
        self.role.name
    }

    async fn analyze(&self, state: &ReviewState) -> Result<Vec<Issue>, GatewayError> {
        let request = self.request_for(state);
        let mut attempt: u32 = 0;

        loop {
            match self.gateway.review(&request).await {
                Ok(payload) => {
                    let mut issues = payload.issues;
                    for issue in &mut issues {
                        issue.agent = self.role.name.to_string();
                    }
                    return Ok(issues);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(
                        agent = self.role.name,
                        attempt,
                        max = self.retry.max_retries,
                        error = %err,
                        "gateway call failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.retry.retry_delay_ms)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// The full roster, one specialist per built-in role, in roster order.
pub fn builtin_agents(
    gateway: Arc<dyn Gateway>,
    retry: RetrySettings,
) -> Vec<Arc<dyn ReviewAgent>> {
    roles::ROLES
        .iter()
        .map(|role| {
            Arc::new(SpecialistAgent::new(role, gateway.clone(), retry.clone()))
                as Arc<dyn ReviewAgent>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use quorum_provider::{IssueKind, ReviewPayload, Severity};

    use crate::state::{ChangeType, ReviewInput};

    struct ScriptedGateway {
        calls: AtomicUsize,
        fail_first: usize,
        retryable: bool,
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn review(&self, _request: &ReviewRequest) -> Result<ReviewPayload, GatewayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                if self.retryable {
                    return Err(GatewayError::Transport("connection reset".into()));
                }
                return Err(GatewayError::Config("bad key".into()));
            }
            Ok(ReviewPayload {
                issues: vec![Issue::new(
                    IssueKind::Security,
                    Severity::High,
                    "hardcoded secret",
                )],
                summary: String::new(),
            })
        }
    }

    fn state() -> ReviewState {
        ReviewState::new(
            ReviewInput {
                file_path: "src/app.py".into(),
                file_type: None,
                code: "PASSWORD = \"hunter2\"".into(),
                diff: String::new(),
                change_type: ChangeType::Modified,
            },
            "python".into(),
            vec!["security".into()],
        )
    }

    fn fast_retry() -> RetrySettings {
        RetrySettings {
            max_retries: 2,
            retry_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn stamps_agent_name_on_issues() {
        let gateway = Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            retryable: true,
        });
        let agent = SpecialistAgent::new(
            roles::find_role("security").unwrap(),
            gateway,
            fast_retry(),
        );
        let issues = agent.analyze(&state()).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].agent, "security");
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let gateway = Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            fail_first: 2,
            retryable: true,
        });
        let agent = SpecialistAgent::new(
            roles::find_role("quality").unwrap(),
            gateway.clone(),
            fast_retry(),
        );
        let issues = agent.analyze(&state()).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_the_error() {
        let gateway = Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            fail_first: 10,
            retryable: true,
        });
        let agent = SpecialistAgent::new(
            roles::find_role("style").unwrap(),
            gateway.clone(),
            fast_retry(),
        );
        assert!(agent.analyze(&state()).await.is_err());
        // One initial call plus two retries.
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let gateway = Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            fail_first: 10,
            retryable: false,
        });
        let agent = SpecialistAgent::new(
            roles::find_role("testing").unwrap(),
            gateway.clone(),
            fast_retry(),
        );
        assert!(agent.analyze(&state()).await.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn builtin_roster_covers_all_roles() {
        let gateway = Arc::new(ScriptedGateway {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            retryable: true,
        });
        let agents = builtin_agents(gateway, fast_retry());
        let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec!["security", "quality", "performance", "testing", "documentation", "style"]
        );
    }
}
