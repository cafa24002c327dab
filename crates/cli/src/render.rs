//! Human rendering of finished reviews: a per-file summary table, the
//! fused issues, and a closing verdict banner.

use quorum_core::state::{ReviewState, Verdict};
use quorum_provider::Severity;

pub fn render_results(states: &[ReviewState]) {
    if states.is_empty() {
        return;
    }

    println!();
    println!("=== Review results ===");
    println!();

    for state in states {
        let verdict = verdict_label(state.verdict);
        println!(
            "{:<40} score {:>6.2}  issues {:>3}  {verdict}",
            state.file_path,
            state.final_score,
            state.deduplicated_issues.len(),
        );
    }

    for state in states {
        if state.deduplicated_issues.is_empty() && state.agent_errors.is_empty() {
            continue;
        }
        println!();
        println!("--- {} ---", state.file_path);

        if let Some(summary) = &state.summary {
            if summary.duplicates_removed > 0 {
                println!(
                    "{} issue(s) from {} finding(s), {} duplicate(s) merged",
                    summary.total_issues, summary.original_count, summary.duplicates_removed
                );
            }
        }
        for (agent, error) in &state.agent_errors {
            println!("[agent {agent} failed: {error}]");
        }

        for (index, issue) in state.deduplicated_issues.iter().enumerate() {
            let line = issue
                .line_number
                .map(|l| format!(" line {l}"))
                .unwrap_or_default();
            println!();
            println!(
                "{}. [{}] {}{} ({})",
                index + 1,
                severity_label(issue.severity),
                issue.kind,
                line,
                issue.agents.join(", "),
            );
            println!("   {}", issue.description);
            if !issue.related.is_empty() {
                for related in &issue.related {
                    println!("   related: {related}");
                }
            }
            if !issue.suggestion.is_empty() {
                println!("   fix: {}", issue.suggestion);
            }
            if let Some(snippet) = &issue.code_snippet {
                println!("   code: {snippet}");
            }
        }
    }

    println!();
    let worst = states
        .iter()
        .filter_map(|s| s.verdict)
        .max_by_key(|v| match v {
            Verdict::Approve => 0,
            Verdict::Comment => 1,
            Verdict::Reject => 2,
        });
    match worst {
        Some(Verdict::Reject) => {
            println!("REVIEW FAILED: at least one file was rejected.");
        }
        Some(Verdict::Comment) => {
            println!("Review passed with comments. Consider addressing them before committing.");
        }
        _ => {
            println!("Review passed. No blocking issues found.");
        }
    }
}

fn verdict_label(verdict: Option<Verdict>) -> &'static str {
    match verdict {
        Some(Verdict::Approve) => "APPROVE",
        Some(Verdict::Comment) => "COMMENT",
        Some(Verdict::Reject) => "REJECT",
        None => "UNKNOWN",
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CRITICAL",
        Severity::High => "HIGH",
        Severity::Medium => "MEDIUM",
        Severity::Low => "LOW",
        Severity::Info => "INFO",
    }
}
