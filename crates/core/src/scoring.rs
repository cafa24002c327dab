//! Weighted scoring of fused issues and the final verdict ladder.

use quorum_provider::{Issue, Severity};

use crate::state::Verdict;

/// Score past which a review is rejected outright.
const REJECT_SCORE_THRESHOLD: f64 = 15.0;
/// Score past which a review at least warrants comments.
const COMMENT_SCORE_THRESHOLD: f64 = 5.0;

pub fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 10.0,
        Severity::High => 5.0,
        Severity::Medium => 2.0,
        Severity::Low => 1.0,
        Severity::Info => 0.5,
    }
}

pub fn agent_weight(agent: &str) -> f64 {
    match agent {
        "security" => 2.0,
        "quality" => 1.5,
        "performance" => 1.3,
        "testing" => 1.2,
        "documentation" => 1.0,
        "style" => 0.5,
        _ => 1.0,
    }
}

fn issue_score(issue: &Issue) -> f64 {
    let best_agent_weight = if issue.agents.is_empty() {
        agent_weight(&issue.agent)
    } else {
        issue
            .agents
            .iter()
            .map(|a| agent_weight(a))
            .fold(f64::MIN, f64::max)
    };
    severity_weight(issue.severity) * best_agent_weight * issue.confidence
}

/// Sum of per-issue scores, rounded to two decimal places.
pub fn weighted_score(issues: &[Issue]) -> f64 {
    let score: f64 = issues.iter().map(issue_score).sum();
    (score * 100.0).round() / 100.0
}

/// First rule that fires wins: critical → reject, score > 15 → reject,
/// high → comment, score > 5 → comment, otherwise approve.
pub fn verdict(score: f64, issues: &[Issue]) -> Verdict {
    if issues.iter().any(|i| i.severity == Severity::Critical) {
        return Verdict::Reject;
    }
    if score > REJECT_SCORE_THRESHOLD {
        return Verdict::Reject;
    }
    if issues.iter().any(|i| i.severity == Severity::High) {
        return Verdict::Comment;
    }
    if score > COMMENT_SCORE_THRESHOLD {
        return Verdict::Comment;
    }
    Verdict::Approve
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_provider::IssueKind;

    fn issue(agent: &str, kind: IssueKind, severity: Severity) -> Issue {
        let mut issue = Issue::new(kind, severity, "finding");
        issue.agent = agent.to_string();
        issue
    }

    #[test]
    fn critical_security_scores_twenty_and_rejects() {
        let issues = vec![issue("security", IssueKind::Security, Severity::Critical)];
        let score = weighted_score(&issues);
        assert_eq!(score, 20.0);
        assert_eq!(verdict(score, &issues), Verdict::Reject);
    }

    #[test]
    fn two_medium_quality_issues_comment_on_score() {
        let issues = vec![
            issue("quality", IssueKind::Quality, Severity::Medium),
            issue("quality", IssueKind::Quality, Severity::Medium),
        ];
        let score = weighted_score(&issues);
        assert_eq!(score, 6.0);
        assert_eq!(verdict(score, &issues), Verdict::Comment);
    }

    #[test]
    fn lone_info_style_issue_approves() {
        let issues = vec![issue("style", IssueKind::Style, Severity::Info)];
        let score = weighted_score(&issues);
        assert_eq!(score, 0.25);
        assert_eq!(verdict(score, &issues), Verdict::Approve);
    }

    #[test]
    fn high_severity_comments_even_at_low_score() {
        let issues = vec![issue("style", IssueKind::Style, Severity::High)];
        let score = weighted_score(&issues);
        assert_eq!(score, 2.5);
        assert_eq!(verdict(score, &issues), Verdict::Comment);
    }

    #[test]
    fn merged_issue_uses_best_agent_weight() {
        let mut merged = issue("quality", IssueKind::Quality, Severity::Medium);
        merged.agents = vec!["quality".into(), "security".into()];
        assert_eq!(weighted_score(&[merged]), 4.0);
    }

    #[test]
    fn confidence_scales_score() {
        let mut i = issue("security", IssueKind::Security, Severity::High);
        i.confidence = 0.5;
        assert_eq!(weighted_score(&[i]), 5.0);
    }

    #[test]
    fn empty_input_is_a_clean_approve() {
        let score = weighted_score(&[]);
        assert_eq!(score, 0.0);
        assert_eq!(verdict(score, &[]), Verdict::Approve);
    }

    #[test]
    fn accumulated_score_can_reject_without_criticals() {
        let issues: Vec<Issue> = (0..4)
            .map(|_| issue("security", IssueKind::Security, Severity::High))
            .collect();
        let score = weighted_score(&issues);
        assert_eq!(score, 40.0);
        assert_eq!(verdict(score, &issues), Verdict::Reject);
    }
}
