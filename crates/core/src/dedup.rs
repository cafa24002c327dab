//! Fuzzy deduplication of findings across agents: cluster similar issues,
//! then merge each cluster into one fused issue.

use std::collections::BTreeSet;

use similar::TextDiff;

use quorum_provider::Issue;

/// Issues this many lines apart (or closer) count as the same finding.
const LINE_RANGE: u32 = 5;
/// Description similarity above this ratio means "same finding" for
/// line-less issues, and "same wording" when joining descriptions.
const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Ratcliff/Obershelp-style ratio over lowercased characters, in [0, 1].
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    TextDiff::from_chars(a.as_str(), b.as_str()).ratio() as f64
}

fn issues_similar(a: &Issue, b: &Issue) -> bool {
    match (a.line_number, b.line_number) {
        (Some(la), Some(lb)) => la.abs_diff(lb) <= LINE_RANGE,
        (None, None) => text_similarity(&a.description, &b.description) > SIMILARITY_THRESHOLD,
        _ => false,
    }
}

/// Greedy, transitive clustering in first-occurrence order. The walk
/// expands through every member of the growing cluster, so `a~b` and
/// `b~c` land all three together even when `a` and `c` are not similar.
pub fn deduplicate(all_issues: &[Issue]) -> Vec<Issue> {
    if all_issues.is_empty() {
        return Vec::new();
    }

    let mut processed = vec![false; all_issues.len()];
    let mut deduplicated = Vec::new();

    for seed in 0..all_issues.len() {
        if processed[seed] {
            continue;
        }
        processed[seed] = true;

        let mut cluster = vec![seed];
        let mut frontier = 0;
        while frontier < cluster.len() {
            let anchor = cluster[frontier];
            for candidate in seed + 1..all_issues.len() {
                if processed[candidate] {
                    continue;
                }
                if issues_similar(&all_issues[anchor], &all_issues[candidate]) {
                    processed[candidate] = true;
                    cluster.push(candidate);
                }
            }
            frontier += 1;
        }

        let members: Vec<&Issue> = cluster.iter().map(|&i| &all_issues[i]).collect();
        deduplicated.push(merge_cluster(&members));
    }

    deduplicated
}

/// Merge one cluster into a single fused issue. The highest-severity
/// member is the base; ties keep first occurrence.
fn merge_cluster(cluster: &[&Issue]) -> Issue {
    let mut sorted: Vec<&Issue> = cluster.to_vec();
    sorted.sort_by(|a, b| b.severity.cmp(&a.severity));

    let mut merged = sorted[0].clone();

    let mut agents: BTreeSet<String> = BTreeSet::new();
    for issue in cluster {
        if !issue.agent.is_empty() {
            agents.insert(issue.agent.clone());
        }
        for agent in &issue.agents {
            agents.insert(agent.clone());
        }
    }
    merged.agents = agents.into_iter().collect();

    if sorted.len() > 1 {
        let mut descriptions: Vec<String> = Vec::new();
        let mut related: Vec<String> = Vec::new();
        for issue in &sorted {
            let desc = issue.description.trim();
            if desc.is_empty() {
                continue;
            }
            let duplicate = descriptions
                .iter()
                .any(|seen| text_similarity(desc, seen) > SIMILARITY_THRESHOLD);
            if duplicate {
                related.push(desc.to_string());
            } else {
                descriptions.push(desc.to_string());
            }
        }
        if !descriptions.is_empty() {
            merged.description = descriptions.join(" | ");
        }
        merged.related = related;

        if let Some(longest) = sorted
            .iter()
            .map(|i| i.suggestion.as_str())
            .filter(|s| !s.is_empty())
            .fold(None::<&str>, |best, s| match best {
                Some(b) if b.len() >= s.len() => Some(b),
                _ => Some(s),
            })
        {
            merged.suggestion = longest.to_string();
        }

        let mean_confidence: f64 =
            cluster.iter().map(|i| i.confidence).sum::<f64>() / cluster.len() as f64;
        let boosted = mean_confidence * (1.0 + 0.1 * (cluster.len() as f64 - 1.0));
        merged.confidence = boosted.min(1.0);
    }

    merged.duplicate_count = cluster.len();
    merged
}
