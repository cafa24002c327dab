//! Route a classified file to the set of specialist agents that should
//! look at it. Pure: same `(path, type)` always yields the same list.

use serde::Serialize;

use crate::classify::{
    detect_file_type, is_config_file, is_documentation_file, is_test_file,
};

/// First match wins: documentation, then config, then test, then the
/// language tag. The returned order only matters for stream-event and
/// concatenation ordering, never for the fused result.
pub fn agents_for(file_path: &str, file_type: &str) -> Vec<&'static str> {
    if is_documentation_file(file_path) {
        return vec!["documentation", "style"];
    }

    if is_config_file(file_path) {
        return vec!["security", "documentation", "style"];
    }

    if is_test_file(file_path) {
        return vec!["quality", "testing", "documentation", "style"];
    }

    match file_type {
        "python" | "javascript" | "typescript" | "go" | "rust" | "java" | "ruby" | "php" => vec![
            "security",
            "quality",
            "performance",
            "testing",
            "documentation",
            "style",
        ],
        "sql" => vec!["security", "quality", "performance", "documentation", "style"],
        "html" | "css" | "scss" | "sass" => vec!["quality", "documentation", "style"],
        "shell" => vec!["security", "quality", "documentation", "style"],
        "json" | "yaml" | "toml" | "xml" => vec!["security", "documentation", "style"],
        _ => vec!["security", "quality", "documentation", "style"],
    }
}

/// Routing decisions for a path, for debugging and the `route` subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingSummary {
    pub file_path: String,
    pub file_type: String,
    pub is_test: bool,
    pub is_config: bool,
    pub is_documentation: bool,
    pub agents_to_invoke: Vec<String>,
}

pub fn routing_summary(file_path: &str) -> RoutingSummary {
    let file_type = detect_file_type(file_path);
    let agents = agents_for(file_path, file_type);
    RoutingSummary {
        file_path: file_path.to_string(),
        file_type: file_type.to_string(),
        is_test: is_test_file(file_path),
        is_config: is_config_file(file_path),
        is_documentation: is_documentation_file(file_path),
        agents_to_invoke: agents.iter().map(|a| a.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_files_get_all_six() {
        for path in ["src/app.py", "lib/util.ts", "pkg/main.go", "src/lib.rs"] {
            let agents = agents_for(path, detect_file_type(path));
            assert_eq!(
                agents,
                vec!["security", "quality", "performance", "testing", "documentation", "style"],
                "path {path}"
            );
        }
    }

    #[test]
    fn category_precedence_over_language() {
        // Documentation wins over everything.
        assert_eq!(
            agents_for("docs/README.md", "markdown"),
            vec!["documentation", "style"]
        );
        // A python file under config naming is reviewed as config.
        assert_eq!(
            agents_for("settings.py", "python"),
            vec!["security", "documentation", "style"]
        );
        // Test naming beats the language route.
        assert_eq!(
            agents_for("tests/test_auth.py", "python"),
            vec!["quality", "testing", "documentation", "style"]
        );
    }

    #[test]
    fn per_type_routes() {
        assert_eq!(
            agents_for("schema/init.sql", "sql"),
            vec!["security", "quality", "performance", "documentation", "style"]
        );
        assert_eq!(
            agents_for("web/site.css", "css"),
            vec!["quality", "documentation", "style"]
        );
        assert_eq!(
            agents_for("run.sh", "shell"),
            vec!["security", "quality", "documentation", "style"]
        );
        assert_eq!(
            agents_for("data.xml", "xml"),
            vec!["security", "documentation", "style"]
        );
        assert_eq!(
            agents_for("mystery.bin", "unknown"),
            vec!["security", "quality", "documentation", "style"]
        );
    }

    #[test]
    fn routing_is_pure() {
        let a = agents_for("src/app.py", "python");
        let b = agents_for("src/app.py", "python");
        assert_eq!(a, b);
    }

    #[test]
    fn summary_reflects_predicates() {
        let summary = routing_summary("tests/test_auth.py");
        assert!(summary.is_test);
        assert!(!summary.is_documentation);
        assert_eq!(summary.file_type, "python");
        assert_eq!(summary.agents_to_invoke.len(), 4);
    }
}
