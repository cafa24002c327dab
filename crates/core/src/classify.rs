//! File-type classification: map a path to a language tag and detect
//! test, config, and documentation files from naming patterns.

use std::path::Path;

const TEST_FILE_PATTERNS: &[&str] = &["test_", "_test.", ".test.", ".spec.", "tests/", "/test/"];

const CONFIG_FILE_PATTERNS: &[&str] = &[
    "config",
    "settings",
    ".env",
    "dockerfile",
    "docker-compose",
    "requirements",
    "package.json",
    "tsconfig",
    "webpack",
    "babel",
    "eslint",
    "pytest",
    "setup.",
    "pyproject.toml",
];

const DOC_FILE_PATTERNS: &[&str] = &[
    "readme",
    "changelog",
    "license",
    "contributing",
    "docs/",
    "/doc/",
];

/// Deterministic extension → language tag mapping. Unknown extensions
/// (and extension-less paths) come back as "unknown".
pub fn detect_file_type(file_path: &str) -> &'static str {
    let ext = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "py" | "pyi" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "ini" => "ini",
        "cfg" | "conf" => "config",
        "env" => "env",
        "md" => "markdown",
        "rst" => "restructuredtext",
        "txt" => "text",
        "sql" => "sql",
        "sh" | "bash" | "zsh" => "shell",
        "xml" => "xml",
        "go" => "go",
        "rs" => "rust",
        "java" => "java",
        "rb" => "ruby",
        "php" => "php",
        _ => "unknown",
    }
}

fn matches_any(file_path: &str, patterns: &[&str]) -> bool {
    let lower = file_path.to_lowercase();
    patterns.iter().any(|p| lower.contains(p))
}

pub fn is_test_file(file_path: &str) -> bool {
    matches_any(file_path, TEST_FILE_PATTERNS)
}

pub fn is_config_file(file_path: &str) -> bool {
    matches_any(file_path, CONFIG_FILE_PATTERNS)
}

/// Documentation means a markdown/restructuredtext/text file whose path
/// also looks like docs. A README.py is not documentation.
pub fn is_documentation_file(file_path: &str) -> bool {
    matches!(
        detect_file_type(file_path),
        "markdown" | "restructuredtext" | "text"
    ) && matches_any(file_path, DOC_FILE_PATTERNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(detect_file_type("src/app.py"), "python");
        assert_eq!(detect_file_type("lib/Index.JSX"), "javascript");
        assert_eq!(detect_file_type("web/main.tsx"), "typescript");
        assert_eq!(detect_file_type("migrate.sql"), "sql");
        assert_eq!(detect_file_type("deploy.bash"), "shell");
        assert_eq!(detect_file_type("src/lib.rs"), "rust");
        assert_eq!(detect_file_type("notes.md"), "markdown");
        assert_eq!(detect_file_type("values.yml"), "yaml");
        assert_eq!(detect_file_type("app.conf"), "config");
        assert_eq!(detect_file_type("Makefile"), "unknown");
        assert_eq!(detect_file_type("bin/run"), "unknown");
    }

    #[test]
    fn test_file_patterns() {
        assert!(is_test_file("tests/routing.rs"));
        assert!(is_test_file("src/test_login.py"));
        assert!(is_test_file("app/user_test.go"));
        assert!(is_test_file("ui/Button.spec.tsx"));
        assert!(is_test_file("SRC/TEST_CAPS.PY"));
        assert!(!is_test_file("src/contest.py"));
    }

    #[test]
    fn config_file_patterns() {
        assert!(is_config_file("config/database.yml"));
        assert!(is_config_file("Dockerfile"));
        assert!(is_config_file("frontend/package.json"));
        assert!(is_config_file("pyproject.toml"));
        assert!(is_config_file(".env.production"));
        assert!(!is_config_file("src/main.py"));
    }

    #[test]
    fn documentation_needs_type_and_pattern() {
        assert!(is_documentation_file("README.md"));
        assert!(is_documentation_file("docs/guide.txt"));
        assert!(is_documentation_file("CHANGELOG.rst"));
        // Right name, wrong type.
        assert!(!is_documentation_file("readme.py"));
        // Right type, wrong name.
        assert!(!is_documentation_file("notes.md"));
    }
}
