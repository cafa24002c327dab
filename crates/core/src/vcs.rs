//! Version-control collaborator: discover changed files via `git`, parse
//! unified diffs into per-file changes, and extract context windows
//! around changed lines for review.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::state::ChangeType;

/// Lines of surrounding code included on each side of a changed line.
pub const DEFAULT_CONTEXT_LINES: usize = 10;

/// Cap on whole-file reads when no specific lines are requested.
const MAX_WHOLE_FILE_LINES: usize = 500;

#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    pub file_path: String,
    pub change_type: ChangeType,
    pub diff: String,
    /// 1-based line numbers added on the new side.
    pub added_lines: Vec<u32>,
    /// 1-based line numbers removed from the old side.
    pub removed_lines: Vec<u32>,
}

impl FileChange {
    pub fn has_changes(&self) -> bool {
        !self.added_lines.is_empty() || !self.removed_lines.is_empty()
    }

    pub fn lines_changed(&self) -> usize {
        self.added_lines.len() + self.removed_lines.len()
    }
}

pub struct GitRepository {
    root: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path`, erroring outside a work tree.
    pub fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()
            .context("failed to run git")?;
        if !output.status.success() {
            bail!("not a git repository: {}", path.display());
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Wrap an existing work-tree root without validating it.
    pub fn at(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {} failed: {}", args.join(" "), stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Files staged for commit, with their patches.
    pub fn staged_changes(&self) -> Result<Vec<FileChange>> {
        let patch = self.run_git(&["diff", "--cached", "--no-color"])?;
        let changes = parse_patch(&patch);
        debug!(count = changes.len(), "staged changes");
        Ok(changes)
    }

    /// Files with unstaged modifications.
    pub fn unstaged_changes(&self) -> Result<Vec<FileChange>> {
        let patch = self.run_git(&["diff", "--no-color"])?;
        Ok(parse_patch(&patch))
    }

    pub fn full_file_content(&self, file_path: &str) -> Result<String> {
        let full_path = self.root.join(file_path);
        std::fs::read_to_string(&full_path)
            .with_context(|| format!("failed to read {}", full_path.display()))
    }

    /// A numbered window of the file around the given 1-based lines,
    /// padded by `context_lines` on each side. With no lines, the head of
    /// the file is returned instead.
    pub fn content_with_context(
        &self,
        file_path: &str,
        line_numbers: &[u32],
        context_lines: usize,
    ) -> Result<String> {
        let content = self.full_file_content(file_path)?;
        let lines: Vec<&str> = content.lines().collect();

        if line_numbers.is_empty() {
            return Ok(lines
                .iter()
                .take(MAX_WHOLE_FILE_LINES)
                .copied()
                .collect::<Vec<_>>()
                .join("\n"));
        }

        let min = line_numbers.iter().min().copied().unwrap_or(1) as usize;
        let max = line_numbers.iter().max().copied().unwrap_or(1) as usize;
        let first = min.saturating_sub(context_lines).max(1);
        let last = (max + context_lines).min(lines.len());

        let numbered: Vec<String> = (first..=last)
            .filter_map(|n| lines.get(n - 1).map(|line| format!("{n:4} | {line}")))
            .collect();
        Ok(numbered.join("\n"))
    }
}

/// Split a combined `git diff` output into per-file changes. Binary
/// patches are skipped.
pub fn parse_patch(patch: &str) -> Vec<FileChange> {
    let mut changes = Vec::new();

    let mut sections: Vec<&str> = Vec::new();
    let mut start = None;
    for (offset, _) in patch.match_indices("diff --git ") {
        // Only split on headers at the start of a line.
        if offset != 0 && patch.as_bytes()[offset - 1] != b'\n' {
            continue;
        }
        if let Some(s) = start {
            sections.push(&patch[s..offset]);
        }
        start = Some(offset);
    }
    if let Some(s) = start {
        sections.push(&patch[s..]);
    }

    for section in sections {
        if let Some(change) = parse_file_section(section) {
            changes.push(change);
        }
    }
    changes
}

fn parse_file_section(section: &str) -> Option<FileChange> {
    let header = section.lines().next()?;

    let mut change_type = ChangeType::Modified;
    let mut old_path: Option<String> = None;
    let mut new_path: Option<String> = None;

    for line in section.lines().take_while(|l| !l.starts_with("@@ ")) {
        if line.starts_with("new file mode") {
            change_type = ChangeType::Added;
        } else if line.starts_with("deleted file mode") {
            change_type = ChangeType::Deleted;
        } else if line.starts_with("rename from") {
            change_type = ChangeType::Renamed;
        } else if let Some(rest) = line.strip_prefix("--- a/") {
            old_path = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("+++ b/") {
            new_path = Some(rest.to_string());
        } else if line.starts_with("Binary files ") {
            return None;
        }
    }

    let file_path = match change_type {
        ChangeType::Deleted => old_path.or_else(|| header_path(header, 'a')),
        _ => new_path
            .or_else(|| header_path(header, 'b'))
            .or(old_path),
    }?;

    let (added_lines, removed_lines) = parse_diff_lines(section);

    Some(FileChange {
        file_path,
        change_type,
        diff: section.to_string(),
        added_lines,
        removed_lines,
    })
}

/// Pull a path out of a `diff --git a/x b/y` header line.
fn header_path(header: &str, side: char) -> Option<String> {
    let marker = format!(" {side}/");
    let start = header.find(&marker)? + marker.len();
    let rest = &header[start..];
    let end = match side {
        'a' => rest.find(" b/").unwrap_or(rest.len()),
        _ => rest.len(),
    };
    let path = rest[..end].trim();
    (!path.is_empty()).then(|| path.to_string())
}

/// Walk a unified diff and collect the 1-based line numbers of added and
/// removed lines, tracking positions from the hunk headers.
pub fn parse_diff_lines(diff: &str) -> (Vec<u32>, Vec<u32>) {
    let hunk_re = Regex::new(r"^@@ -(\d+)(?:,\d+)? \+(\d+)(?:,\d+)? @@").unwrap();

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut old_line: u32 = 0;
    let mut new_line: u32 = 0;
    let mut in_hunk = false;

    for line in diff.lines() {
        if let Some(caps) = hunk_re.captures(line) {
            old_line = caps[1].parse().unwrap_or(0);
            new_line = caps[2].parse().unwrap_or(0);
            in_hunk = true;
            continue;
        }
        if !in_hunk
            || line.starts_with("---")
            || line.starts_with("+++")
            || line.starts_with("diff ")
        {
            continue;
        }

        if line.starts_with('+') {
            added.push(new_line);
            new_line += 1;
        } else if line.starts_with('-') {
            removed.push(old_line);
            old_line += 1;
        } else {
            old_line += 1;
            new_line += 1;
        }
    }

    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PATCH: &str = "\
diff --git a/src/auth.py b/src/auth.py
index 3f1a2b4..9c8d7e6 100644
--- a/src/auth.py
+++ b/src/auth.py
@@ -10,4 +10,5 @@ def login(username, password):
 context line
-    query = build(username)
+    query = f\"SELECT * FROM users WHERE name='{username}'\"
+    audit(username)
 return db.execute(query)
diff --git a/docs/notes.md b/docs/notes.md
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/docs/notes.md
@@ -0,0 +1,2 @@
+# Notes
+First draft.
diff --git a/old/dead.py b/old/dead.py
deleted file mode 100644
index 5d41402..0000000
--- a/old/dead.py
+++ /dev/null
@@ -1,1 +0,0 @@
-print(\"gone\")
diff --git a/assets/logo.png b/assets/logo.png
index 1111111..2222222 100644
Binary files a/assets/logo.png and b/assets/logo.png differ
";

    #[test]
    fn parse_patch_splits_files_and_change_types() {
        let changes = parse_patch(SAMPLE_PATCH);
        assert_eq!(changes.len(), 3);

        assert_eq!(changes[0].file_path, "src/auth.py");
        assert_eq!(changes[0].change_type, ChangeType::Modified);
        assert!(changes[0].has_changes());

        assert_eq!(changes[1].file_path, "docs/notes.md");
        assert_eq!(changes[1].change_type, ChangeType::Added);
        assert_eq!(changes[1].added_lines, vec![1, 2]);

        assert_eq!(changes[2].file_path, "old/dead.py");
        assert_eq!(changes[2].change_type, ChangeType::Deleted);
        assert_eq!(changes[2].removed_lines, vec![1]);
    }

    #[test]
    fn diff_line_numbers_track_hunk_positions() {
        let (added, removed) = parse_diff_lines(
            "--- a/f\n+++ b/f\n@@ -10,4 +10,5 @@\n context\n-removed\n+added one\n+added two\n context\n",
        );
        // Hunk starts both sides at 10; the context line advances to 11.
        assert_eq!(removed, vec![11]);
        assert_eq!(added, vec![11, 12]);
    }

    #[test]
    fn multiple_hunks_reset_counters() {
        let (added, removed) = parse_diff_lines(
            "@@ -1,2 +1,2 @@\n-old\n+new\n context\n@@ -40 +40,2 @@\n context\n+tail\n",
        );
        assert_eq!(removed, vec![1]);
        assert_eq!(added, vec![1, 41]);
    }

    #[test]
    fn empty_patch_yields_nothing() {
        assert!(parse_patch("").is_empty());
        assert!(parse_patch("\n").is_empty());
    }

    #[test]
    fn context_window_is_numbered_and_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let content: String = (1..=40).map(|i| format!("line {i}\n")).collect();
        std::fs::write(dir.path().join("file.txt"), &content).unwrap();

        let repo = GitRepository::at(dir.path().to_path_buf());
        let window = repo
            .content_with_context("file.txt", &[20], 3)
            .unwrap();
        let lines: Vec<&str> = window.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0].trim_start(), "17 | line 17");
        assert_eq!(lines[6].trim_start(), "23 | line 23");

        // Near the top of the file the window clamps to line 1.
        let window = repo.content_with_context("file.txt", &[2], 5).unwrap();
        assert!(window.starts_with("   1 | line 1"));
    }

    #[test]
    fn no_lines_returns_file_head() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("small.txt"), "a\nb\nc\n").unwrap();
        let repo = GitRepository::at(dir.path().to_path_buf());
        let head = repo.content_with_context("small.txt", &[], 10).unwrap();
        assert_eq!(head, "a\nb\nc");
    }
}
