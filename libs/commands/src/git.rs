//! Git history commands: `/glog` and `/timemachine`.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Local};
use wingman_registry::{
    CommandError, CommandHandler, CommandResult, HostContext, StaticCompletions,
};

use crate::CommandSpec;

/// Run `git` in `root` and capture stdout, or the stderr text on failure.
pub(crate) fn run_git<S: AsRef<OsStr>>(root: &Path, args: &[S]) -> Result<String, CommandError> {
    let output = Command::new("git").args(args).current_dir(root).output()?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(CommandError::failed(format!(
            "Git error: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

pub(crate) fn is_git_repo(root: &Path) -> bool {
    run_git(root, &["rev-parse", "--git-dir"]).is_ok()
}

pub(crate) fn short_hash(hash: &str) -> String {
    hash.chars().take(7).collect()
}

const GLOG_DOC: &str = "Show pretty git log with branch graph and stats
    Usage: /glog [options]

    Options:
        -n N     Show last N commits (default: 10)
        --all    Show all branches
        --stat   Show changed files statistics";

struct Glog;

impl CommandHandler for Glog {
    fn doc(&self) -> Option<&str> {
        Some(GLOG_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let root = host.root();
        if !is_git_repo(&root) {
            host.tool_error("No git repository found");
            return Ok(());
        }

        let mut num_commits = "10".to_string();
        let mut show_all = false;
        let mut show_stats = false;
        let tokens: Vec<&str> = args.split_whitespace().collect();
        let mut i = 0;
        while i < tokens.len() {
            match tokens[i] {
                "-n" if i + 1 < tokens.len() => {
                    num_commits = tokens[i + 1].to_string();
                    i += 1;
                }
                "--all" => show_all = true,
                "--stat" => show_stats = true,
                _ => {}
            }
            i += 1;
        }

        let mut git_args = vec![
            "log".to_string(),
            format!("-n{num_commits}"),
            "--graph".to_string(),
            "--date=format:%Y-%m-%d %H:%M".to_string(),
            "--pretty=format:%C(yellow)%h%C(reset) - %C(green)%ad%C(reset) %C(bold blue)%an%C(reset)%C(red)%d%C(reset)%n%s%n".to_string(),
        ];
        if show_all {
            git_args.push("--all".to_string());
        }
        if show_stats {
            git_args.push("--stat".to_string());
        }

        match run_git(&root, &git_args) {
            Ok(log) => host.tool_output(&log),
            Err(err) => host.tool_error(&err.to_string()),
        }
        Ok(())
    }
}

pub(crate) fn glog() -> CommandSpec {
    CommandSpec {
        name: "glog",
        handler: Arc::new(Glog),
        completions: Some(Arc::new(StaticCompletions::new(["-n", "--all", "--stat"]))),
    }
}

const TIMEMACHINE_DOC: &str = "Explore the history of a file
    Usage: /timemachine <file> [time-spec]

    Groups the file's commits into features, fixes, tests, and refactors
    and surfaces files that frequently change together with it.
    Time specs look like: last 30 days, last 6 months, last 2 years";

#[derive(Debug)]
struct CommitInfo {
    hash: String,
    date: DateTime<FixedOffset>,
    author: String,
    subject: String,
}

/// Parse `last N days|months|years` into a lower bound.
pub(crate) fn parse_time_spec(spec: &str) -> Option<DateTime<Local>> {
    let spec = spec.trim().to_lowercase();
    let rest = spec.strip_prefix("last")?;
    let mut parts = rest.split_whitespace();
    let number: i64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let days = match unit.trim_end_matches('s') {
        "day" => number,
        "month" => number * 30,
        "year" => number * 365,
        _ => return None,
    };
    Some(Local::now() - Duration::days(days))
}

fn file_history(root: &Path, file: &str) -> Result<Vec<CommitInfo>, CommandError> {
    let log = run_git(
        root,
        &[
            "log",
            "--follow",
            "--date=iso-strict",
            "--pretty=format:%H%x09%ad%x09%an%x09%s",
            "--",
            file,
        ],
    )?;
    let mut history = Vec::new();
    for line in log.lines() {
        let mut fields = line.splitn(4, '\t');
        let (Some(hash), Some(date), Some(author), Some(subject)) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            continue;
        };
        let Ok(date) = DateTime::parse_from_rfc3339(date) else {
            continue;
        };
        history.push(CommitInfo {
            hash: hash.to_string(),
            date,
            author: author.to_string(),
            subject: subject.to_string(),
        });
    }
    Ok(history)
}

/// Bucket a commit by the shape of its subject line.
pub(crate) fn classify_subject(subject: &str) -> &'static str {
    let lower = subject.to_lowercase();
    if lower.contains("feat") || lower.contains("add") || lower.contains("new") {
        "features"
    } else if lower.contains("fix") || lower.contains("bug") || lower.contains("issue") {
        "fixes"
    } else if lower.contains("test") {
        "tests"
    } else if lower.contains("refactor") || lower.contains("clean") {
        "refactors"
    } else {
        "other"
    }
}

/// Does `other` look related to `base` (shared stem or a test file)?
pub(crate) fn looks_related(base: &str, other: &str) -> bool {
    let base_stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(base)
        .to_lowercase();
    let other_stem = Path::new(other)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(other)
        .to_lowercase();
    other_stem.contains(&base_stem)
        || base_stem.contains(&other_stem)
        || other.to_lowercase().contains("test")
}

// Bounds the per-commit `git show` calls when collecting related files.
const RELATED_COMMIT_LIMIT: usize = 30;

fn related_files(root: &Path, file: &str, history: &[CommitInfo]) -> HashMap<String, usize> {
    let mut related: HashMap<String, usize> = HashMap::new();
    for commit in history.iter().take(RELATED_COMMIT_LIMIT) {
        let Ok(shown) = run_git(
            root,
            &["show", "--name-only", "--pretty=format:", &commit.hash],
        ) else {
            continue;
        };
        for path in shown.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if path != file && looks_related(file, path) {
                *related.entry(path.to_string()).or_insert(0) += 1;
            }
        }
    }
    related
}

struct Timemachine;

impl CommandHandler for Timemachine {
    fn doc(&self) -> Option<&str> {
        Some(TIMEMACHINE_DOC)
    }

    fn run(&self, host: &mut dyn HostContext, args: &str) -> CommandResult {
        let (file, spec) = match args.trim().split_once(char::is_whitespace) {
            Some((file, spec)) => (file, spec.trim()),
            None => (args.trim(), ""),
        };
        if file.is_empty() {
            host.tool_error("Usage: /timemachine <file> [time-spec]");
            return Ok(());
        }

        let root = host.root();
        if !is_git_repo(&root) {
            host.tool_error("No git repository found");
            return Ok(());
        }

        let since = if spec.is_empty() {
            None
        } else {
            let parsed = parse_time_spec(spec);
            if parsed.is_none() {
                host.tool_warning(&format!(
                    "Could not parse time spec {spec:?}, showing full history"
                ));
            }
            parsed
        };

        let mut history = match file_history(&root, file) {
            Ok(history) => history,
            Err(err) => {
                host.tool_error(&err.to_string());
                return Ok(());
            }
        };
        if let Some(since) = since {
            history.retain(|c| c.date >= since);
        }
        if history.is_empty() {
            host.tool_output(&format!("No history found for {file}"));
            return Ok(());
        }

        let mut buckets: HashMap<&'static str, Vec<&CommitInfo>> = HashMap::new();
        for commit in &history {
            buckets
                .entry(classify_subject(&commit.subject))
                .or_default()
                .push(commit);
        }

        host.tool_output(&format!("\nHistory of {file}: {} commits", history.len()));
        if let (Some(newest), Some(oldest)) = (history.first(), history.last()) {
            host.tool_output(&format!(
                "From {} to {}",
                oldest.date.format("%Y-%m-%d"),
                newest.date.format("%Y-%m-%d")
            ));
        }

        for kind in ["features", "fixes", "tests", "refactors", "other"] {
            let Some(commits) = buckets.get(kind) else {
                continue;
            };
            host.tool_output(&format!("\n{} ({}):", kind, commits.len()));
            for commit in commits.iter().take(5) {
                host.tool_output(&format!(
                    "  {} {} {} - {}",
                    short_hash(&commit.hash),
                    commit.date.format("%Y-%m-%d"),
                    commit.author,
                    commit.subject
                ));
            }
        }

        let related = related_files(&root, file, &history);
        if !related.is_empty() {
            let mut ranked: Vec<(String, usize)> = related.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            host.tool_output("\nFrequently changed together:");
            for (path, count) in ranked.into_iter().take(5) {
                host.tool_output(&format!("  {path} ({count} commits)"));
            }
        }
        Ok(())
    }
}

pub(crate) fn timemachine() -> CommandSpec {
    CommandSpec {
        name: "timemachine",
        handler: Arc::new(Timemachine),
        completions: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wingman_registry::testing::RecordingHost;

    #[test]
    fn test_parse_time_spec() {
        let now = Local::now();
        let since = parse_time_spec("last 10 days").expect("parse");
        let delta = now - since;
        assert!((delta.num_days() - 10).abs() <= 1);

        assert!(parse_time_spec("last 2 years").is_some());
        assert!(parse_time_spec("LAST 1 MONTH").is_some());
        assert!(parse_time_spec("yesterday").is_none());
        assert!(parse_time_spec("last ten days").is_none());
        assert!(parse_time_spec("last 3 weeks").is_none());
    }

    #[test]
    fn test_classify_subject() {
        assert_eq!(classify_subject("Add login endpoint"), "features");
        assert_eq!(classify_subject("fix: crash on empty input"), "fixes");
        assert_eq!(classify_subject("more tests for parser"), "tests");
        assert_eq!(classify_subject("refactor session state"), "refactors");
        assert_eq!(classify_subject("bump version"), "other");
    }

    #[test]
    fn test_looks_related() {
        assert!(looks_related("src/parser.rs", "tests/parser_test.rs"));
        assert!(looks_related("src/parser.rs", "src/parser_utils.rs"));
        assert!(!looks_related("src/parser.rs", "docs/README.md"));
    }

    #[test]
    fn test_glog_outside_repo_reports_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut host = RecordingHost::new().with_root(tmp.path());
        Glog.run(&mut host, "").expect("run");
        assert_eq!(host.errors, vec!["No git repository found"]);
    }

    #[test]
    fn test_timemachine_requires_file_argument() {
        let mut host = RecordingHost::new();
        Timemachine.run(&mut host, "  ").expect("run");
        assert_eq!(host.errors, vec!["Usage: /timemachine <file> [time-spec]"]);
    }
}
