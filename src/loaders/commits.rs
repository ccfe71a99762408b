use crate::model::CommitLog;
use chrono::{DateTime, Local, NaiveDateTime};
use std::path::Path;
use std::process::Command;
use tracing::trace;

/// Last-commit lookup through the `git` command line.
#[derive(Debug, Default)]
pub struct GitCommitLog;

/// Convert `git log --format=%ct` output to local time.
fn parse_timestamp(output: &str) -> Option<NaiveDateTime> {
    let output = output.trim();
    if output.is_empty() || !output.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds = output.parse::<i64>().ok()?;
    let utc = DateTime::from_timestamp(seconds, 0)?;
    Some(utc.with_timezone(&Local).naive_local())
}

impl CommitLog for GitCommitLog {
    /// Git runs from the parent of `path`, so the lookup happens in the
    /// repository holding it whatever the working directory is.
    fn last_commit(&self, path: &Path) -> Option<NaiveDateTime> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let output = Command::new("git")
            .arg("-C")
            .arg(parent)
            .args(["log", "-1", "--format=%ct", "--"])
            .arg(path.file_name()?)
            .output()
            .ok()?;
        let commit = parse_timestamp(&String::from_utf8_lossy(&output.stdout));
        trace!(path = %path.display(), ?commit, "last commit");
        commit
    }
}
