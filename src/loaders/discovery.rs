use super::student_info::{StudentInfo, load_student_info};
use crate::model::{Identity, Status};
use eyre::WrapErr;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DISABLED_SUFFIX: &str = "_disabled";

/// A student's task folder as found on disk.
#[derive(Clone, Debug, Default)]
pub struct TaskFolder {
    /// Folder name without the `_disabled` suffix.
    pub name: String,
    pub path: PathBuf,
    pub implementations: BTreeMap<String, Status>,
    pub info: Option<StudentInfo>,
    pub report_present: bool,
}

impl TaskFolder {
    pub fn status(&self, implementation: &str) -> Option<Status> {
        self.implementations.get(implementation).copied()
    }

    pub fn has(&self, implementation: &str) -> bool {
        self.implementations.contains_key(implementation)
    }

    /// Identity declared in the folder metadata, empty when there is none.
    pub fn identity(&self) -> Identity {
        self.info
            .as_ref()
            .map(StudentInfo::identity)
            .unwrap_or_default()
    }
}

/// Scan `tasks_dir` for student folders holding at least one of
/// `implementations`, in folder name order.
pub fn discover_tasks(tasks_dir: &Path, implementations: &[&str]) -> eyre::Result<Vec<TaskFolder>> {
    if !tasks_dir.exists() {
        warn!(path = %tasks_dir.display(), "tasks directory does not exist");
        return Ok(Vec::new());
    }
    let mut entries = std::fs::read_dir(tasks_dir)
        .wrap_err_with(|| format!("cannot list tasks directory {}", tasks_dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .wrap_err_with(|| format!("cannot list tasks directory {}", tasks_dir.display()))?;
    entries.sort_by_key(|e| e.file_name());
    let mut folders: BTreeMap<String, TaskFolder> = BTreeMap::new();
    for entry in entries {
        let path = entry.path();
        let raw_name = entry.file_name().to_string_lossy().into_owned();
        if !path.is_dir() || raw_name == "common" {
            continue;
        }
        let (name, status) = match raw_name.strip_suffix(DISABLED_SUFFIX) {
            Some(clean) => (clean.to_owned(), Status::Disabled),
            None => (raw_name.clone(), Status::Done),
        };
        let present = implementations
            .iter()
            .filter(|&&implementation| path.join(implementation).is_dir())
            .map(|&implementation| (implementation.to_owned(), status))
            .collect::<BTreeMap<_, _>>();
        if present.is_empty() {
            continue;
        }
        // `x` sorts before `x_disabled`, so the enabled folder is seen first
        // and keeps its path and metadata.
        if let Some(existing) = folders.get_mut(&name) {
            debug!(folder = %raw_name, into = %existing.path.display(), "merging task folder");
            for (implementation, status) in present {
                existing.implementations.entry(implementation).or_insert(status);
            }
            continue;
        }
        debug!(
            folder = %raw_name,
            implementations = ?present.keys().collect::<Vec<_>>(),
            "discovered task folder"
        );
        folders.insert(
            name.clone(),
            TaskFolder {
                name,
                info: load_student_info(&path),
                report_present: path.join("report.md").exists(),
                path,
                implementations: present,
            },
        );
    }
    Ok(folders.into_values().collect())
}
