use crate::loaders::{StudentInfo, TaskFolder};
use crate::model::{Identity, Student};
use eyre::{bail, ensure};
use std::collections::BTreeSet;

fn info_path(folder: &TaskFolder) -> String {
    folder.path.join("info.json").display().to_string()
}

/// Validate the process task number declared by a folder and return it as
/// a 1-based index into the configured process tasks.
pub fn task_number(
    info: &StudentInfo,
    folder: &TaskFolder,
    task_count: usize,
) -> eyre::Result<usize> {
    ensure!(
        task_count > 0,
        "no process tasks configured, cannot assign task_number for {}",
        info_path(folder)
    );
    let Some(number) = info.task_number() else {
        bail!(
            "invalid task_number {} in {} for {}",
            info.raw_task_number(),
            info_path(folder),
            info.identity()
        );
    };
    match usize::try_from(number) {
        Ok(n) if (1..=task_count).contains(&n) => Ok(n),
        _ => bail!(
            "task_number out of range in {} for {}: {} (allowed 1..{})",
            info_path(folder),
            info.identity(),
            number,
            task_count
        ),
    }
}

/// A student may hand in each process task from one folder only.
pub fn ensure_unique_submission(
    student: &Student,
    task_name: &str,
    folder: &TaskFolder,
) -> eyre::Result<()> {
    if let Some(existing) = student.process_submission(task_name) {
        bail!(
            "duplicate process task {} for student {} in {} and {}",
            task_name,
            student.identity,
            folder.path.display(),
            existing.work_dir().display()
        );
    }
    Ok(())
}

/// Distinct non-empty identities declared by a set of folders.
pub fn identities<'a, I>(folders: I) -> BTreeSet<Identity>
where
    I: IntoIterator<Item = &'a TaskFolder>,
{
    folders
        .into_iter()
        .map(TaskFolder::identity)
        .filter(|identity| !identity.is_empty())
        .collect()
}

/// The number of assembled students must match the number of distinct
/// identities found on disk, or merging went wrong somewhere.
pub fn ensure_headcount<'a, I>(track: &str, folders: I, students: usize) -> eyre::Result<()>
where
    I: IntoIterator<Item = &'a TaskFolder>,
{
    let discovered = identities(folders).len();
    ensure!(
        discovered == students,
        "{} track mismatch: discovered {} unique students across task folders, produced {} rows; \
         ensure each task folder has a valid info.json (last/first/middle/group) and no student \
         is listed twice",
        track,
        discovered,
        students
    );
    Ok(())
}
