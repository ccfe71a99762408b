use std::fmt;
use std::path::{Path, PathBuf};

/// Presence of an implementation in a student's task folder. Absence is
/// represented by `None` wherever a status is optional.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Done,
    /// The folder has been excluded from the build by the instructors.
    Disabled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Done => "done",
            Status::Disabled => "disabled",
        })
    }
}

/// Observed facts for one student against one thread task.
#[derive(Clone, Debug)]
pub struct ThreadSubmission {
    pub task_name: String,
    pub status: Option<Status>,
    pub work_dir: PathBuf,
    pub perf_time: Option<f64>,
    pub seq_time: Option<f64>,
    pub report_present: bool,
    pub copied: bool,
}

impl ThreadSubmission {
    pub fn impl_path(&self) -> PathBuf {
        self.work_dir.join(&self.task_name)
    }
}

/// Observed facts for one student against one numbered process task,
/// covering both its `seq` and `mpi` sides.
#[derive(Clone, Debug)]
pub struct ProcessSubmission {
    pub task_number: usize,
    pub seq_status: Option<Status>,
    pub mpi_status: Option<Status>,
    pub work_dir: PathBuf,
    pub seq_time: Option<f64>,
    pub mpi_time: Option<f64>,
    pub report_present: bool,
    pub seq_copied: bool,
    pub mpi_copied: bool,
}

impl ProcessSubmission {
    pub fn impl_path(&self, implementation: &str) -> PathBuf {
        self.work_dir.join(implementation)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
