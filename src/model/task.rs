use super::efficiency::EfficiencyPolicy;
use super::score::{CellClass, DASH, ProcessScore, TaskScore};
use super::submission::{ProcessSubmission, Status, ThreadSubmission};
use chrono::NaiveDateTime;
use std::path::Path;

/// Source of last-commit instants for implementation directories.
pub trait CommitLog {
    fn last_commit(&self, path: &Path) -> Option<NaiveDateTime>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deadline {
    pub label: String,
    /// `None` when the deadline was replaced by a free-text label.
    pub due: Option<NaiveDateTime>,
}

/// A course assignment able to turn one submission into a score.
pub trait Task {
    type Submission;
    type Score;

    fn name(&self) -> &str;
    fn deadline(&self) -> &Deadline;
    fn score(
        &self,
        submission: Option<&Self::Submission>,
        commits: &dyn CommitLog,
    ) -> Self::Score;
}

/// Rules shared by every task of a course.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rules {
    pub deadline: Deadline,
    pub copy_coefficient: f64,
    pub efficiency: EfficiencyPolicy,
}

impl Rules {
    fn solution(status: Option<Status>, max_points: u32) -> (f64, CellClass) {
        match status {
            Some(Status::Done) => (f64::from(max_points), CellClass::Success),
            Some(Status::Disabled) => (f64::from(max_points), CellClass::Muted),
            None => (0.0, CellClass::Plain),
        }
    }

    /// Whole days between the deadline and the last commit of `path`, as a
    /// non-positive number. Only finished work is checked.
    fn deadline_penalty(
        &self,
        path: &Path,
        status: Option<Status>,
        commits: &dyn CommitLog,
    ) -> i64 {
        if status != Some(Status::Done) {
            return 0;
        }
        let Some(due) = self.deadline.due else {
            return 0;
        };
        match commits.last_commit(path) {
            Some(commit) => {
                let days_late = (commit - due).num_days();
                if days_late > 0 { -days_late } else { 0 }
            }
            None => 0,
        }
    }

    fn copy_penalty(&self, copied: bool, solution_points: f64) -> f64 {
        if copied && solution_points != 0.0 {
            -self.copy_coefficient * solution_points
        } else {
            0.0
        }
    }

    fn copy_class(copied: bool, status: Option<Status>) -> CellClass {
        if copied || status == Some(Status::Disabled) {
            CellClass::Warning
        } else {
            CellClass::Plain
        }
    }

    /// Solution, deadline and copy components of one implementation.
    fn implementation_score(
        &self,
        status: Option<Status>,
        max_points: u32,
        path: &Path,
        copied: bool,
        commits: &dyn CommitLog,
    ) -> TaskScore {
        let (solution_points, solution_class) = Self::solution(status, max_points);
        let copy_penalty = self.copy_penalty(copied, solution_points);
        TaskScore {
            solution_points,
            solution_class,
            deadline_penalty: self.deadline_penalty(path, status, commits),
            copy_penalty,
            copy_class: Self::copy_class(copied, status),
            ..TaskScore::default()
        }
    }

    /// Fill the performance components of `score` from measured times.
    fn add_performance(
        &self,
        score: &mut TaskScore,
        parallel_time: Option<f64>,
        seq_time: Option<f64>,
        max_points: u32,
    ) {
        let metrics = self.efficiency.metrics(parallel_time, seq_time);
        score.performance_points = self.efficiency.points(metrics.efficiency, max_points);
        score.performance_display = if metrics.efficiency.is_some() {
            format!("{:.2}", score.performance_points)
        } else {
            DASH.to_owned()
        };
        score.acceleration = metrics.acceleration_display;
        score.efficiency = metrics.efficiency_display;
    }
}

/// Thread track task (`seq`, `omp`, `tbb`, `stl`, `all`).
#[derive(Clone, Debug, PartialEq)]
pub struct ThreadTask {
    pub name: String,
    pub title: String,
    pub solution_max: u32,
    pub performance_max: u32,
    pub report_max: u32,
    pub rules: Rules,
}

impl ThreadTask {
    /// The sequential implementation is the reference and never earns
    /// performance points.
    pub fn is_reference(&self) -> bool {
        self.name == "seq"
    }

    pub fn max_points(&self) -> u32 {
        self.solution_max + self.performance_max + self.report_max
    }
}

impl Task for ThreadTask {
    type Submission = ThreadSubmission;
    type Score = TaskScore;

    fn name(&self) -> &str {
        &self.name
    }

    fn deadline(&self) -> &Deadline {
        &self.rules.deadline
    }

    fn score(&self, submission: Option<&ThreadSubmission>, commits: &dyn CommitLog) -> TaskScore {
        let Some(submission) = submission else {
            return TaskScore::default();
        };
        let mut score = self.rules.implementation_score(
            submission.status,
            self.solution_max,
            &submission.impl_path(),
            submission.copied,
            commits,
        );
        if !self.is_reference() {
            self.rules.add_performance(
                &mut score,
                submission.perf_time,
                submission.seq_time,
                self.performance_max,
            );
        }
        if submission.report_present {
            score.report_points = f64::from(self.report_max);
            if self.report_max > 0 {
                score.report_class = CellClass::Success;
            }
        }
        score
    }
}

/// Point budget of one side of a process task.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SidePoints {
    pub solution: u32,
    pub performance: u32,
}

/// Process track task pairing a `seq` and an `mpi` implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessTask {
    pub name: String,
    pub title: String,
    pub seq: SidePoints,
    pub mpi: SidePoints,
    pub report_max: u32,
    pub variants_max: usize,
    pub rules: Rules,
}

impl ProcessTask {
    pub fn max_points(&self) -> u32 {
        self.report_max + self.seq.solution + self.mpi.solution + self.mpi.performance
    }
}

impl Task for ProcessTask {
    type Submission = ProcessSubmission;
    type Score = ProcessScore;

    fn name(&self) -> &str {
        &self.name
    }

    fn deadline(&self) -> &Deadline {
        &self.rules.deadline
    }

    fn score(
        &self,
        submission: Option<&ProcessSubmission>,
        commits: &dyn CommitLog,
    ) -> ProcessScore {
        let Some(submission) = submission else {
            return ProcessScore::default();
        };
        let seq = self.rules.implementation_score(
            submission.seq_status,
            self.seq.solution,
            &submission.impl_path("seq"),
            submission.seq_copied,
            commits,
        );
        let mut mpi = self.rules.implementation_score(
            submission.mpi_status,
            self.mpi.solution,
            &submission.impl_path("mpi"),
            submission.mpi_copied,
            commits,
        );
        self.rules.add_performance(
            &mut mpi,
            submission.mpi_time,
            submission.seq_time,
            self.mpi.performance,
        );
        let report_points = if submission.report_present {
            f64::from(self.report_max)
        } else {
            0.0
        };
        ProcessScore {
            seq,
            mpi,
            report_points,
        }
    }
}

#[cfg(test)]
impl CommitLog for std::collections::HashMap<std::path::PathBuf, NaiveDateTime> {
    fn last_commit(&self, path: &Path) -> Option<NaiveDateTime> {
        self.get(path).copied()
    }
}
