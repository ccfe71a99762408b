use super::score::{ProcessScore, TaskScore, round2};
use super::submission::{ProcessSubmission, ThreadSubmission};
use super::task::{CommitLog, ProcessTask, Task, ThreadTask};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

/// Group names are compared case-insensitively (`ivt-101` and `IVT-101`
/// are the same group).
pub fn normalize_group(group: &str) -> String {
    group.trim().to_uppercase()
}

/// Key under which a student's submissions from several folders are merged.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identity {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub group: String,
}

impl Identity {
    pub fn new(last_name: &str, first_name: &str, middle_name: &str, group: &str) -> Self {
        Identity {
            last_name: last_name.to_owned(),
            first_name: first_name.to_owned(),
            middle_name: middle_name.to_owned(),
            group: normalize_group(group),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_name.is_empty()
            && self.first_name.is_empty()
            && self.middle_name.is_empty()
            && self.group.is_empty()
    }

    pub fn display_name(&self) -> String {
        let name = [&self.last_name, &self.first_name, &self.middle_name]
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            super::score::DASH.to_owned()
        } else {
            name
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.last_name, self.first_name, self.middle_name, self.group
        )
    }
}

#[derive(Debug, Default)]
pub struct Student {
    pub identity: Identity,
    pub student_id: Option<String>,
    thread_submissions: HashMap<String, ThreadSubmission>,
    process_submissions: HashMap<String, ProcessSubmission>,
    thread_scores: RefCell<HashMap<String, TaskScore>>,
    process_scores: RefCell<HashMap<String, ProcessScore>>,
}

impl Student {
    pub fn new(identity: Identity, student_id: Option<String>) -> Self {
        Student {
            identity,
            student_id,
            ..Student::default()
        }
    }

    pub fn group(&self) -> &str {
        &self.identity.group
    }

    pub fn display_name(&self) -> String {
        self.identity.display_name()
    }

    pub fn add_thread_submission(&mut self, submission: ThreadSubmission) {
        self.thread_submissions
            .insert(submission.task_name.clone(), submission);
    }

    pub fn add_process_submission(&mut self, task_name: &str, submission: ProcessSubmission) {
        self.process_submissions
            .insert(task_name.to_owned(), submission);
    }

    pub fn thread_submission(&self, task_name: &str) -> Option<&ThreadSubmission> {
        self.thread_submissions.get(task_name)
    }

    pub fn process_submission(&self, task_name: &str) -> Option<&ProcessSubmission> {
        self.process_submissions.get(task_name)
    }

    /// Score against a thread task, computed on first access and reused for
    /// the rest of the run.
    pub fn score_thread(&self, task: &ThreadTask, commits: &dyn CommitLog) -> TaskScore {
        if let Some(score) = self.thread_scores.borrow().get(task.name()) {
            return score.clone();
        }
        let score = task.score(self.thread_submission(task.name()), commits);
        self.thread_scores
            .borrow_mut()
            .insert(task.name().to_owned(), score.clone());
        score
    }

    pub fn score_process(&self, task: &ProcessTask, commits: &dyn CommitLog) -> ProcessScore {
        if let Some(score) = self.process_scores.borrow().get(task.name()) {
            return score.clone();
        }
        let score = task.score(self.process_submission(task.name()), commits);
        self.process_scores
            .borrow_mut()
            .insert(task.name().to_owned(), score.clone());
        score
    }

    pub fn threads_total(&self, tasks: &[ThreadTask], commits: &dyn CommitLog) -> f64 {
        round2(
            tasks
                .iter()
                .map(|t| self.score_thread(t, commits).total())
                .sum(),
        )
    }

    pub fn processes_total(&self, tasks: &[ProcessTask], commits: &dyn CommitLog) -> f64 {
        round2(
            tasks
                .iter()
                .map(|t| self.score_process(t, commits).total())
                .sum(),
        )
    }
}
