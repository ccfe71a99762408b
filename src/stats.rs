use crate::model::{Status, Student, round2};
use crate::scoreboard::Scoreboard;

/// How many students handed in a task, and in which state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Completion {
    pub done: usize,
    pub disabled: usize,
    pub absent: usize,
}

impl Completion {
    fn count(&mut self, status: Option<Status>) {
        match status {
            Some(Status::Done) => self.done += 1,
            Some(Status::Disabled) => self.disabled += 1,
            None => self.absent += 1,
        }
    }
}

fn completion<F>(students: &[Student], status: F) -> Completion
where
    F: Fn(&Student) -> Option<Status>,
{
    let mut completion = Completion::default();
    for student in students {
        completion.count(status(student));
    }
    completion
}

/// Completion of every thread task, in task order.
pub fn threads_completion(board: &Scoreboard) -> Vec<Completion> {
    board
        .thread_tasks
        .iter()
        .map(|task| {
            completion(&board.thread_students, |s| {
                s.thread_submission(&task.name).and_then(|sub| sub.status)
            })
        })
        .collect()
}

/// Completion of every process task, judged on its parallel side.
pub fn processes_completion(board: &Scoreboard) -> Vec<Completion> {
    board
        .process_tasks
        .iter()
        .map(|task| {
            completion(&board.process_students, |s| {
                s.process_submission(&task.name).and_then(|sub| sub.mpi_status)
            })
        })
        .collect()
}

pub fn mean(totals: &[f64]) -> Option<f64> {
    if totals.is_empty() {
        None
    } else {
        Some(round2(totals.iter().sum::<f64>() / totals.len() as f64))
    }
}
