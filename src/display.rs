use crate::model::Task;
use crate::scoreboard::{Scoreboard, VariantRow};
use crate::stats::{self, Completion};

fn display_completion(title: &str, deadline: &str, max_points: u32, c: &Completion) {
    println!(
        "  - {} (due {}, {} points): done/disabled/absent {}/{}/{}",
        title, deadline, max_points, c.done, c.disabled, c.absent
    );
}

pub fn display_threads(board: &Scoreboard) {
    let completion = stats::threads_completion(board);
    println!("Threads track: {} students", board.thread_students.len());
    for (task, c) in board.thread_tasks.iter().zip(&completion) {
        display_completion(&task.title, &task.deadline().label, task.max_points(), c);
    }
    let mut rows = board.threads_rows();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.group.cmp(&b.group)));
    display_totals(rows.iter().map(|r| {
        (r.name.as_str(), r.group.as_str(), r.variant.clone(), r.total)
    }));
    println!();
}

pub fn display_processes(board: &Scoreboard) {
    let completion = stats::processes_completion(board);
    println!("Processes track: {} students", board.process_students.len());
    for (task, c) in board.process_tasks.iter().zip(&completion) {
        display_completion(&task.title, &task.deadline().label, task.max_points(), c);
    }
    let mut rows = board.processes_rows();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.group.cmp(&b.group)));
    display_totals(rows.iter().map(|r| {
        (r.name.as_str(), r.group.as_str(), r.variants.join("/"), r.total)
    }));
    println!();
}

fn display_totals<'a, I>(rows: I)
where
    I: Iterator<Item = (&'a str, &'a str, String, f64)>,
{
    let mut totals = Vec::new();
    for (name, group, variant, total) in rows {
        println!("  - {name} ({group}), variant {variant}: {total:.2}");
        totals.push(total);
    }
    if let Some(mean) = stats::mean(&totals) {
        println!("Mean total: {mean:.2}");
    }
}

pub fn display_variants(rows: &[VariantRow]) {
    if !rows.is_empty() {
        println!("Variants (threads; processes):");
        for row in rows {
            println!(
                "  - {} ({}): {}; {}",
                row.name,
                row.group,
                row.threads,
                row.processes.join("/")
            );
        }
    }
}
