use crate::model::{ProcessScore, TaskScore};
use crate::scoreboard::{ProcessesRow, Scoreboard, ThreadsRow, VariantRow};
use eyre::WrapErr;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;

/// File-name friendly form of a group name.
pub fn slugify(group: &str) -> String {
    group
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn cell_header(prefix: &str, with_performance: bool) -> Vec<String> {
    let mut columns = vec!["S"];
    if with_performance {
        columns.extend(["A", "Acceleration", "Efficiency"]);
    }
    columns.extend(["Deadline", "Plagiarism"]);
    columns
        .into_iter()
        .map(|c| format!("{prefix} {c}"))
        .collect()
}

fn cell_values(score: &TaskScore, with_performance: bool) -> Vec<String> {
    let mut values = vec![score.solution_points.to_string()];
    if with_performance {
        values.extend([
            score.performance_display.clone(),
            score.acceleration.clone(),
            score.efficiency.clone(),
        ]);
    }
    values.extend([
        score.deadline_penalty.to_string(),
        score.copy_penalty.to_string(),
    ]);
    values
}

pub fn write_threads<W: io::Write>(
    writer: W,
    board: &Scoreboard,
    rows: &[ThreadsRow],
) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Name".to_owned(), "Group".to_owned(), "Variant".to_owned()];
    for task in &board.thread_tasks {
        header.extend(cell_header(&task.name, !task.is_reference()));
        header.push(format!("{} R", task.name));
    }
    header.push("Total".to_owned());
    wtr.write_record(&header)?;
    for row in rows {
        let mut record = vec![row.name.clone(), row.group.clone(), row.variant.clone()];
        for (task, cell) in board.thread_tasks.iter().zip(&row.cells) {
            record.extend(cell_values(cell, !task.is_reference()));
            record.push(cell.report_points.to_string());
        }
        record.push(format!("{:.2}", row.total));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn process_values(variant: &str, score: &ProcessScore) -> Vec<String> {
    let mut values = vec![variant.to_owned()];
    values.extend(cell_values(&score.seq, false));
    values.extend(cell_values(&score.mpi, true));
    values.push(score.report_points.to_string());
    values.push(format!("{:.2}", score.total()));
    values
}

pub fn write_processes<W: io::Write>(
    writer: W,
    board: &Scoreboard,
    rows: &[ProcessesRow],
) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Name".to_owned(), "Group".to_owned()];
    for task in &board.process_tasks {
        header.push(format!("{} Variant", task.title));
        header.extend(cell_header(&format!("{} seq", task.title), false));
        header.extend(cell_header(&format!("{} mpi", task.title), true));
        header.push(format!("{} R", task.title));
        header.push(format!("{} Total", task.title));
    }
    header.push("Total".to_owned());
    wtr.write_record(&header)?;
    for row in rows {
        let mut record = vec![row.name.clone(), row.group.clone()];
        for (variant, score) in row.variants.iter().zip(&row.scores) {
            record.extend(process_values(variant, score));
        }
        record.push(format!("{:.2}", row.total));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_variants<W: io::Write>(
    writer: W,
    board: &Scoreboard,
    rows: &[VariantRow],
) -> eyre::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Name".to_owned(), "Group".to_owned(), "Threads".to_owned()];
    header.extend(board.process_tasks.iter().map(|t| t.title.clone()));
    wtr.write_record(&header)?;
    for row in rows {
        let mut record = vec![row.name.clone(), row.group.clone(), row.threads.clone()];
        record.extend(row.processes.iter().cloned());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn create(dir: &Path, file_name: &str) -> eyre::Result<File> {
    let path = dir.join(file_name);
    info!(path = %path.display(), "writing");
    File::create(&path).wrap_err_with(|| format!("cannot create {}", path.display()))
}

/// Write the full tables, one table per group and track, and the variant
/// lookups (when any) into `dir`.
pub fn write_all(dir: &Path, board: &Scoreboard, variants: &[VariantRow]) -> eyre::Result<()> {
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("cannot create output directory {}", dir.display()))?;
    write_threads(create(dir, "threads.csv")?, board, &board.threads_rows())?;
    write_processes(create(dir, "processes.csv")?, board, &board.processes_rows())?;
    for group in board.threads_groups() {
        let file = create(dir, &format!("threads_{}.csv", slugify(&group)))?;
        write_threads(file, board, &board.threads_rows_for_group(&group))?;
    }
    for group in board.processes_groups() {
        let file = create(dir, &format!("processes_{}.csv", slugify(&group)))?;
        write_processes(file, board, &board.processes_rows_for_group(&group))?;
    }
    if !variants.is_empty() {
        write_variants(create(dir, "variants.csv")?, board, variants)?;
    }
    Ok(())
}
