use crate::config::{Shift, Window};
use crate::model::Deadline;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use eyre::{OptionExt, eyre};

/// `n` due dates spread evenly over `(start, end]`, the last one being
/// `end`. A single task (or none) is due at `end`.
pub fn evenly_spaced_dates(n: usize, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if n <= 1 {
        return vec![end];
    }
    let step = (end - start).num_days() as f64 / n as f64;
    (1..=n)
        .map(|i| start + Duration::days((step * i as f64).round_ties_even() as i64))
        .collect()
}

/// Year of the window containing `today`: a window whose end month has
/// already passed this year refers to the next one.
fn academic_year(window: &Window, today: NaiveDate) -> i32 {
    if today.month() <= window.end_month {
        today.year()
    } else {
        today.year() + 1
    }
}

fn window_dates(window: &Window, today: NaiveDate) -> eyre::Result<(NaiveDate, NaiveDate)> {
    let year = academic_year(window, today);
    let start = NaiveDate::from_ymd_opt(year, window.start_month, window.start_day)
        .ok_or_else(|| eyre!("invalid deadline window start {window:?}"))?;
    let end = NaiveDate::from_ymd_opt(year, window.end_month, window.end_day)
        .ok_or_else(|| eyre!("invalid deadline window end {window:?}"))?;
    Ok((start, end))
}

pub fn label(date: NaiveDate) -> String {
    date.format("%-d %b").to_string()
}

/// Apply an optional override to a base due date.
pub fn deadline_for(base: NaiveDate, shift: Option<&Shift>) -> eyre::Result<Deadline> {
    match shift {
        Some(Shift::Label(text)) => Ok(Deadline {
            label: text.clone(),
            due: None,
        }),
        Some(Shift::Days(days)) => due_on(
            base.checked_add_signed(Duration::days(*days))
                .ok_or_eyre("deadline shift out of range")?,
        ),
        None => due_on(base),
    }
}

fn due_on(date: NaiveDate) -> eyre::Result<Deadline> {
    let time = NaiveTime::from_hms_opt(23, 59, 0).ok_or_eyre("invalid due time")?;
    Ok(Deadline {
        label: label(date),
        due: Some(date.and_time(time)),
    })
}

/// Deadlines of `count` consecutive tasks over `window`, the i-th task
/// (0-based) being adjusted by `shift(i)`.
pub fn schedule<'a, F>(
    count: usize,
    window: &Window,
    today: NaiveDate,
    shift: F,
) -> eyre::Result<Vec<Deadline>>
where
    F: Fn(usize) -> Option<&'a Shift>,
{
    let (start, end) = window_dates(window, today)?;
    evenly_spaced_dates(count, start, end)
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, base)| deadline_for(base, shift(i)))
        .collect()
}
