use std::fmt;

pub const DASH: &str = "—";

/// Visual class attached to a scored cell.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CellClass {
    #[default]
    Plain,
    Success,
    Muted,
    Warning,
}

impl fmt::Display for CellClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellClass::Plain => "",
            CellClass::Success => "cell-success",
            CellClass::Muted => "cell-muted",
            CellClass::Warning => "cell-warning",
        })
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One scored cell of the table.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskScore {
    pub solution_points: f64,
    pub solution_class: CellClass,
    pub performance_points: f64,
    pub performance_display: String,
    pub acceleration: String,
    pub efficiency: String,
    pub deadline_penalty: i64,
    pub copy_penalty: f64,
    pub copy_class: CellClass,
    pub report_points: f64,
    pub report_class: CellClass,
}

impl Default for TaskScore {
    fn default() -> Self {
        TaskScore {
            solution_points: 0.0,
            solution_class: CellClass::Plain,
            performance_points: 0.0,
            performance_display: DASH.to_owned(),
            acceleration: DASH.to_owned(),
            efficiency: DASH.to_owned(),
            deadline_penalty: 0,
            copy_penalty: 0.0,
            copy_class: CellClass::Plain,
            report_points: 0.0,
            report_class: CellClass::Plain,
        }
    }
}

impl TaskScore {
    /// Solution, performance and report points plus the (non-positive)
    /// copy penalty. The deadline penalty is shown next to the cell but
    /// does not enter the sum.
    pub fn total(&self) -> f64 {
        round2(
            self.solution_points + self.performance_points + self.report_points + self.copy_penalty,
        )
    }
}

/// Paired seq/mpi cells of a process task with the shared report bonus.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProcessScore {
    pub seq: TaskScore,
    pub mpi: TaskScore,
    pub report_points: f64,
}

impl ProcessScore {
    pub fn total(&self) -> f64 {
        round2(self.seq.total() + self.mpi.total() + self.report_points)
    }
}
