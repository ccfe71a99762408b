use crate::model::DEFAULT_SCALE;
use eyre::WrapErr;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::warn;

/// Course configuration: point budgets, scoring coefficients, deadline
/// overrides and plagiarism lists.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub copying: Copying,
    pub efficiency: Efficiency,
    efficiency_scale: Option<Vec<toml::Value>>,
    pub threads: ThreadsConfig,
    pub processes: ProcessesConfig,
    pub deadlines: DeadlinesConfig,
    pub plagiarism: PlagiarismConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Copying {
    pub coefficient: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Efficiency {
    pub num_proc: u32,
}

impl Default for Efficiency {
    fn default() -> Self {
        Efficiency { num_proc: 1 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThreadsConfig {
    pub variants_max: usize,
    pub tasks: Vec<ThreadTaskConfig>,
}

impl Default for ThreadsConfig {
    fn default() -> Self {
        ThreadsConfig {
            variants_max: 1,
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ThreadTaskConfig {
    pub name: String,
    pub title: Option<String>,
    #[serde(rename = "S", default)]
    pub solution: u32,
    #[serde(rename = "A", default)]
    pub performance: u32,
    #[serde(rename = "R", default)]
    pub report: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProcessesConfig {
    pub tasks: Vec<ProcessTaskConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessTaskConfig {
    pub name: String,
    pub title: Option<String>,
    #[serde(rename = "R", default)]
    pub report: u32,
    #[serde(default = "one")]
    pub variants_max: usize,
    #[serde(default)]
    pub seq: SideConfig,
    #[serde(default)]
    pub mpi: SideConfig,
}

fn one() -> usize {
    1
}

#[derive(Debug, Default, Deserialize)]
pub struct SideConfig {
    #[serde(rename = "S", default)]
    pub solution: u32,
    #[serde(rename = "A", default)]
    pub performance: u32,
}

/// Per-task deadline override: a day shift or a replacement label.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Shift {
    Days(i64),
    Label(String),
}

/// Calendar window (month/day of the academic year) over which due dates
/// are spread.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Window {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl Window {
    pub const THREADS: Window = Window {
        start_month: 2,
        start_day: 1,
        end_month: 5,
        end_day: 15,
    };
    pub const PROCESSES: Window = Window {
        start_month: 10,
        start_day: 15,
        end_month: 12,
        end_day: 14,
    };
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeadlinesConfig {
    pub threads: BTreeMap<String, Shift>,
    pub processes: BTreeMap<String, Shift>,
    #[serde(alias = "threads_base")]
    pub threads_window: Option<Window>,
    #[serde(alias = "processes_base")]
    pub processes_window: Option<Window>,
}

impl DeadlinesConfig {
    /// Override for the `number`-th process task (1-based), looked up as
    /// `task_<n>` then `mpi_task_<n>`.
    pub fn process_shift(&self, number: usize) -> Option<&Shift> {
        self.processes
            .get(&format!("task_{number}"))
            .or_else(|| self.processes.get(&format!("mpi_task_{number}")))
    }
}

/// Folders flagged as copied, per track and per task key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlagiarismConfig {
    pub threads: BTreeMap<String, BTreeSet<String>>,
    pub processes: BTreeMap<String, BTreeSet<String>>,
}

fn is_flagged(lists: &BTreeMap<String, BTreeSet<String>>, task_key: &str, dir_name: &str) -> bool {
    lists.get(task_key).is_some_and(|flagged| {
        flagged.contains(dir_name) || flagged.contains(&format!("{dir_name}_disabled"))
    })
}

impl PlagiarismConfig {
    pub fn is_thread_copied(&self, task_key: &str, dir_name: &str) -> bool {
        is_flagged(&self.threads, task_key, dir_name)
    }

    pub fn is_process_copied(&self, task_key: &str, dir_name: &str) -> bool {
        is_flagged(&self.processes, task_key, dir_name)
    }
}

impl Config {
    pub fn load(file_name: &Path) -> eyre::Result<Config> {
        let content = std::fs::read_to_string(file_name).wrap_err_with(|| {
            format!("cannot read configuration file {}", file_name.display())
        })?;
        Self::parse(&content)
            .wrap_err_with(|| format!("cannot load configuration file {}", file_name.display()))
    }

    pub fn parse(content: &str) -> eyre::Result<Config> {
        Ok(toml::from_str(content)?)
    }

    /// Efficiency scale in configuration order. Malformed entries are
    /// skipped; a missing table means the course default scale.
    pub fn efficiency_scale(&self) -> Vec<(f64, f64)> {
        let Some(entries) = &self.efficiency_scale else {
            return DEFAULT_SCALE.to_vec();
        };
        entries
            .iter()
            .filter_map(|entry| {
                let threshold = entry.get("threshold").and_then(as_f64);
                let percent = entry.get("percent").and_then(as_f64);
                match (threshold, percent) {
                    (Some(t), Some(p)) => Some((t, p)),
                    _ => {
                        warn!(entry = %entry, "ignoring malformed efficiency scale entry");
                        None
                    }
                }
            })
            .collect()
    }
}

fn as_f64(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
