use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Best elapsed time in seconds, per task folder then per implementation.
pub type PerfMap = HashMap<String, HashMap<String, f64>>;

const IMPLEMENTATIONS: [&str; 6] = ["seq", "omp", "tbb", "stl", "all", "mpi"];
const PREFIX: &str = "task_run_";

#[derive(Deserialize)]
struct BenchmarkFile {
    #[serde(default)]
    benchmarks: Vec<Value>,
}

#[derive(Deserialize)]
struct Entry {
    name: String,
    real_time: Value,
    #[serde(default)]
    time_unit: Option<String>,
}

/// Times are numbers, but numeric strings are accepted as well.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn unit_factor(unit: Option<&str>) -> f64 {
    match unit.unwrap_or("ns") {
        "ns" => 1e-9,
        "us" => 1e-6,
        "ms" => 1e-3,
        _ => 1.0,
    }
}

/// Split `task_run_<kind>:<folder>:<impl...>[/suffix]` into folder and
/// implementation.
fn parse_name(name: &str) -> Option<(&str, &'static str)> {
    let name = name.split('/').next()?;
    let mut segments = name.strip_prefix(PREFIX)?.split(':');
    let _kind = segments.next()?;
    let folder = segments.next()?;
    let implementation_status = segments.next()?;
    let implementation = IMPLEMENTATIONS
        .into_iter()
        .find(|i| implementation_status.starts_with(i))?;
    Some((folder, implementation))
}

/// Parse Google Benchmark output, keeping the fastest run of every
/// implementation. Folders outside `hints` are ignored unless `hints` is
/// empty. Anything unreadable is a missing measurement.
pub fn load_benchmark_json(path: &Path, hints: &[&str]) -> PerfMap {
    let mut perf = PerfMap::new();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read benchmark results");
            return perf;
        }
    };
    let file: BenchmarkFile = match serde_json::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot parse benchmark results");
            return perf;
        }
    };
    for raw in file.benchmarks {
        let Ok(entry) = serde_json::from_value::<Entry>(raw) else {
            continue;
        };
        let Some((folder, implementation)) = parse_name(&entry.name) else {
            continue;
        };
        if !hints.is_empty() && !hints.contains(&folder) {
            continue;
        }
        let Some(real_time) = as_f64(&entry.real_time) else {
            continue;
        };
        let seconds = real_time * unit_factor(entry.time_unit.as_deref());
        if !seconds.is_finite() {
            continue;
        }
        let best = perf
            .entry(folder.to_owned())
            .or_default()
            .entry(implementation.to_owned())
            .or_insert(seconds);
        *best = best.min(seconds);
    }
    debug!(path = %path.display(), folders = perf.len(), "loaded benchmark results");
    perf
}

/// Default location of `perf_results_<track>.json` under the repository
/// root.
pub fn locate_benchmark(root: &Path, track: &str) -> Option<PathBuf> {
    let file_name = format!("perf_results_{track}.json");
    let found = [
        root.join("build").join("bin").join(&file_name),
        root.join("install").join("bin").join(&file_name),
        root.join(&file_name),
    ]
    .into_iter()
    .find(|p| p.exists());
    match &found {
        Some(path) => info!(track, path = %path.display(), "found benchmark results"),
        None => info!(track, "no benchmark results, performance will not be scored"),
    }
    found
}

/// Sorted copy of a perf map, for stable logging and tests.
pub fn sorted(perf: &PerfMap) -> BTreeMap<&str, BTreeMap<&str, f64>> {
    perf.iter()
        .map(|(folder, times)| {
            (
                folder.as_str(),
                times.iter().map(|(i, t)| (i.as_str(), *t)).collect(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"{
      "context": {"date": "2025-03-01"},
      "benchmarks": [
        {"name": "task_run_threads:ivanov:omp_enabled/rt", "real_time": 1500, "time_unit": "ms"},
        {"name": "task_run_threads:ivanov:omp_enabled/rt", "real_time": "2000", "time_unit": "ms"},
        {"name": "task_run_threads:petrov:stl", "real_time": " 2.5 ", "time_unit": "s"},
        {"name": "task_run_threads:ivanov:seq_enabled", "real_time": 8.0e9},
        {"name": "task_run_threads:petrov:tbb", "real_time": 3000000, "time_unit": "us"},
        {"name": "task_run_processes:kozlov_1:mpi", "real_time": 4, "time_unit": "s"},
        {"name": "task_run_threads:ivanov:cuda", "real_time": 1, "time_unit": "s"},
        {"name": "pipeline_run:ivanov:omp", "real_time": 1, "time_unit": "s"},
        {"name": "task_run_threads:ivanov", "real_time": 1, "time_unit": "s"},
        {"name": "task_run_threads:ivanov:stl", "real_time": "fast"},
        {"real_time": 1}
      ]
    }"#;

    fn sample_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("perf_results_threads.json");
        fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(
            parse_name("task_run_threads:ivanov:omp_enabled/iterations:1"),
            Some(("ivanov", "omp"))
        );
        assert_eq!(parse_name("task_run_processes:a:mpi"), Some(("a", "mpi")));
        assert_eq!(parse_name("task_run_threads:a:cuda"), None);
        assert_eq!(parse_name("other:a:seq"), None);
    }

    #[test]
    fn test_load_benchmark_json() {
        let (_dir, path) = sample_file();
        let perf = load_benchmark_json(&path, &[]);
        let perf = sorted(&perf);
        assert_eq!(perf["ivanov"]["omp"], 1.5);
        assert_eq!(perf["ivanov"]["seq"], 8.0);
        assert!(!perf["ivanov"].contains_key("stl"));
        assert_eq!(perf["petrov"]["tbb"], 3.0);
        assert_eq!(perf["petrov"]["stl"], 2.5);
        assert_eq!(perf["kozlov_1"]["mpi"], 4.0);
        assert_eq!(perf.len(), 3);
    }

    #[test]
    fn test_hints_filter_folders() {
        let (_dir, path) = sample_file();
        let perf = load_benchmark_json(&path, &["petrov"]);
        assert_eq!(perf.len(), 1);
        assert!(perf.contains_key("petrov"));
    }

    #[test]
    fn test_unreadable_files_are_empty() {
        let dir = tempdir().unwrap();
        assert!(load_benchmark_json(&dir.path().join("missing.json"), &[]).is_empty());
        let path = dir.path().join("broken.json");
        fs::write(&path, "[").unwrap();
        assert!(load_benchmark_json(&path, &[]).is_empty());
    }

    #[test]
    fn test_locate_benchmark() {
        let dir = tempdir().unwrap();
        assert!(locate_benchmark(dir.path(), "threads").is_none());
        fs::write(dir.path().join("perf_results_threads.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("install/bin")).unwrap();
        fs::write(dir.path().join("install/bin/perf_results_threads.json"), "{}").unwrap();
        assert_eq!(
            locate_benchmark(dir.path(), "threads"),
            Some(dir.path().join("install/bin/perf_results_threads.json"))
        );
    }
}
