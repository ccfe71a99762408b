use crate::config::Config;
use crate::loaders::{GitCommitLog, PerfMap, discover_tasks, load_benchmark_json, locate_benchmark};
use crate::model::Identity;
use crate::scoreboard::Scoreboard;
use clap::{ArgAction, Parser};
use eyre::{WrapErr, bail};
use std::path::{Path, PathBuf};
use tracing::{Level, info, trace};

mod checks;
mod config;
mod deadlines;
mod display;
mod loaders;
mod model;
mod output;
mod scoreboard;
mod stats;
mod variant;

/// Compute parallel programming course grades from submission evidence
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Course configuration file
    #[arg(short, long, default_value = "scoreboard.toml")]
    config: PathBuf,
    /// Repository root, tasks are read from its `tasks` directory
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
    /// Directory receiving the CSV tables
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Salt of the variant assignment [default: learning_process/<root name>]
    #[arg(long)]
    salt: Option<String>,
    /// Benchmark results of the threads track
    #[arg(long)]
    perf_threads: Option<PathBuf>,
    /// Benchmark results of the processes track
    #[arg(long)]
    perf_processes: Option<PathBuf>,
    /// Look up the variants of a student given as "LAST;FIRST;MIDDLE;GROUP"
    #[arg(long, value_parser = parse_identity)]
    variant: Vec<Identity>,
    /// Set verbosity level
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_identity(s: &str) -> Result<Identity, String> {
    let parts = s.split(';').map(str::trim).collect::<Vec<_>>();
    if parts.len() > 4 {
        return Err(format!("too many fields in {s:?}, expected LAST;FIRST;MIDDLE;GROUP"));
    }
    let field = |i: usize| parts.get(i).copied().unwrap_or_default();
    let identity = Identity::new(field(0), field(1), field(2), field(3));
    if identity.is_empty() {
        return Err("empty student identity".to_owned());
    }
    Ok(identity)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn default_salt(root: &Path) -> eyre::Result<String> {
    let root = std::fs::canonicalize(root)
        .wrap_err_with(|| format!("cannot resolve repository root {}", root.display()))?;
    let Some(name) = root.file_name() else {
        bail!("repository root {} has no name to derive a salt from", root.display());
    };
    Ok(format!("learning_process/{}", name.to_string_lossy()))
}

fn load_perf(explicit: Option<&Path>, root: &Path, track: &str, hints: &[&str]) -> PerfMap {
    let Some(path) = explicit
        .map(Path::to_path_buf)
        .or_else(|| locate_benchmark(root, track))
    else {
        return PerfMap::new();
    };
    let perf = load_benchmark_json(&path, hints);
    trace!(track, perf = ?loaders::sorted(&perf), "benchmark results");
    perf
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(args.verbose);
    let config = Config::load(&args.config)?;
    info!(path = %args.config.display(), "configuration loaded");
    let salt = match &args.salt {
        Some(salt) => salt.clone(),
        None => default_salt(&args.root)?,
    };
    let folders = discover_tasks(
        &args.root.join("tasks"),
        &Scoreboard::implementations(&config),
    )?;
    let names = folders.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
    let perf_threads = load_perf(args.perf_threads.as_deref(), &args.root, "threads", &names);
    let perf_processes = load_perf(
        args.perf_processes.as_deref(),
        &args.root,
        "processes",
        &names,
    );
    let board = Scoreboard::build(
        &config,
        &salt,
        chrono::Local::now().date_naive(),
        &folders,
        &perf_threads,
        &perf_processes,
        Box::new(GitCommitLog),
    )?;
    let variants = args
        .variant
        .iter()
        .map(|identity| board.variant_row(identity))
        .collect::<Vec<_>>();
    if let Some(dir) = &args.output {
        output::write_all(dir, &board, &variants)?;
    }
    display::display_threads(&board);
    display::display_processes(&board);
    display::display_variants(&variants);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identity() {
        assert_eq!(
            parse_identity("Ivanov; Ivan ;Ivanovich;ivt-101").unwrap(),
            Identity::new("Ivanov", "Ivan", "Ivanovich", "IVT-101")
        );
        assert_eq!(
            parse_identity("Ivanov").unwrap(),
            Identity::new("Ivanov", "", "", "")
        );
        assert!(parse_identity(";;;").is_err());
        assert!(parse_identity("a;b;c;d;e").is_err());
    }

    #[test]
    fn test_arguments() {
        let args = Args::try_parse_from([
            "scoreboard",
            "-vv",
            "--root",
            "/repo",
            "--variant",
            "Ivanov;Ivan;;g",
            "--variant",
            "Petrov",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, PathBuf::from("scoreboard.toml"));
        assert_eq!(args.variant.len(), 2);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_default_salt() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ppc-2025");
        std::fs::create_dir(&root).unwrap();
        assert_eq!(default_salt(&root).unwrap(), "learning_process/ppc-2025");
        assert!(default_salt(&dir.path().join("missing")).is_err());
    }
}
