use crate::checks;
use crate::config::{Config, PlagiarismConfig, Window};
use crate::deadlines;
use crate::loaders::{PerfMap, TaskFolder};
use crate::model::{
    CommitLog, Deadline, EfficiencyPolicy, Identity, ProcessScore, ProcessSubmission, ProcessTask,
    Rules, SidePoints, Student, TaskScore, ThreadSubmission, ThreadTask,
};
use crate::variant;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Implementation holding the parallel side of a process task; its
/// presence sends a folder to the processes track.
pub const MPI: &str = "mpi";
pub const SEQ: &str = "seq";

#[derive(Clone, Debug, PartialEq)]
pub struct ThreadsRow {
    pub name: String,
    pub group: String,
    pub variant: String,
    /// One cell per thread task, in task order.
    pub cells: Vec<TaskScore>,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessesRow {
    pub name: String,
    pub group: String,
    /// One variant per process task, in task order.
    pub variants: Vec<String>,
    pub scores: Vec<ProcessScore>,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariantRow {
    pub name: String,
    pub group: String,
    pub threads: String,
    pub processes: Vec<String>,
}

/// Tasks and students of both tracks, and the scoring context they share.
pub struct Scoreboard {
    salt: String,
    threads_variants_max: usize,
    pub thread_tasks: Vec<ThreadTask>,
    pub process_tasks: Vec<ProcessTask>,
    pub thread_students: Vec<Student>,
    pub process_students: Vec<Student>,
    commits: Box<dyn CommitLog>,
}

impl Scoreboard {
    /// Build the task configuration of both tracks, without students.
    pub fn new(
        config: &Config,
        salt: &str,
        today: NaiveDate,
        commits: Box<dyn CommitLog>,
    ) -> eyre::Result<Self> {
        let efficiency = EfficiencyPolicy {
            num_proc: config.efficiency.num_proc,
            scale: config.efficiency_scale(),
        };
        let rules = |deadline: Deadline| Rules {
            deadline,
            copy_coefficient: config.copying.coefficient,
            efficiency: efficiency.clone(),
        };

        let threads_cfg = &config.threads.tasks;
        let threads_window = config.deadlines.threads_window.unwrap_or(Window::THREADS);
        let thread_deadlines = deadlines::schedule(threads_cfg.len(), &threads_window, today, |i| {
            config.deadlines.threads.get(&threads_cfg[i].name)
        })?;
        let thread_tasks = threads_cfg
            .iter()
            .zip(thread_deadlines)
            .map(|(cfg, deadline)| ThreadTask {
                name: cfg.name.clone(),
                title: cfg.title.clone().unwrap_or_else(|| cfg.name.clone()),
                solution_max: cfg.solution,
                performance_max: cfg.performance,
                report_max: cfg.report,
                rules: rules(deadline),
            })
            .collect::<Vec<_>>();

        let processes_cfg = &config.processes.tasks;
        let processes_window = config
            .deadlines
            .processes_window
            .unwrap_or(Window::PROCESSES);
        let process_deadlines =
            deadlines::schedule(processes_cfg.len(), &processes_window, today, |i| {
                config.deadlines.process_shift(i + 1)
            })?;
        let process_tasks = processes_cfg
            .iter()
            .zip(process_deadlines)
            .enumerate()
            .map(|(i, (cfg, deadline))| ProcessTask {
                name: cfg.name.clone(),
                title: cfg.title.clone().unwrap_or_else(|| format!("Task {}", i + 1)),
                seq: SidePoints {
                    solution: cfg.seq.solution,
                    performance: cfg.seq.performance,
                },
                mpi: SidePoints {
                    solution: cfg.mpi.solution,
                    performance: cfg.mpi.performance,
                },
                report_max: cfg.report,
                variants_max: cfg.variants_max,
                rules: rules(deadline),
            })
            .collect::<Vec<_>>();

        for task in &thread_tasks {
            debug!(task = %task.name, deadline = %task.rules.deadline.label, "thread task");
        }
        for task in &process_tasks {
            debug!(task = %task.name, deadline = %task.rules.deadline.label, "process task");
        }
        info!(
            threads = thread_tasks.len(),
            processes = process_tasks.len(),
            "tasks configured"
        );
        Ok(Scoreboard {
            salt: salt.to_owned(),
            threads_variants_max: config.threads.variants_max,
            thread_tasks,
            process_tasks,
            thread_students: Vec::new(),
            process_students: Vec::new(),
            commits,
        })
    }

    /// Build the whole scoreboard from discovered task folders and
    /// benchmark results. Structural inconsistencies are fatal.
    pub fn build(
        config: &Config,
        salt: &str,
        today: NaiveDate,
        folders: &[TaskFolder],
        perf_threads: &PerfMap,
        perf_processes: &PerfMap,
        commits: Box<dyn CommitLog>,
    ) -> eyre::Result<Self> {
        let mut board = Self::new(config, salt, today, commits)?;
        let (processes, threads): (Vec<&TaskFolder>, Vec<&TaskFolder>) =
            folders.iter().partition(|f| f.has(MPI));
        info!(
            threads = threads.len(),
            processes = processes.len(),
            "task folders per track"
        );
        board.add_thread_students(&threads, perf_threads, &config.plagiarism);
        board.add_process_students(&processes, perf_processes, &config.plagiarism)?;
        checks::ensure_headcount("threads", threads.iter().copied(), board.thread_students.len())?;
        checks::ensure_headcount(
            "processes",
            processes.iter().copied(),
            board.process_students.len(),
        )?;
        info!(
            threads = board.thread_students.len(),
            processes = board.process_students.len(),
            "students assembled"
        );
        Ok(board)
    }

    /// Implementation directories to look for when discovering folders.
    pub fn implementations(config: &Config) -> Vec<&str> {
        let mut implementations = config
            .threads
            .tasks
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>();
        for implementation in [SEQ, MPI] {
            if !implementations.contains(&implementation) {
                implementations.push(implementation);
            }
        }
        implementations
    }

    /// One student per folder: every thread implementation lives in the
    /// same folder.
    fn add_thread_students(
        &mut self,
        folders: &[&TaskFolder],
        perf: &PerfMap,
        plagiarism: &PlagiarismConfig,
    ) {
        let no_times = HashMap::new();
        for folder in folders {
            let mut student = Student::new(
                folder.identity(),
                folder.info.as_ref().and_then(|i| i.student_id()),
            );
            let times = perf.get(&folder.name).unwrap_or(&no_times);
            let seq_time = times.get(SEQ).copied();
            for task in &self.thread_tasks {
                student.add_thread_submission(ThreadSubmission {
                    task_name: task.name.clone(),
                    status: folder.status(&task.name),
                    work_dir: folder.path.clone(),
                    perf_time: times.get(&task.name).copied(),
                    seq_time,
                    report_present: folder.report_present,
                    copied: plagiarism.is_thread_copied(&task.name, &folder.name),
                });
            }
            self.thread_students.push(student);
        }
    }

    /// Merge process folders by student identity, one folder per numbered
    /// task.
    fn add_process_students(
        &mut self,
        folders: &[&TaskFolder],
        perf: &PerfMap,
        plagiarism: &PlagiarismConfig,
    ) -> eyre::Result<()> {
        let no_times = HashMap::new();
        let mut by_identity: BTreeMap<Identity, Student> = BTreeMap::new();
        for folder in folders {
            let Some(info) = folder.info.as_ref().filter(|i| !i.identity().is_empty()) else {
                warn!(
                    folder = %folder.path.display(),
                    "skipping task folder with empty student info"
                );
                continue;
            };
            let identity = info.identity();
            let number = checks::task_number(info, folder, self.process_tasks.len())?;
            let task_name = &self.process_tasks[number - 1].name;
            let student = by_identity
                .entry(identity.clone())
                .or_insert_with(|| Student::new(identity, info.student_id()));
            checks::ensure_unique_submission(student, task_name, folder)?;
            let times = perf.get(&folder.name).unwrap_or(&no_times);
            student.add_process_submission(
                task_name,
                ProcessSubmission {
                    task_number: number,
                    seq_status: folder.status(SEQ),
                    mpi_status: folder.status(MPI),
                    work_dir: folder.path.clone(),
                    seq_time: times.get(SEQ).copied(),
                    mpi_time: times.get(MPI).copied(),
                    report_present: folder.report_present,
                    seq_copied: plagiarism.is_process_copied(SEQ, &folder.name),
                    mpi_copied: plagiarism.is_process_copied(MPI, &folder.name),
                },
            );
        }
        self.process_students = by_identity.into_values().collect();
        Ok(())
    }

    pub fn thread_variant(&self, identity: &Identity) -> String {
        variant::display_variant(identity, &self.salt, self.threads_variants_max)
    }

    pub fn process_variants(&self, identity: &Identity) -> Vec<String> {
        self.process_tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                variant::display_variant(
                    identity,
                    &variant::process_salt(&self.salt, i + 1),
                    task.variants_max,
                )
            })
            .collect()
    }

    pub fn variant_row(&self, identity: &Identity) -> VariantRow {
        VariantRow {
            name: identity.display_name(),
            group: identity.group.clone(),
            threads: self.thread_variant(identity),
            processes: self.process_variants(identity),
        }
    }

    fn threads_row(&self, student: &Student) -> ThreadsRow {
        let commits = self.commits.as_ref();
        ThreadsRow {
            name: student.display_name(),
            group: student.group().to_owned(),
            variant: self.thread_variant(&student.identity),
            cells: self
                .thread_tasks
                .iter()
                .map(|task| student.score_thread(task, commits))
                .collect(),
            total: student.threads_total(&self.thread_tasks, commits),
        }
    }

    fn processes_row(&self, student: &Student) -> ProcessesRow {
        let commits = self.commits.as_ref();
        ProcessesRow {
            name: student.display_name(),
            group: student.group().to_owned(),
            variants: self.process_variants(&student.identity),
            scores: self
                .process_tasks
                .iter()
                .map(|task| student.score_process(task, commits))
                .collect(),
            total: student.processes_total(&self.process_tasks, commits),
        }
    }

    pub fn threads_rows(&self) -> Vec<ThreadsRow> {
        self.thread_students
            .iter()
            .map(|s| self.threads_row(s))
            .collect()
    }

    pub fn processes_rows(&self) -> Vec<ProcessesRow> {
        self.process_students
            .iter()
            .map(|s| self.processes_row(s))
            .collect()
    }

    pub fn threads_rows_for_group(&self, group: &str) -> Vec<ThreadsRow> {
        self.thread_students
            .iter()
            .filter(|s| s.group() == group)
            .map(|s| self.threads_row(s))
            .collect()
    }

    pub fn processes_rows_for_group(&self, group: &str) -> Vec<ProcessesRow> {
        self.process_students
            .iter()
            .filter(|s| s.group() == group)
            .map(|s| self.processes_row(s))
            .collect()
    }

    fn groups(students: &[Student]) -> Vec<String> {
        students
            .iter()
            .map(|s| s.group())
            .filter(|g| !g.is_empty())
            .map(str::to_owned)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn threads_groups(&self) -> Vec<String> {
        Self::groups(&self.thread_students)
    }

    pub fn processes_groups(&self) -> Vec<String> {
        Self::groups(&self.process_students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::StudentInfo;
    use crate::model::{CellClass, Status};
    use chrono::{Duration, NaiveDateTime};
    use serde_json::json;
    use std::path::PathBuf;

    const CONFIG: &str = r#"
[copying]
coefficient = 0.5

[efficiency]
num_proc = 4

[[efficiency_scale]]
threshold = 0.5
percent = 1.0

[[efficiency_scale]]
threshold = 0.25
percent = 0.5

[threads]
variants_max = 30

[[threads.tasks]]
name = "seq"
S = 5

[[threads.tasks]]
name = "omp"
S = 20
A = 10
R = 2

[[processes.tasks]]
name = "mpi_task_1"
R = 2
variants_max = 20
seq = { S = 5 }
mpi = { S = 10, A = 8 }

[[processes.tasks]]
name = "mpi_task_2"
variants_max = 25
seq = { S = 5 }
mpi = { S = 10, A = 8 }

[[processes.tasks]]
name = "mpi_task_3"
variants_max = 30
seq = { S = 5 }
mpi = { S = 10, A = 8 }

[deadlines.processes]
task_3 = "no deadline"

[plagiarism.threads]
omp = ["sidorov"]
"#;

    fn config() -> Config {
        Config::parse(CONFIG).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn commits() -> Box<dyn CommitLog> {
        Box::new(HashMap::<PathBuf, NaiveDateTime>::new())
    }

    fn folder(name: &str, implementations: &[&str], info: Option<StudentInfo>) -> TaskFolder {
        TaskFolder {
            name: name.into(),
            path: PathBuf::from("tasks").join(name),
            implementations: implementations
                .iter()
                .map(|&i| (i.to_owned(), Status::Done))
                .collect(),
            info,
            report_present: false,
        }
    }

    fn disabled(mut folder: TaskFolder) -> TaskFolder {
        folder.path = folder.path.with_file_name(format!("{}_disabled", folder.name));
        for status in folder.implementations.values_mut() {
            *status = Status::Disabled;
        }
        folder
    }

    fn person(last: &str, group: &str) -> StudentInfo {
        StudentInfo::new(last, "First", "Middle", group)
    }

    fn mpi_folder(name: &str, last: &str, number: serde_json::Value) -> TaskFolder {
        folder(
            name,
            &["seq", "mpi"],
            Some(person(last, "g-2").with_task_number(number)),
        )
    }

    fn perf(entries: &[(&str, &str, f64)]) -> PerfMap {
        let mut perf = PerfMap::new();
        for &(folder, implementation, time) in entries {
            perf.entry(folder.to_owned())
                .or_default()
                .insert(implementation.to_owned(), time);
        }
        perf
    }

    fn build(folders: &[TaskFolder], perf_threads: &PerfMap) -> eyre::Result<Scoreboard> {
        Scoreboard::build(
            &config(),
            "learning_process/ppc",
            today(),
            folders,
            perf_threads,
            &PerfMap::new(),
            commits(),
        )
    }

    fn sample_folders() -> Vec<TaskFolder> {
        vec![
            folder("ivanov", &["seq", "omp"], Some(person("Ivanov", "g-1"))),
            folder("sidorov", &["seq", "omp"], Some(person("Sidorov", "G-1"))),
            disabled(folder("zaitsev", &["seq"], Some(person("Zaitsev", "g-3")))),
            mpi_folder("kozlov_1", "Kozlov", json!(1)),
            mpi_folder("kozlov_3", "Kozlov", json!("3")),
            mpi_folder("orlov_2", "Orlov", json!(2)),
        ]
    }

    #[test]
    fn test_tasks_from_configuration() {
        let board = Scoreboard::new(&config(), "salt", today(), commits()).unwrap();
        assert_eq!(board.thread_tasks.len(), 2);
        assert_eq!(board.thread_tasks[1].performance_max, 10);
        assert_eq!(board.thread_tasks[1].rules.copy_coefficient, 0.5);
        assert_eq!(board.thread_tasks[1].rules.efficiency.num_proc, 4);
        fn labels<'a>(deadlines: impl Iterator<Item = &'a Deadline>) -> Vec<&'a str> {
            deadlines.map(|d| d.label.as_str()).collect()
        }
        // Feb 1 .. May 15 split in two
        assert_eq!(
            labels(board.thread_tasks.iter().map(|t| &t.rules.deadline)),
            vec!["25 Mar", "15 May"]
        );
        assert_eq!(
            labels(board.process_tasks.iter().map(|t| &t.rules.deadline)),
            vec!["4 Nov", "24 Nov", "no deadline"]
        );
        assert_eq!(board.process_tasks[2].title, "Task 3");
        assert_eq!(board.process_tasks[2].rules.deadline.due, None);
    }

    #[test]
    fn test_implementations() {
        assert_eq!(
            Scoreboard::implementations(&config()),
            vec!["seq", "omp", "mpi"]
        );
    }

    #[test]
    fn test_thread_scores() {
        let perf = perf(&[
            ("ivanov", "seq", 8.0),
            ("ivanov", "omp", 2.0),
            ("sidorov", "seq", 8.0),
            ("sidorov", "omp", 16.0),
        ]);
        let board = build(&sample_folders(), &perf).unwrap();
        let rows = board.threads_rows();
        assert_eq!(rows.len(), 3);
        let ivanov = &rows[0];
        assert_eq!(ivanov.name, "Ivanov First Middle");
        assert_eq!(ivanov.cells[1].performance_points, 10.0);
        assert_eq!(ivanov.total, 35.0);
        let sidorov = &rows[1];
        assert_eq!(sidorov.cells[1].performance_points, 0.0);
        assert_eq!(sidorov.cells[1].copy_penalty, -10.0);
        assert_eq!(sidorov.total, 15.0);
        let zaitsev = &rows[2];
        assert_eq!(zaitsev.cells[0].solution_class, CellClass::Muted);
        assert_eq!(zaitsev.cells[0].copy_class, CellClass::Warning);
        assert_eq!(zaitsev.cells[1], TaskScore::default());
        assert_eq!(zaitsev.total, 5.0);
    }

    #[test]
    fn test_process_identity_merge() {
        let board = build(&sample_folders(), &PerfMap::new()).unwrap();
        assert_eq!(board.process_students.len(), 2);
        let kozlov = &board.process_students[0];
        assert_eq!(kozlov.identity.last_name, "Kozlov");
        assert!(kozlov.process_submission("mpi_task_1").is_some());
        assert!(kozlov.process_submission("mpi_task_2").is_none());
        assert!(kozlov.process_submission("mpi_task_3").is_some());
        let rows = board.processes_rows();
        assert_eq!(rows[0].scores.len(), 3);
        assert_eq!(rows[0].scores[1], ProcessScore::default());
        assert_eq!(rows[0].total, 30.0);
        assert_eq!(rows[0].variants.len(), 3);
        assert_eq!(rows[1].total, 15.0);
    }

    #[test]
    fn test_duplicate_process_task_is_fatal() {
        let mut folders = sample_folders();
        folders.push(mpi_folder("kozlov_1_again", "Kozlov", json!(1)));
        let err = build(&folders, &PerfMap::new()).err().unwrap().to_string();
        assert!(err.contains("duplicate process task mpi_task_1"), "{err}");
        assert!(err.contains("kozlov_1_again"), "{err}");
    }

    #[test]
    fn test_task_number_out_of_range_is_fatal() {
        let mut folders = sample_folders();
        folders.push(mpi_folder("orlov_4", "Orlov", json!(4)));
        let err = build(&folders, &PerfMap::new()).err().unwrap().to_string();
        assert!(err.contains("out of range"), "{err}");
        assert!(err.contains("orlov_4"), "{err}");
    }

    #[test]
    fn test_task_number_not_an_integer_is_fatal() {
        let folders = vec![mpi_folder("orlov_x", "Orlov", json!("x"))];
        assert!(build(&folders, &PerfMap::new()).is_err());
    }

    #[test]
    fn test_anonymous_process_folder_is_skipped() {
        let mut folders = sample_folders();
        folders.push(folder("nobody", &["seq", "mpi"], None));
        folders.push(folder("blank", &["mpi"], Some(StudentInfo::default())));
        let board = build(&folders, &PerfMap::new()).unwrap();
        assert_eq!(board.process_students.len(), 2);
    }

    #[test]
    fn test_anonymous_thread_folder_breaks_headcount() {
        let mut folders = sample_folders();
        folders.push(folder("nobody", &["seq"], None));
        let err = build(&folders, &PerfMap::new()).err().unwrap().to_string();
        assert!(err.contains("threads track mismatch"), "{err}");
    }

    #[test]
    fn test_thread_student_in_two_folders_breaks_headcount() {
        let mut folders = sample_folders();
        folders.push(folder("ivanov_bis", &["seq"], Some(person("Ivanov", "G-1"))));
        assert!(build(&folders, &PerfMap::new()).is_err());
    }

    #[test]
    fn test_groups() {
        let board = build(&sample_folders(), &PerfMap::new()).unwrap();
        assert_eq!(board.threads_groups(), vec!["G-1", "G-3"]);
        assert_eq!(board.processes_groups(), vec!["G-2"]);
        let rows = board.threads_rows_for_group("G-1");
        assert_eq!(rows.len(), 2);
        assert!(board.processes_rows_for_group("G-1").is_empty());
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let perf = perf(&[("ivanov", "seq", 8.0), ("ivanov", "omp", 3.0)]);
        let first = build(&sample_folders(), &perf).unwrap();
        let second = build(&sample_folders(), &perf).unwrap();
        assert_eq!(first.threads_rows(), second.threads_rows());
        assert_eq!(first.processes_rows(), second.processes_rows());
    }

    #[test]
    fn test_variants() {
        let board = build(&sample_folders(), &PerfMap::new()).unwrap();
        let identity = Identity::new("Ivanov", "First", "Middle", "g-1");
        let row = board.variant_row(&identity);
        assert_eq!(row.threads, board.threads_rows()[0].variant);
        let number = row.threads.parse::<usize>().unwrap();
        assert!((1..=30).contains(&number));
        assert_eq!(row.processes.len(), 3);
        assert!(row.processes[1].parse::<usize>().unwrap() <= 25);
    }

    #[test]
    fn test_deadline_penalty_through_commit_log() {
        let board = Scoreboard::new(&config(), "salt", today(), commits()).unwrap();
        let due = board.thread_tasks[1].rules.deadline.due.unwrap();
        let late: Box<dyn CommitLog> = Box::new(HashMap::from([(
            PathBuf::from("tasks/ivanov/omp"),
            due + Duration::days(3),
        )]));
        let board = Scoreboard::build(
            &config(),
            "salt",
            today(),
            &sample_folders(),
            &PerfMap::new(),
            &PerfMap::new(),
            late,
        )
        .unwrap();
        let rows = board.threads_rows();
        assert_eq!(rows[0].cells[1].deadline_penalty, -3);
        assert_eq!(rows[0].cells[0].deadline_penalty, 0);
    }
}
