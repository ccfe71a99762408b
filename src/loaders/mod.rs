pub use self::benchmark::{PerfMap, load_benchmark_json, locate_benchmark, sorted};
pub use self::commits::GitCommitLog;
pub use self::discovery::{TaskFolder, discover_tasks};
pub use self::student_info::StudentInfo;

mod benchmark;
mod commits;
mod discovery;
mod student_info;
