pub use self::efficiency::{DEFAULT_SCALE, EfficiencyPolicy};
pub use self::score::{CellClass, ProcessScore, TaskScore, round2};
pub use self::student::{Identity, Student};
pub use self::submission::{ProcessSubmission, Status, ThreadSubmission};
pub use self::task::{CommitLog, Deadline, ProcessTask, Rules, SidePoints, Task, ThreadTask};

mod efficiency;
mod score;
mod student;
mod submission;
mod task;
