use crate::model::Identity;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Student metadata stored in a task folder's `info.json`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StudentInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub middle_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub group_number: String,
    student_id: Option<Value>,
    task_number: Option<Value>,
}

#[derive(Deserialize)]
struct InfoFile {
    #[serde(default)]
    student: StudentInfo,
}

/// Accept strings as well as bare numbers (`"group_number": 101`).
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

impl StudentInfo {
    #[cfg(test)]
    pub fn new(last_name: &str, first_name: &str, middle_name: &str, group_number: &str) -> Self {
        StudentInfo {
            last_name: last_name.to_owned(),
            first_name: first_name.to_owned(),
            middle_name: middle_name.to_owned(),
            group_number: group_number.to_owned(),
            ..StudentInfo::default()
        }
    }

    #[cfg(test)]
    pub fn with_task_number(self, task_number: Value) -> Self {
        StudentInfo {
            task_number: Some(task_number),
            ..self
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            &self.last_name,
            &self.first_name,
            &self.middle_name,
            &self.group_number,
        )
    }

    pub fn student_id(&self) -> Option<String> {
        match &self.student_id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }

    /// Declared process task number; absent means the first task. `None`
    /// when the value is not an integer.
    pub fn task_number(&self) -> Option<i64> {
        match &self.task_number {
            None | Some(Value::Null) => Some(1),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(_) => None,
        }
    }

    /// Raw declared task number, for error messages.
    pub fn raw_task_number(&self) -> String {
        self.task_number
            .as_ref()
            .map_or_else(|| "1".to_owned(), Value::to_string)
    }
}

/// Read `<folder>/info.json`. A missing file means no metadata; an
/// unreadable one is logged and treated the same way.
pub fn load_student_info(folder: &Path) -> Option<StudentInfo> {
    let path = folder.join("info.json");
    if !path.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(&path)
        .map_err(eyre::Report::from)
        .and_then(|content| Ok(serde_json::from_str::<InfoFile>(&content)?));
    match parsed {
        Ok(file) => Some(file.student),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot parse student metadata");
            None
        }
    }
}
