use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaskIdError {
    #[error("task id cannot be empty")]
    Empty,
    #[error("task id segment {index} is empty in {raw:?}")]
    EmptySegment { raw: String, index: usize },
    #[error("task id contains invalid character {ch:?} in {raw:?}")]
    InvalidChar { raw: String, ch: char },
}

/// Practice task identifier, matching the task's route path
/// (e.g. `toefl/reading/daily-life`, `toeic/part5`).
///
/// Segments are separated by `/` and contain only lowercase ASCII letters, digits
/// and `-`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

// ─── Known Tasks ───────────────────────────────────────────────────────────────

const KNOWN_TASKS: [(&str, &str); 11] = [
    ("toefl/reading/complete-words", "TOEFL Reading: Complete Words"),
    ("toefl/reading/daily-life", "TOEFL Reading: Daily Life"),
    ("toefl/reading/academic", "TOEFL Reading: Academic"),
    ("toefl/writing/build-sentence", "TOEFL Writing: Build Sentence"),
    ("toefl/writing/email", "TOEFL Writing: Email"),
    ("toefl/writing/discussion", "TOEFL Writing: Discussion"),
    ("toefl/speaking/listen-repeat", "TOEFL Speaking: Listen & Repeat"),
    ("toefl/speaking/interview", "TOEFL Speaking: Interview"),
    ("toeic/part5", "TOEIC Part 5"),
    ("toeic/part6", "TOEIC Part 6"),
    ("toeic/part7", "TOEIC Part 7"),
];

impl TaskId {
    /// Validate and wrap a task id.
    ///
    /// # Errors
    ///
    /// Returns `TaskIdError` if the id is empty, has an empty segment, or contains
    /// characters outside `[a-z0-9-]`.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskIdError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskIdError::Empty);
        }
        for (index, segment) in trimmed.split('/').enumerate() {
            if segment.is_empty() {
                return Err(TaskIdError::EmptySegment {
                    raw: trimmed.to_string(),
                    index,
                });
            }
            if let Some(ch) = segment
                .chars()
                .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
            {
                return Err(TaskIdError::InvalidChar {
                    raw: trimmed.to_string(),
                    ch,
                });
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// All tasks the player ships with, in menu order.
    pub fn known() -> impl Iterator<Item = TaskId> {
        KNOWN_TASKS.iter().map(|(id, _)| TaskId((*id).to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name for known tasks, the raw id otherwise.
    #[must_use]
    pub fn label(&self) -> &str {
        KNOWN_TASKS
            .iter()
            .find(|(id, _)| *id == self.0)
            .map_or(self.0.as_str(), |(_, label)| *label)
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        KNOWN_TASKS.iter().any(|(id, _)| *id == self.0)
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({})", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TaskId {
    type Error = TaskIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for String {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

// ─── Problem Ids ───────────────────────────────────────────────────────────────

/// Identifies one problem inside a task: `{task}/{file stem}` with an optional
/// `#{sub question}` suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    /// Build from the question source file; a trailing `.json` (any case) is dropped.
    #[must_use]
    pub fn build(task: &TaskId, source_file: &str, sub_question: Option<&str>) -> Self {
        let file_id = strip_json_suffix(source_file);
        match sub_question {
            Some(sub) => Self(format!("{task}/{file_id}#{sub}")),
            None => Self(format!("{task}/{file_id}")),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn strip_json_suffix(file: &str) -> &str {
    let len = file.len();
    if len >= 5 && file.is_char_boundary(len - 5) && file[len - 5..].eq_ignore_ascii_case(".json")
    {
        &file[..len - 5]
    } else {
        file
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
