//! Quiz task types.

use crate::error::{Error, Result};
use crate::types::{new_id, TaskId};
use serde::{Deserialize, Serialize};

/// Kind of generated learning item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    MultipleChoice,
    OpenQuestion,
    Matching,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::MultipleChoice => "multiple_choice",
            TaskType::OpenQuestion => "open_question",
            TaskType::Matching => "matching",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "multiple_choice" => Some(TaskType::MultipleChoice),
            "open_question" => Some(TaskType::OpenQuestion),
            "matching" => Some(TaskType::Matching),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One left/right pair of a matching task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub key: String,
    pub value: String,
}

impl MatchingPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Type-specific payload of a task.
///
/// Serializes as `{"task_type": "...", "task_data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task_type", content = "task_data", rename_all = "snake_case")]
pub enum TaskData {
    MultipleChoice {
        question: String,
        options: Vec<String>,
        correct_answer: String,
    },
    OpenQuestion {
        question: String,
    },
    Matching {
        pairs: Vec<MatchingPair>,
    },
}

impl TaskData {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskData::MultipleChoice { .. } => TaskType::MultipleChoice,
            TaskData::OpenQuestion { .. } => TaskType::OpenQuestion,
            TaskData::Matching { .. } => TaskType::Matching,
        }
    }

    /// Check the shape rules the JSON schema alone cannot express.
    pub fn validate(&self) -> Result<()> {
        match self {
            TaskData::MultipleChoice {
                question,
                options,
                correct_answer,
            } => {
                require_text(question, "multiple_choice question")?;
                if options.len() < 2 {
                    return Err(Error::InvalidInput(format!(
                        "multiple_choice needs at least 2 options, got {}",
                        options.len()
                    )));
                }
                if !options.iter().any(|o| o.trim() == correct_answer.trim()) {
                    return Err(Error::InvalidInput(format!(
                        "correct_answer '{}' is not one of the options",
                        correct_answer
                    )));
                }
                Ok(())
            }
            TaskData::OpenQuestion { question } => require_text(question, "open_question question"),
            TaskData::Matching { pairs } => {
                if pairs.is_empty() {
                    return Err(Error::InvalidInput("matching task has no pairs".to_string()));
                }
                for pair in pairs {
                    require_text(&pair.key, "matching key")?;
                    require_text(&pair.value, "matching value")?;
                }
                Ok(())
            }
        }
    }

    /// The `task_data` object alone, without the type tag.
    pub fn payload(&self) -> Result<serde_json::Value> {
        let mut tagged = serde_json::to_value(self)?;
        tagged
            .get_mut("task_data")
            .map(serde_json::Value::take)
            .ok_or_else(|| Error::Serialization("task_data missing after serialization".to_string()))
    }

    /// Rebuild from a type tag and its `task_data` object.
    pub fn from_parts(task_type: TaskType, payload: serde_json::Value) -> Result<Self> {
        let tagged = serde_json::json!({
            "task_type": task_type.as_str(),
            "task_data": payload,
        });
        Ok(serde_json::from_value(tagged)?)
    }
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} is empty", what)));
    }
    Ok(())
}

/// A generated learning item.
///
/// Serializes as `{"id": ..., "task_type": ..., "task_data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub data: TaskData,
}

/// Flat wire form of [`Task`].
#[derive(Serialize, Deserialize)]
struct TaskRecord {
    id: TaskId,
    task_type: TaskType,
    task_data: serde_json::Value,
}

impl TryFrom<TaskRecord> for Task {
    type Error = Error;

    fn try_from(record: TaskRecord) -> Result<Self> {
        Ok(Self {
            id: record.id,
            data: TaskData::from_parts(record.task_type, record.task_data)?,
        })
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let task_type = task.task_type();
        let task_data = task.data.payload().unwrap_or_default();
        Self {
            id: task.id,
            task_type,
            task_data,
        }
    }
}

impl Task {
    pub fn new(data: TaskData) -> Self {
        Self { id: new_id(), data }
    }

    pub fn task_type(&self) -> TaskType {
        self.data.task_type()
    }
}
