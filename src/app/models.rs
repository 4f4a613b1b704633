use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TaskId = i64;

// Wire names are the lowercase words the tasks table stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn next(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn previous(self) -> Priority {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }
}

// New tasks start out medium unless the user picks otherwise.
impl Default for Priority {
    fn default() -> Priority {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Done,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Pending => "pending",
            Status::InProgress => "in progress",
            Status::Done => "done",
        };
        write!(f, "{label}")
    }
}

// A row of the remote tasks table. Id and created_at are assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: String,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

// Insert payload: everything the server does not assign itself.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub owner_id: String,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
}

// Partial update carrying only the field that changed.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn status(status: Status) -> TaskPatch {
        TaskPatch {
            status: Some(status),
            ..TaskPatch::default()
        }
    }

    pub fn priority(priority: Priority) -> TaskPatch {
        TaskPatch {
            priority: Some(priority),
            ..TaskPatch::default()
        }
    }
}

// Proof of authentication. Held in memory for the lifetime of the process;
// the owner identifier gates every task operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Status::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::from_str::<Status>("\"pending\"").unwrap(),
            Status::Pending
        );
    }

    #[test]
    fn priority_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Priority>("\"medium\"").unwrap(),
            Priority::Medium
        );
    }

    #[test]
    fn priority_cycling_reaches_every_value() {
        let mut seen = vec![Priority::default()];
        seen.push(seen[0].next());
        seen.push(seen[1].next());
        for priority in Priority::ALL {
            assert!(seen.contains(&priority));
        }
        assert_eq!(Priority::Medium.next().previous(), Priority::Medium);
    }
}
