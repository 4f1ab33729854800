use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    #[serde(other)]
    Other,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub ai_description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub brief_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Inlined `project:projects(name)` expansion
#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct ProjectRef {
    pub name: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub project_id: String,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    #[serde(default, deserialize_with = "flatten_task_tags")]
    pub tags: Vec<Tag>,
}

impl Task {
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_ref().map(|p| p.name.as_str())
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct TaskStatus {
    pub id: String,
    pub name: String,
    pub order: i32,
}

#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct TaskPriority {
    pub id: String,
    pub name: String,
    pub color: String,
    pub order: i32,
}

/// The store returns `tags:task_tags(tag:tags(*))` as join rows, or plain tag
/// objects when the expansion is written without the join alias.
fn flatten_task_tags<'de, D>(deserializer: D) -> Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Row {
        Plain(Tag),
        Joined { tag: Option<Tag> },
    }

    let rows: Option<Vec<Row>> = Option::deserialize(deserializer)?;
    Ok(rows
        .unwrap_or_default()
        .into_iter()
        .filter_map(|row| match row {
            Row::Joined { tag } => tag,
            Row::Plain(tag) => Some(tag),
        })
        .collect())
}

/// Input for a new task, before it is checked against the loaded catalog.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub project_id: String,
    pub status: String,
    pub priority: String,
    pub deadline: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, project_id: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            project_id: project_id.into(),
            status: "todo".to_string(),
            priority: "medium".to_string(),
            ..Default::default()
        }
    }
}

/// Row sent on task insert; status and priority are already validated.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_id: String,
    pub status: String,
    pub priority: String,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub ai_description: String,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct ProjectUpdate {
    pub name: String,
    pub description: String,
    pub ai_description: Option<String>,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn task(id: &str, title: &str, status: &str, priority: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            status: status.to_string(),
            priority: priority.to_string(),
            project_id: "p1".to_string(),
            deadline: None,
            created_at: None,
            project: None,
            tags: Vec::new(),
        }
    }

    pub fn status(id: &str, order: i32) -> TaskStatus {
        TaskStatus {
            id: id.to_string(),
            name: id.to_string(),
            order,
        }
    }

    pub fn priority(id: &str, order: i32) -> TaskPriority {
        TaskPriority {
            id: id.to_string(),
            name: id.to_string(),
            color: "#888888".to_string(),
            order,
        }
    }

    pub fn project(id: &str, status: ProjectStatus) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {}", id),
            description: "Landing page".to_string(),
            ai_description: None,
            status,
            brief_url: None,
            created_at: "2026-10-01T09:00:00Z".parse().unwrap(),
        }
    }
}
