//! Data access to the hosted store.
//!
//! Everything that reads or writes rows goes through [`Backend`], passed in
//! explicitly so tests can swap in a fake. [`crate::api::RestBackend`] is the
//! HTTP implementation.

use crate::catalog::{PriorityCode, StatusCode};
use crate::error::BackendError;
use crate::models::{
    NewProject, NewTag, NewTask, Project, ProjectUpdate, Tag, Task, TaskPriority, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskOrder {
    #[default]
    NewestFirst,
    DeadlineAsc,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskQuery {
    pub owner: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Exclusive lower bound.
    pub deadline_after: Option<DateTime<Utc>>,
    pub deadline_until: Option<DateTime<Utc>>,
    pub order: TaskOrder,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectQuery {
    pub owner: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, BackendError>;

    async fn create_project(&self, project: &NewProject) -> Result<Project, BackendError>;

    async fn update_project(&self, id: &str, update: &ProjectUpdate)
        -> Result<(), BackendError>;

    async fn delete_project(&self, id: &str) -> Result<(), BackendError>;

    /// Tasks with their project name and tags inlined.
    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, BackendError>;

    async fn create_task(&self, task: &NewTask) -> Result<Task, BackendError>;

    async fn delete_task(&self, id: &str) -> Result<(), BackendError>;

    async fn update_task_status(&self, id: &str, status: &StatusCode)
        -> Result<(), BackendError>;

    async fn update_task_priority(
        &self,
        id: &str,
        priority: &PriorityCode,
    ) -> Result<(), BackendError>;

    /// Replaces every tag link of the task.
    async fn replace_task_tags(&self, id: &str, tag_ids: &[String])
        -> Result<(), BackendError>;

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, BackendError>;

    async fn list_priorities(&self) -> Result<Vec<TaskPriority>, BackendError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, BackendError>;

    async fn create_tag(&self, tag: &NewTag) -> Result<Tag, BackendError>;
}
