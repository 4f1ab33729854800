use crate::backend::{Backend, TaskQuery};
use crate::catalog::Catalog;
use crate::error::Error;
use crate::filter::TaskFilter;
use crate::kanban::{apply_drop, DropEvent, Transition};
use crate::models::{NewTag, NewTask, Tag, Task, TaskDraft, TaskStatus};
use crate::parser::parse_task_input;
use chrono::{Local, NaiveDate, TimeZone, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// One kanban lane and the visible tasks in it.
#[derive(Debug, PartialEq)]
pub struct Column<'a> {
    pub status: &'a TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Task board state: loaded tasks, status/priority catalog and the active filter.
pub struct Board {
    backend: Arc<dyn Backend>,
    pub tasks: Vec<Task>,
    pub catalog: Catalog,
    pub tags: Vec<Tag>,
    pub filter: TaskFilter,
}

impl Board {
    pub fn new(backend: Arc<dyn Backend>) -> Board {
        Board {
            backend,
            tasks: Vec::new(),
            catalog: Catalog::default(),
            tags: Vec::new(),
            filter: TaskFilter::default(),
        }
    }

    /// Fetches tasks, statuses, priorities and tags. Nothing is replaced
    /// unless every request succeeds.
    pub async fn load(&mut self) -> Result<(), Error> {
        let backend = self.backend.as_ref();
        let (tasks, statuses, priorities, tags) = tokio::try_join!(
            async {
                backend
                    .list_tasks(&TaskQuery::default())
                    .await
                    .map_err(Error::read("tasks"))
            },
            async {
                backend
                    .list_statuses()
                    .await
                    .map_err(Error::read("task statuses"))
            },
            async {
                backend
                    .list_priorities()
                    .await
                    .map_err(Error::read("task priorities"))
            },
            async { backend.list_tags().await.map_err(Error::read("tags")) },
        )
        .map_err(report)?;

        self.tasks = tasks;
        self.catalog = Catalog::new(statuses, priorities);
        self.tags = tags;
        info!(tasks = self.tasks.len(), "board loaded");
        Ok(())
    }

    pub async fn refresh_tasks(&mut self) -> Result<(), Error> {
        let tasks = self
            .backend
            .list_tasks(&TaskQuery::default())
            .await
            .map_err(Error::read("tasks"))?;
        self.tasks = tasks;
        Ok(())
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn columns(&self) -> Vec<Column<'_>> {
        self.columns_in(&Local)
    }

    pub fn columns_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<Column<'_>> {
        self.catalog
            .statuses()
            .iter()
            .map(|status| Column {
                status,
                tasks: self
                    .tasks
                    .iter()
                    .filter(|t| t.status == status.id && self.filter.matches_in(t, tz))
                    .collect(),
            })
            .collect()
    }

    /// Tasks whose status matches no loaded column.
    pub fn orphaned(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.catalog.status(&t.status).is_none())
            .collect()
    }

    pub fn reset_filter(&mut self) {
        self.filter = TaskFilter::default();
    }

    pub async fn drop_task(&mut self, event: &DropEvent) -> Result<Transition, Error> {
        apply_drop(self.backend.as_ref(), &self.catalog, &mut self.tasks, event).await
    }

    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<&Task, Error> {
        self.create_task_on(draft, Local::now().date_naive()).await
    }

    /// `today` is the local calendar day; earlier deadlines are rejected.
    pub async fn create_task_on(
        &mut self,
        draft: TaskDraft,
        today: NaiveDate,
    ) -> Result<&Task, Error> {
        let new_task = self.validate(draft, today)?;
        let task = self
            .backend
            .create_task(&new_task)
            .await
            .map_err(Error::write("new task"))
            .map_err(report)?;

        info!(task_id = %task.id, "task created");
        self.tasks.insert(0, task);
        Ok(&self.tasks[0])
    }

    /// Creates a task from quick-add text, then links any `#tags` that
    /// name existing tags. Once the task exists, a failure to link its tags
    /// is logged and the task is still returned.
    pub async fn quick_add(&mut self, input: &str, project_id: &str) -> Result<&Task, Error> {
        let parsed = parse_task_input(input);
        let mut draft = TaskDraft::new(parsed.title, project_id);
        if let Some(priority) = parsed.priority {
            draft.priority = priority;
        }
        draft.deadline = parsed.deadline;

        let tag_ids: Vec<String> = parsed
            .tags
            .iter()
            .filter_map(|name| {
                let found = self.tags.iter().find(|t| t.name.eq_ignore_ascii_case(name));
                if found.is_none() {
                    warn!(tag = %name, "unknown tag ignored");
                }
                found.map(|t| t.id.clone())
            })
            .collect();

        let id = self.create_task(draft).await?.id.clone();
        if !tag_ids.is_empty() {
            if let Err(err) = self.set_tags(&id, tag_ids).await {
                warn!(task_id = %id, error = %err, "task created without its tags");
            }
        }
        Ok(&self.tasks[0])
    }

    pub async fn delete_task(&mut self, id: &str) -> Result<(), Error> {
        self.backend
            .delete_task(id)
            .await
            .map_err(Error::write("task"))
            .map_err(report)?;
        self.tasks.retain(|t| t.id != id);
        info!(task_id = id, "task deleted");
        Ok(())
    }

    pub async fn set_priority(&mut self, id: &str, priority: &str) -> Result<(), Error> {
        let code = self.catalog.priority_code(priority)?;
        self.backend
            .update_task_priority(id, &code)
            .await
            .map_err(Error::write("task priority"))
            .map_err(report)?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.priority = code.as_str().to_string();
        }
        Ok(())
    }

    pub async fn set_tags(&mut self, id: &str, tag_ids: Vec<String>) -> Result<(), Error> {
        if let Some(unknown) = tag_ids
            .iter()
            .find(|tag_id| !self.tags.iter().any(|t| &t.id == *tag_id))
        {
            return Err(Error::validation(format!("unknown tag '{}'", unknown)));
        }

        self.backend
            .replace_task_tags(id, &tag_ids)
            .await
            .map_err(Error::write("task tags"))
            .map_err(report)?;

        let linked: Vec<Tag> = self
            .tags
            .iter()
            .filter(|t| tag_ids.contains(&t.id))
            .cloned()
            .collect();
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.tags = linked;
        }
        Ok(())
    }

    pub async fn create_tag(&mut self, name: &str, color: &str) -> Result<&Tag, Error> {
        if name.trim().is_empty() {
            return Err(Error::validation("tag name is required"));
        }
        let tag = self
            .backend
            .create_tag(&NewTag {
                name: name.trim().to_string(),
                color: color.to_string(),
            })
            .await
            .map_err(Error::write("tag"))
            .map_err(report)?;

        let at = self
            .tags
            .iter()
            .position(|t| t.name > tag.name)
            .unwrap_or(self.tags.len());
        self.tags.insert(at, tag);
        Ok(&self.tags[at])
    }

    fn validate(&self, draft: TaskDraft, today: NaiveDate) -> Result<NewTask, Error> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(Error::validation("title is required"));
        }
        if draft.project_id.trim().is_empty() {
            return Err(Error::validation("project is required"));
        }
        let status = self.catalog.status_code(&draft.status)?;
        let priority = self.catalog.priority_code(&draft.priority)?;

        let deadline = match draft.deadline {
            Some(day) if day < today => {
                return Err(Error::validation("deadline is in the past"));
            }
            Some(day) => day
                .and_hms_opt(0, 0, 0)
                .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
                .map(|at| at.with_timezone(&Utc)),
            None => None,
        };

        Ok(NewTask {
            title: title.to_string(),
            description: draft
                .description
                .filter(|d| !d.trim().is_empty()),
            project_id: draft.project_id,
            status: status.as_str().to_string(),
            priority: priority.as_str().to_string(),
            deadline,
        })
    }
}

fn report(err: Error) -> Error {
    error!(error = %err, "{}", err.notice());
    err
}
