//! Drag-and-drop status changes on the board.
//!
//! A task's `status` is its column. Dropping a task on another column writes
//! the new status and only then patches the local list, so a failed write
//! leaves the task where it was.

use crate::backend::Backend;
use crate::catalog::Catalog;
use crate::error::Error;
use crate::models::Task;
use tracing::{error, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropEvent {
    pub task_id: String,
    /// Destination column, `None` when the drag was cancelled.
    pub over: Option<String>,
}

impl DropEvent {
    pub fn new(task_id: impl Into<String>, over: impl Into<String>) -> Self {
        DropEvent {
            task_id: task_id.into(),
            over: Some(over.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Moved {
        task_id: String,
        from: String,
        to: String,
    },
}

pub async fn apply_drop(
    backend: &dyn Backend,
    catalog: &Catalog,
    tasks: &mut [Task],
    event: &DropEvent,
) -> Result<Transition, Error> {
    let Some(over) = event.over.as_deref() else {
        return Ok(Transition::Unchanged);
    };
    let Some(index) = tasks.iter().position(|t| t.id == event.task_id) else {
        return Ok(Transition::Unchanged);
    };
    if tasks[index].status == over {
        return Ok(Transition::Unchanged);
    }

    let status = catalog.status_code(over)?;

    if let Err(err) = backend.update_task_status(&event.task_id, &status).await {
        let err = Error::write("task status")(err);
        error!(task_id = %event.task_id, to = over, error = %err, "{}", err.notice());
        return Err(err);
    }

    let task = &mut tasks[index];
    let from = std::mem::replace(&mut task.status, status.as_str().to_string());
    info!(task_id = %task.id, %from, to = over, "task moved");

    Ok(Transition::Moved {
        task_id: task.id.clone(),
        from,
        to: task.status.clone(),
    })
}
