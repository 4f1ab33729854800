use crate::backend::{Backend, ProjectQuery, TaskQuery};
use crate::error::Error;
use crate::generation::completion_rate;
use crate::models::{Project, ProjectStatus, Task};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Rounded percentage of `completed_tasks` over `total_tasks`.
    pub productivity_score: u32,
    /// Seven entries ending with `today`, oldest first.
    pub tasks_by_day: Vec<DayCount>,
}

impl DashboardStats {
    /// `tasks` are those created over the last week; days are counted in `tz`.
    pub fn compute<Tz: TimeZone>(
        projects: &[Project],
        tasks: &[Task],
        today: NaiveDate,
        tz: &Tz,
    ) -> DashboardStats {
        let active_projects = projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count();
        let completed_projects = projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Completed)
            .count();

        let total_tasks = tasks.len();
        let completed_tasks = tasks.iter().filter(|t| t.status == "done").count();

        let tasks_by_day = (0..7)
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                let total = tasks
                    .iter()
                    .filter_map(|t| t.created_at.as_ref())
                    .filter(|at| at.with_timezone(tz).date_naive() == date)
                    .count();
                DayCount { date, total }
            })
            .collect();

        DashboardStats {
            total_projects: active_projects + completed_projects,
            active_projects,
            completed_projects,
            total_tasks,
            completed_tasks,
            productivity_score: completion_rate(completed_tasks, total_tasks).round() as u32,
            tasks_by_day,
        }
    }
}

pub async fn load_dashboard(
    backend: &dyn Backend,
    now: DateTime<Utc>,
) -> Result<DashboardStats, Error> {
    let projects = backend
        .list_projects(&ProjectQuery::default())
        .await
        .map_err(Error::read("projects"))?;

    let query = TaskQuery {
        created_from: Some(now - Duration::days(7)),
        ..Default::default()
    };
    let tasks = backend
        .list_tasks(&query)
        .await
        .map_err(Error::read("tasks"))?;

    let today = now.with_timezone(&Local).date_naive();
    Ok(DashboardStats::compute(&projects, &tasks, today, &Local))
}
