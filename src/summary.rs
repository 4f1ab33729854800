//! Weekly productivity summary sent by e-mail.

use crate::backend::{Backend, ProjectQuery, TaskOrder, TaskQuery};
use crate::error::Error;
use crate::generation::{completion_rate, productivity_suggestions, CompletionService};
use crate::models::ProjectStatus;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Local, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone, Debug, PartialEq)]
pub struct UpcomingDeadline {
    pub task_title: String,
    pub project_name: String,
    pub deadline: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeeklySummary {
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub productivity_rate: f64,
    pub completed_projects: usize,
    pub active_projects: usize,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
    pub ai_suggestions: Vec<String>,
}

/// Template parameters of the summary e-mail.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeeklyEmail {
    pub to_email: String,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub productivity_rate: u32,
    pub active_projects: usize,
    pub upcoming_deadlines: String,
    pub ai_suggestions: String,
}

impl WeeklyEmail {
    pub fn from_summary(to_email: &str, summary: &WeeklySummary) -> WeeklyEmail {
        WeeklyEmail {
            to_email: to_email.to_string(),
            completed_tasks: summary.completed_tasks,
            total_tasks: summary.total_tasks,
            productivity_rate: summary.productivity_rate.round() as u32,
            active_projects: summary.active_projects,
            upcoming_deadlines: summary
                .upcoming_deadlines
                .iter()
                .map(|d| format!("{} ({}) - {}", d.task_title, d.project_name, d.deadline))
                .collect::<Vec<_>>()
                .join("\n"),
            ai_suggestions: summary.ai_suggestions.join("\n"),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_weekly_summary(&self, email: &WeeklyEmail) -> Result<(), Error>;
}

/// Monday 00:00 to Sunday 23:59:59.999 of the week containing `now`, in `tz`.
pub fn week_bounds<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let local_day = now.with_timezone(tz).date_naive();
    let monday = local_day - Duration::days(local_day.weekday().num_days_from_monday() as i64);
    let next_monday = monday + Duration::days(7);

    let start_of = |day: chrono::NaiveDate| {
        tz.from_local_datetime(&day.and_time(NaiveTime::MIN))
            .earliest()
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or_else(|| day.and_time(NaiveTime::MIN).and_utc())
    };

    let start = start_of(monday);
    let end = start_of(next_monday) - Duration::milliseconds(1);
    (start, end)
}

pub async fn generate_weekly_summary(
    backend: &dyn Backend,
    completion: &dyn CompletionService,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<WeeklySummary, Error> {
    generate_weekly_summary_in(backend, completion, user_id, now, &Local).await
}

pub async fn generate_weekly_summary_in<Tz: TimeZone>(
    backend: &dyn Backend,
    completion: &dyn CompletionService,
    user_id: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<WeeklySummary, Error>
where
    Tz::Offset: std::fmt::Display,
{
    let (start, end) = week_bounds(now, tz);

    let week_tasks = backend
        .list_tasks(&TaskQuery {
            owner: Some(user_id.to_string()),
            created_from: Some(start),
            created_to: Some(end),
            ..Default::default()
        })
        .await
        .map_err(Error::read("tasks"))?;

    let projects = backend
        .list_projects(&ProjectQuery {
            owner: Some(user_id.to_string()),
        })
        .await
        .map_err(Error::read("projects"))?;

    let upcoming = backend
        .list_tasks(&TaskQuery {
            owner: Some(user_id.to_string()),
            deadline_after: Some(now),
            deadline_until: Some(end),
            order: TaskOrder::DeadlineAsc,
            ..Default::default()
        })
        .await
        .map_err(Error::read("tasks"))?;

    let completed_tasks = week_tasks.iter().filter(|t| t.status == "done").count();
    let total_tasks = week_tasks.len();

    let upcoming_deadlines = upcoming
        .iter()
        .filter_map(|t| {
            t.deadline.map(|deadline| UpcomingDeadline {
                task_title: t.title.clone(),
                project_name: t.project_name().unwrap_or_default().to_string(),
                deadline: deadline.with_timezone(tz).format("%d %B %Y").to_string(),
            })
        })
        .collect();

    let ai_suggestions = productivity_suggestions(completion, &week_tasks, &projects).await;

    Ok(WeeklySummary {
        completed_tasks,
        total_tasks,
        productivity_rate: completion_rate(completed_tasks, total_tasks),
        completed_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Completed)
            .count(),
        active_projects: projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .count(),
        upcoming_deadlines,
        ai_suggestions,
    })
}

pub async fn send_weekly_summary(
    backend: &dyn Backend,
    completion: &dyn CompletionService,
    mailer: &dyn Mailer,
    user_id: &str,
    user_email: &str,
    now: DateTime<Utc>,
) -> Result<WeeklyEmail, Error> {
    let result = async {
        let summary = generate_weekly_summary(backend, completion, user_id, now).await?;
        let email = WeeklyEmail::from_summary(user_email, &summary);
        mailer.send_weekly_summary(&email).await?;
        Ok::<_, Error>(email)
    }
    .await;

    match &result {
        Ok(_) => info!(user_id, "weekly summary sent"),
        Err(err) => error!(user_id, error = %err, "weekly summary failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::generation::MockCompletionService;
    use crate::models::fixtures::{project, task};
    use crate::models::{ProjectRef, Task};

    fn now() -> DateTime<Utc> {
        // A Wednesday
        "2026-10-14T10:00:00Z".parse().unwrap()
    }

    fn with_deadline(id: &str, title: &str, at: &str) -> Task {
        let mut t = task(id, title, "todo", "high");
        t.deadline = Some(at.parse().unwrap());
        t.project = Some(ProjectRef {
            name: "Website".to_string(),
        });
        t
    }

    fn backend() -> MockBackend {
        let mut backend = MockBackend::new();
        backend
            .expect_list_tasks()
            .withf(|q| q.order == TaskOrder::NewestFirst && q.created_from.is_some())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    task("t1", "Devis", "done", "low"),
                    task("t2", "Maquette", "done", "low"),
                    task("t3", "Recette", "todo", "low"),
                ])
            });
        backend
            .expect_list_tasks()
            .withf(|q| q.order == TaskOrder::DeadlineAsc)
            .times(1)
            .returning(|_| {
                Ok(vec![with_deadline(
                    "t4",
                    "Livraison",
                    "2026-10-16T15:00:00Z",
                )])
            });
        backend
            .expect_list_projects()
            .withf(|q| q.owner.as_deref() == Some("u1"))
            .returning(|_| {
                Ok(vec![
                    project("p1", ProjectStatus::Active),
                    project("p2", ProjectStatus::Completed),
                ])
            });
        backend
    }

    fn completion() -> MockCompletionService {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .returning(|_| Ok("Bloquez vos matinées\nRegroupez les appels".to_string()));
        completion
    }

    #[test]
    fn test_week_bounds_start_monday() {
        let (start, end) = week_bounds(now(), &Utc);
        assert_eq!(start, "2026-10-12T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(
            end,
            "2026-10-18T23:59:59.999Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_week_bounds_on_sunday() {
        let sunday: DateTime<Utc> = "2026-10-18T23:00:00Z".parse().unwrap();
        let (start, _) = week_bounds(sunday, &Utc);
        assert_eq!(start, "2026-10-12T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[tokio::test]
    async fn test_generate_weekly_summary() {
        let summary = generate_weekly_summary_in(&backend(), &completion(), "u1", now(), &Utc)
            .await
            .unwrap();

        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.completed_tasks, 2);
        assert_eq!(summary.active_projects, 1);
        assert_eq!(summary.completed_projects, 1);
        assert_eq!(
            summary.upcoming_deadlines,
            vec![UpcomingDeadline {
                task_title: "Livraison".to_string(),
                project_name: "Website".to_string(),
                deadline: "16 October 2026".to_string(),
            }]
        );
        assert_eq!(summary.ai_suggestions.len(), 2);
    }

    #[test]
    fn test_email_params() {
        let summary = WeeklySummary {
            completed_tasks: 2,
            total_tasks: 3,
            productivity_rate: 66.666,
            completed_projects: 1,
            active_projects: 1,
            upcoming_deadlines: vec![
                UpcomingDeadline {
                    task_title: "Livraison".to_string(),
                    project_name: "Website".to_string(),
                    deadline: "16 October 2026".to_string(),
                },
                UpcomingDeadline {
                    task_title: "Facture".to_string(),
                    project_name: "Website".to_string(),
                    deadline: "17 October 2026".to_string(),
                },
            ],
            ai_suggestions: vec!["A".to_string(), "B".to_string()],
        };

        let email = WeeklyEmail::from_summary("me@example.com", &summary);
        assert_eq!(email.productivity_rate, 67);
        assert_eq!(
            email.upcoming_deadlines,
            "Livraison (Website) - 16 October 2026\nFacture (Website) - 17 October 2026"
        );
        assert_eq!(email.ai_suggestions, "A\nB");
    }

    #[tokio::test]
    async fn test_send_weekly_summary_propagates_mailer_error() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_weekly_summary()
            .withf(|email| email.to_email == "me@example.com")
            .times(1)
            .returning(|_| Err(Error::Config("mail service key missing".to_string())));

        let result = send_weekly_summary(
            &backend(),
            &completion(),
            &mailer,
            "u1",
            "me@example.com",
            now(),
        )
        .await;
        assert!(result.is_err());
    }
}
