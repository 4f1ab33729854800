use crate::models::Task;
use chrono::{Local, NaiveDate, TimeZone};

/// Task list filter. Absent or empty criteria match everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.status).is_none()
            && non_empty(&self.priority).is_none()
            && self.deadline.is_none()
            && non_empty(&self.search).is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.matches_in(task, &Local)
    }

    /// Deadline days are compared in `tz`.
    pub fn matches_in<Tz: TimeZone>(&self, task: &Task, tz: &Tz) -> bool {
        if let Some(status) = non_empty(&self.status) {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = non_empty(&self.priority) {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(day) = self.deadline {
            match task.deadline {
                Some(deadline) if deadline.with_timezone(tz).date_naive() == day => {}
                _ => return false,
            }
        }
        if let Some(search) = non_empty(&self.search) {
            if !task.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        self.apply_in(tasks, &Local)
    }

    pub fn apply_in<Tz: TimeZone>(&self, tasks: &[Task], tz: &Tz) -> Vec<Task> {
        tasks
            .iter()
            .filter(|task| self.matches_in(task, tz))
            .cloned()
            .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::task;
    use chrono::{FixedOffset, Utc};

    fn sample() -> Vec<Task> {
        let mut t1 = task("t1", "Write spec", "todo", "high");
        t1.deadline = Some("2026-10-20T12:00:00Z".parse().unwrap());
        let mut t2 = task("t2", "Send invoice", "done", "low");
        t2.deadline = Some("2026-10-21T12:00:00Z".parse().unwrap());
        let t3 = task("t3", "Review SPEC draft", "todo", "low");
        vec![t1, t2, t3]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_returns_all_in_order() {
        let tasks = sample();
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply_in(&tasks, &Utc), tasks);
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let tasks = sample();
        let filter = TaskFilter {
            status: Some(String::new()),
            priority: Some(String::new()),
            deadline: None,
            search: Some(String::new()),
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply_in(&tasks, &Utc).len(), 3);
    }

    #[test]
    fn test_search_matches_title_substring() {
        let tasks = vec![task("t1", "Write spec", "todo", "high")];

        let found = TaskFilter {
            search: Some("spec".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&found.apply_in(&tasks, &Utc)), vec!["t1"]);

        let missing = TaskFilter {
            search: Some("xyz".to_string()),
            ..Default::default()
        };
        assert!(missing.apply_in(&tasks, &Utc).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_on_title_only() {
        let mut tasks = sample();
        tasks[1].description = Some("spec appendix".to_string());
        let filter = TaskFilter {
            search: Some("SPEC".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply_in(&tasks, &Utc)), vec!["t1", "t3"]);
    }

    #[test]
    fn test_status_and_priority_combine() {
        let tasks = sample();
        let filter = TaskFilter {
            status: Some("todo".to_string()),
            priority: Some("low".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply_in(&tasks, &Utc)), vec!["t3"]);
    }

    #[test]
    fn test_deadline_same_day_excludes_missing_deadline() {
        let tasks = sample();
        let filter = TaskFilter {
            deadline: NaiveDate::from_ymd_opt(2026, 10, 20),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply_in(&tasks, &Utc)), vec!["t1"]);
    }

    #[test]
    fn test_deadline_day_follows_timezone() {
        let mut late = task("t4", "Late call", "todo", "low");
        late.deadline = Some("2026-10-20T23:30:00Z".parse().unwrap());
        let tasks = vec![late];
        let filter = TaskFilter {
            deadline: NaiveDate::from_ymd_opt(2026, 10, 21),
            ..Default::default()
        };

        let paris = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(filter.apply_in(&tasks, &paris).len(), 1);
        assert!(filter.apply_in(&tasks, &Utc).is_empty());
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let tasks = sample();
        let before = tasks.clone();
        let filter = TaskFilter {
            status: Some("done".to_string()),
            ..Default::default()
        };
        let _ = filter.apply_in(&tasks, &Utc);
        assert_eq!(tasks, before);
    }
}
