//! Status and priority sets loaded from the store.
//!
//! Tasks arrive with free-form status and priority strings. Anything written
//! back goes through [`StatusCode`] or [`PriorityCode`], which can only be
//! built from a value present in the loaded [`Catalog`].

use crate::error::Error;
use crate::models::{TaskPriority, TaskStatus};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusCode(String);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PriorityCode(String);

impl StatusCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PriorityCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PriorityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    statuses: Vec<TaskStatus>,
    priorities: Vec<TaskPriority>,
}

impl Catalog {
    pub fn new(mut statuses: Vec<TaskStatus>, mut priorities: Vec<TaskPriority>) -> Self {
        statuses.sort_by_key(|s| s.order);
        priorities.sort_by_key(|p| p.order);
        Catalog {
            statuses,
            priorities,
        }
    }

    /// Column order.
    pub fn statuses(&self) -> &[TaskStatus] {
        &self.statuses
    }

    pub fn priorities(&self) -> &[TaskPriority] {
        &self.priorities
    }

    pub fn status(&self, id: &str) -> Option<&TaskStatus> {
        self.statuses.iter().find(|s| s.id == id)
    }

    pub fn priority(&self, id: &str) -> Option<&TaskPriority> {
        self.priorities.iter().find(|p| p.id == id)
    }

    pub fn status_code(&self, id: &str) -> Result<StatusCode, Error> {
        self.status(id)
            .map(|s| StatusCode(s.id.clone()))
            .ok_or_else(|| Error::validation(format!("unknown task status '{}'", id)))
    }

    pub fn priority_code(&self, id: &str) -> Result<PriorityCode, Error> {
        self.priority(id)
            .map(|p| PriorityCode(p.id.clone()))
            .ok_or_else(|| Error::validation(format!("unknown task priority '{}'", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{priority, status};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![status("done", 3), status("todo", 1), status("in_progress", 2)],
            vec![priority("high", 3), priority("low", 1)],
        )
    }

    #[test]
    fn test_statuses_sorted_by_order() {
        let catalog = catalog();
        let ids: Vec<&str> = catalog
            .statuses()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["todo", "in_progress", "done"]);
    }

    #[test]
    fn test_known_status_code() {
        let code = catalog().status_code("done").unwrap();
        assert_eq!(code.as_str(), "done");
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert!(matches!(
            catalog().status_code("archived"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            catalog().priority_code("urgent"),
            Err(Error::Validation(_))
        ));
    }
}
