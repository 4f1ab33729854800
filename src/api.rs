use crate::backend::{Backend, ProjectQuery, TaskOrder, TaskQuery};
use crate::catalog::{PriorityCode, StatusCode};
use crate::config::Config;
use crate::error::BackendError;
use crate::models::{
    NewProject, NewTag, NewTask, Project, ProjectUpdate, Tag, Task, TaskPriority, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

const TASK_SELECT: &str = "*,project:projects(name),tags:task_tags(tag:tags(*))";

/// REST client for the hosted store (PostgREST dialect).
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl RestBackend {
    pub fn new(base_url: &str, api_key: &str, access_token: Option<String>) -> Self {
        RestBackend {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        RestBackend::new(
            &config.backend_url,
            &config.backend_key,
            config.access_token.clone(),
        )
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> RequestBuilder {
        // Without a user session the anon key doubles as bearer token.
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>, BackendError> {
        debug!(table, ?params, "select");
        let res = self
            .request(reqwest::Method::GET, table)
            .query(params)
            .send()
            .await?;
        decode(check(res).await?).await
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        body: &B,
    ) -> Result<Vec<T>, BackendError> {
        debug!(table, "insert");
        let res = self
            .request(reqwest::Method::POST, table)
            .query(&[("select", select)])
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        decode(check(res).await?).await
    }

    async fn patch<B: Serialize + ?Sized>(
        &self,
        table: &str,
        id: &str,
        body: &B,
    ) -> Result<(), BackendError> {
        debug!(table, id, "update");
        let res = self
            .request(reqwest::Method::PATCH, table)
            .query(&[("id", eq(id))])
            .json(body)
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }

    async fn delete_where(&self, table: &str, column: &str, id: &str) -> Result<(), BackendError> {
        debug!(table, column, id, "delete");
        let res = self
            .request(reqwest::Method::DELETE, table)
            .query(&[(column, eq(id))])
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }
}

async fn check(res: Response) -> Result<Response, BackendError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        let status = res.status().as_u16();
        let body = res.text().await?;
        Err(BackendError::Status { status, body })
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, BackendError> {
    let bytes = res.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn first<T>(rows: Vec<T>, what: &'static str) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or(BackendError::EmptyResponse(what))
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query string for a task listing.
pub fn task_params(query: &TaskQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), TASK_SELECT.to_string())];

    if let Some(owner) = &query.owner {
        params.push(("user_id".to_string(), eq(owner)));
    }
    if let Some(from) = &query.created_from {
        params.push(("created_at".to_string(), format!("gte.{}", timestamp(from))));
    }
    if let Some(to) = &query.created_to {
        params.push(("created_at".to_string(), format!("lte.{}", timestamp(to))));
    }
    if let Some(after) = &query.deadline_after {
        params.push(("deadline".to_string(), format!("gt.{}", timestamp(after))));
    }
    if let Some(until) = &query.deadline_until {
        params.push(("deadline".to_string(), format!("lte.{}", timestamp(until))));
    }

    let order = match query.order {
        TaskOrder::NewestFirst => "created_at.desc",
        TaskOrder::DeadlineAsc => "deadline.asc",
    };
    params.push(("order".to_string(), order.to_string()));
    params
}

#[async_trait]
impl Backend for RestBackend {
    async fn list_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, BackendError> {
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "created_at.desc".to_string()),
        ];
        if let Some(owner) = &query.owner {
            params.push(("user_id".to_string(), eq(owner)));
        }
        self.fetch("projects", &params).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, BackendError> {
        first(self.insert("projects", "*", project).await?, "project")
    }

    async fn update_project(
        &self,
        id: &str,
        update: &ProjectUpdate,
    ) -> Result<(), BackendError> {
        self.patch("projects", id, update).await
    }

    async fn delete_project(&self, id: &str) -> Result<(), BackendError> {
        self.delete_where("projects", "id", id).await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, BackendError> {
        self.fetch("tasks", &task_params(query)).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, BackendError> {
        first(self.insert("tasks", TASK_SELECT, task).await?, "task")
    }

    async fn delete_task(&self, id: &str) -> Result<(), BackendError> {
        self.delete_where("tasks", "id", id).await
    }

    async fn update_task_status(
        &self,
        id: &str,
        status: &StatusCode,
    ) -> Result<(), BackendError> {
        self.patch("tasks", id, &json!({ "status": status.as_str() }))
            .await
    }

    async fn update_task_priority(
        &self,
        id: &str,
        priority: &PriorityCode,
    ) -> Result<(), BackendError> {
        self.patch("tasks", id, &json!({ "priority": priority.as_str() }))
            .await
    }

    async fn replace_task_tags(
        &self,
        id: &str,
        tag_ids: &[String],
    ) -> Result<(), BackendError> {
        self.delete_where("task_tags", "task_id", id).await?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        let rows: Vec<_> = tag_ids
            .iter()
            .map(|tag_id| json!({ "task_id": id, "tag_id": tag_id }))
            .collect();
        let _: Vec<serde_json::Value> = self.insert("task_tags", "*", &rows).await?;
        Ok(())
    }

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, BackendError> {
        let params = [
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "order".to_string()),
        ];
        self.fetch("task_statuses", &params).await
    }

    async fn list_priorities(&self) -> Result<Vec<TaskPriority>, BackendError> {
        let params = [
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "order".to_string()),
        ];
        self.fetch("task_priorities", &params).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, BackendError> {
        let params = [
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "name".to_string()),
        ];
        self.fetch("tags", &params).await
    }

    async fn create_tag(&self, tag: &NewTag) -> Result<Tag, BackendError> {
        first(self.insert("tags", "*", tag).await?, "tag")
    }
}
