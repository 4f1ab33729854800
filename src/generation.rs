//! Text generation on top of a completion service.
//!
//! Every helper here degrades to a usable fallback when the service fails;
//! the caller never receives an empty result.

use crate::error::Error;
use crate::models::{Project, ProjectStatus, Task};
use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Error>;
}

pub const DEFAULT_PRODUCTIVITY_SUGGESTIONS: [&str; 3] = [
    "Planifiez vos tâches en début de semaine",
    "Faites des points réguliers sur l'avancement",
    "Priorisez les tâches importantes",
];

pub const DEFAULT_TASK_SUGGESTIONS: [&str; 5] = [
    "Définir le périmètre du projet avec le client",
    "Établir le planning et les jalons",
    "Réaliser les livrables principaux",
    "Faire valider les livrables par le client",
    "Facturer et clôturer le projet",
];

/// Short professional description; falls back to `description` itself.
pub async fn describe_project(completion: &dyn CompletionService, description: &str) -> String {
    let request = CompletionRequest {
        prompt: format!(
            "Rédige une courte description professionnelle d'un projet freelance intitulé : \"{}\". Sois concis et clair.",
            description
        ),
        ..Default::default()
    };

    match completion.complete(&request).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!("empty project description from completion service");
            description.to_string()
        }
        Err(err) => {
            warn!(error = %err, "project description generation failed");
            description.to_string()
        }
    }
}

pub async fn suggest_tasks(completion: &dyn CompletionService, project_name: &str) -> Vec<String> {
    let request = CompletionRequest {
        system: Some(
            "Tu es un expert en gestion de projet. Tu dois générer une liste de tâches pertinentes pour un projet en fonction de son nom."
                .to_string(),
        ),
        prompt: format!(
            "Génère une liste de 5 à 10 tâches essentielles pour le projet : {}. Réponds uniquement avec la liste des tâches, une par ligne.",
            project_name
        ),
        temperature: Some(0.7),
        max_tokens: Some(500),
    };

    generate_lines(completion, &request, &DEFAULT_TASK_SUGGESTIONS).await
}

pub async fn productivity_suggestions(
    completion: &dyn CompletionService,
    week_tasks: &[Task],
    projects: &[Project],
) -> Vec<String> {
    let done = week_tasks.iter().filter(|t| t.status == "done").count();
    let rate = completion_rate(done, week_tasks.len());
    let running = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Active)
        .count();

    let request = CompletionRequest {
        system: Some(
            "Tu es un expert en gestion de projet qui donne des conseils concis et actionnables."
                .to_string(),
        ),
        prompt: format!(
            "En tant qu'expert en gestion de projet, analyse ces données :\n\
             - {} tâches cette semaine\n\
             - {} projets en cours\n\
             - Taux de complétion : {:.0}%\n\n\
             Génère 3 suggestions concrètes pour améliorer la productivité et la gestion des projets.\n\
             Réponds uniquement avec les suggestions, une par ligne.",
            week_tasks.len(),
            running,
            rate
        ),
        temperature: Some(0.7),
        max_tokens: Some(200),
    };

    generate_lines(completion, &request, &DEFAULT_PRODUCTIVITY_SUGGESTIONS).await
}

/// Percentage, 0 for an empty week.
pub fn completion_rate(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}

async fn generate_lines(
    completion: &dyn CompletionService,
    request: &CompletionRequest,
    fallback: &[&str],
) -> Vec<String> {
    let lines = match completion.complete(request).await {
        Ok(text) => split_lines(&text),
        Err(err) => {
            warn!(error = %err, "completion failed, using default suggestions");
            Vec::new()
        }
    };

    if lines.is_empty() {
        fallback.iter().map(|s| s.to_string()).collect()
    } else {
        lines
    }
}

/// One entry per non-blank line, list markers removed.
pub fn split_lines(text: &str) -> Vec<String> {
    let marker = Regex::new(r"^(?:[-*•]\s+|\d+[.)]\s*)").unwrap();
    text.lines()
        .map(|line| marker.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
