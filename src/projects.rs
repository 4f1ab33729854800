use crate::backend::{Backend, ProjectQuery};
use crate::error::Error;
use crate::generation::{describe_project, CompletionService};
use crate::models::{NewProject, Project, ProjectDraft, ProjectUpdate};
use tracing::{error, info};

pub async fn list_projects(backend: &dyn Backend) -> Result<Vec<Project>, Error> {
    backend
        .list_projects(&ProjectQuery::default())
        .await
        .map_err(Error::read("projects"))
}

pub async fn create_project(
    backend: &dyn Backend,
    completion: &dyn CompletionService,
    draft: ProjectDraft,
) -> Result<Project, Error> {
    let draft = validate(draft)?;
    let ai_description = describe_project(completion, &draft.description).await;

    let project = backend
        .create_project(&NewProject {
            name: draft.name,
            description: draft.description,
            ai_description,
        })
        .await
        .map_err(Error::write("new project"))
        .map_err(|err| {
            error!(error = %err, "{}", err.notice());
            err
        })?;

    info!(project_id = %project.id, "project created");
    Ok(project)
}

/// Regenerates the AI description only when the description changed.
pub async fn update_project(
    backend: &dyn Backend,
    completion: &dyn CompletionService,
    project: &Project,
    draft: ProjectDraft,
) -> Result<Project, Error> {
    let draft = validate(draft)?;

    let ai_description = if draft.description != project.description {
        Some(describe_project(completion, &draft.description).await)
    } else {
        project.ai_description.clone()
    };

    let update = ProjectUpdate {
        name: draft.name,
        description: draft.description,
        ai_description,
    };
    backend
        .update_project(&project.id, &update)
        .await
        .map_err(Error::write("project"))?;

    Ok(Project {
        name: update.name,
        description: update.description,
        ai_description: update.ai_description,
        ..project.clone()
    })
}

pub async fn delete_project(backend: &dyn Backend, id: &str) -> Result<(), Error> {
    backend
        .delete_project(id)
        .await
        .map_err(Error::write("project"))?;
    info!(project_id = id, "project deleted");
    Ok(())
}

fn validate(draft: ProjectDraft) -> Result<ProjectDraft, Error> {
    let name = draft.name.trim();
    let description = draft.description.trim();
    if name.is_empty() {
        return Err(Error::validation("project name is required"));
    }
    if description.is_empty() {
        return Err(Error::validation("project description is required"));
    }
    Ok(ProjectDraft {
        name: name.to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::generation::MockCompletionService;
    use crate::models::fixtures::project;
    use crate::models::ProjectStatus;

    fn draft(name: &str, description: &str) -> ProjectDraft {
        ProjectDraft {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_project_stores_generated_description() {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_| Ok("Site vitrine pour un artisan.".to_string()));

        let mut backend = MockBackend::new();
        backend
            .expect_create_project()
            .withf(|p| p.name == "Site" && p.ai_description == "Site vitrine pour un artisan.")
            .times(1)
            .returning(|p| {
                let mut created = project("p9", ProjectStatus::Active);
                created.name = p.name.clone();
                created.ai_description = Some(p.ai_description.clone());
                Ok(created)
            });

        let created = create_project(&backend, &completion, draft(" Site ", "vitrine"))
            .await
            .unwrap();
        assert_eq!(created.id, "p9");
    }

    #[tokio::test]
    async fn test_create_project_echoes_description_on_generation_failure() {
        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .returning(|_| Err(Error::Generation("timeout".to_string())));

        let mut backend = MockBackend::new();
        backend
            .expect_create_project()
            .withf(|p| p.ai_description == "vitrine")
            .times(1)
            .returning(|_| Ok(project("p9", ProjectStatus::Active)));

        assert!(create_project(&backend, &completion, draft("Site", "vitrine"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_project_requires_fields() {
        let mut completion = MockCompletionService::new();
        completion.expect_complete().times(0);
        let mut backend = MockBackend::new();
        backend.expect_create_project().times(0);

        let result = create_project(&backend, &completion, draft("Site", "  ")).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_project_keeps_ai_description_when_unchanged() {
        let mut existing = project("p1", ProjectStatus::Active);
        existing.ai_description = Some("Texte existant".to_string());

        let mut completion = MockCompletionService::new();
        completion.expect_complete().times(0);
        let mut backend = MockBackend::new();
        backend
            .expect_update_project()
            .withf(|id, update| {
                id == "p1"
                    && update.name == "Nouveau nom"
                    && update.ai_description.as_deref() == Some("Texte existant")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let updated = update_project(
            &backend,
            &completion,
            &existing,
            draft("Nouveau nom", &existing.description),
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Nouveau nom");
        assert_eq!(updated.created_at, existing.created_at);
    }

    #[tokio::test]
    async fn test_update_project_regenerates_on_new_description() {
        let existing = project("p1", ProjectStatus::Active);

        let mut completion = MockCompletionService::new();
        completion
            .expect_complete()
            .times(1)
            .returning(|_| Ok("Nouvelle description".to_string()));
        let mut backend = MockBackend::new();
        backend
            .expect_update_project()
            .withf(|_, update| update.ai_description.as_deref() == Some("Nouvelle description"))
            .times(1)
            .returning(|_, _| Ok(()));

        let updated = update_project(&backend, &completion, &existing, draft("Site", "E-shop"))
            .await
            .unwrap();
        assert_eq!(updated.description, "E-shop");
    }
}
