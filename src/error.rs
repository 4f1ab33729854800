use thiserror::Error;

/// Failures talking to the hosted store.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend returned no {0}")]
    EmptyResponse(&'static str),
}

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected before any request was sent.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to load {resource}: {source}")]
    RemoteRead {
        resource: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Failed to write {resource}: {source}")]
    RemoteWrite {
        resource: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn read(resource: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Error::RemoteRead { resource, source }
    }

    pub fn write(resource: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| Error::RemoteWrite { resource, source }
    }

    /// Generic notice shown to the user for this failure.
    pub fn notice(&self) -> &'static str {
        match self {
            Error::Validation(_) => "Formulaire invalide",
            Error::RemoteRead { resource, .. } => match *resource {
                "tasks" => "Erreur lors du chargement des tâches",
                "task statuses" => "Erreur lors du chargement des statuts",
                _ => "Erreur lors du chargement des données",
            },
            Error::RemoteWrite { resource, .. } => match *resource {
                "task status" => "Erreur lors de la mise à jour du statut",
                "new task" => "Erreur lors de la création de la tâche",
                "new project" => "Erreur lors de la création du projet",
                "project" => "Erreur lors de la mise à jour du projet",
                _ => "Erreur lors de l'enregistrement",
            },
            Error::Generation(_) => "Erreur lors de la génération",
            Error::Config(_) => "Configuration invalide",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_write_notice() {
        let err = Error::write("task status")(BackendError::EmptyResponse("row"));
        assert_eq!(err.notice(), "Erreur lors de la mise à jour du statut");
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = Error::read("tasks")(BackendError::Status {
            status: 503,
            body: "unavailable".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to load tasks: Backend answered 503: unavailable"
        );
        assert_eq!(err.notice(), "Erreur lors du chargement des tâches");
    }
}
