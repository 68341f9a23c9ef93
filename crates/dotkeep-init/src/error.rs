//! Error types for dotkeep-init

use thiserror::Error;

/// Result type alias using dotkeep-init's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Bootstrap error types
#[derive(Error, Debug)]
pub enum Error {
    /// Git operation failed
    #[error("Git operation failed: {message}")]
    GitOperation { message: String },

    /// Git command not found
    #[error("Git command not found: {command}. Please ensure git is installed and in PATH")]
    GitNotFound { command: String },

    /// Clone failed
    #[error("Failed to clone repository {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// Built-in git backend error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),

    /// More than one config template in the source directory
    #[error("Multiple config file templates: {paths}")]
    MultipleConfigTemplates { paths: String },

    /// Config template is not valid UTF-8
    #[error("Config template is not valid UTF-8: {path}")]
    NonUtf8Template { path: String },

    /// Template could not be parsed
    #[error("Failed to parse template {name}: {message}")]
    TemplateParse { name: String, message: String },

    /// Template execution failed
    #[error("Failed to render template {name}: {message}")]
    TemplateRender { name: String, message: String },

    /// Apply collaborator failed
    #[error(transparent)]
    Apply(anyhow::Error),

    /// Purge collaborator failed
    #[error(transparent)]
    Purge(anyhow::Error),

    /// Blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error
    #[error(transparent)]
    Core(#[from] dotkeep_core::Error),
}

impl Error {
    /// Create a git operation error
    pub fn git_operation(message: impl Into<String>) -> Self {
        Self::GitOperation {
            message: message.into(),
        }
    }

    /// Create a git not found error
    pub fn git_not_found(command: impl Into<String>) -> Self {
        Self::GitNotFound {
            command: command.into(),
        }
    }

    /// Create a clone failed error
    pub fn clone_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CloneFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a multiple config templates error
    pub fn multiple_config_templates(paths: &[impl AsRef<str>]) -> Self {
        Self::MultipleConfigTemplates {
            paths: paths
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create a template parse error
    pub fn template_parse(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateParse {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a template render error
    pub fn template_render(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TemplateRender {
            name: name.into(),
            message: message.into(),
        }
    }
}
