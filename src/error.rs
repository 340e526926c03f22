use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Updater `{updater}` failed ({status}): {stderr}")]
    Invocation {
        updater: String,
        status: String,
        stderr: String,
    },

    #[error("Assertion failed in `{case}`: {message}")]
    Assertion { case: String, message: String },

    #[error("Failed to restore {}: {source}", path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The enclosed logic failed and the restoration that followed failed too.
    #[error("{original}; restoration also failed: {restore}")]
    RestoreAfterFailure {
        original: Box<CheckError>,
        restore: Box<CheckError>,
    },

    #[error("Plan directory changed after the suite: {}", paths.join(", "))]
    Isolation { paths: Vec<String> },

    #[error("Snapshot Error: {message}")]
    Snapshot { message: String },

    #[error("Document Error: {}: {message}", path.display())]
    Document { path: PathBuf, message: String },

    #[error("Layout Error: {message}")]
    Layout { message: String },

    #[error("Config Error: {message}")]
    Config { message: String },

    #[error("Unknown check case: {name}")]
    UnknownCase { name: String, available: Vec<String> },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML Error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CheckError {
    pub fn display_localized(&self) -> String {
        match self {
            CheckError::Invocation {
                updater,
                status,
                stderr,
            } => t!(
                "errors.invocation",
                updater = updater,
                status = status,
                stderr = stderr
            )
            .to_string(),
            CheckError::Assertion { case, message } => {
                t!("errors.assertion", case = case, message = message).to_string()
            }
            CheckError::Isolation { paths } => {
                t!("errors.isolation", paths = paths.join(", ")).to_string()
            }
            CheckError::Layout { message } => t!("errors.layout", message = message).to_string(),
            CheckError::UnknownCase { name, available } => t!(
                "errors.unknown_case",
                name = name,
                available = available.join(", ")
            )
            .to_string(),
            CheckError::RestoreAfterFailure { original, restore } => format!(
                "{}; restoration also failed: {}",
                original.display_localized(),
                restore.display_localized()
            ),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
