use thiserror::Error;

#[derive(Error, Debug)]
pub enum BranchyError {
    #[error("{command} failed with status {}: {stderr}", status_text(.status))]
    Vcs {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command '{command}' failed: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: Box<BranchyError>,
    },

    #[error("Command '{command}' panicked: {message}")]
    Panicked { command: String, message: String },

    #[error("Queue item #{id} was canceled before it started")]
    Canceled { id: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

fn status_text(status: &Option<i32>) -> String {
    status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl BranchyError {
    pub fn command_failed(command: impl Into<String>, source: BranchyError) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source: Box::new(source),
        }
    }

    /// Innermost error, skipping `CommandFailed` wrappers.
    pub fn root_cause(&self) -> &BranchyError {
        match self {
            Self::CommandFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self.root_cause(), Self::Canceled { .. })
    }
}
