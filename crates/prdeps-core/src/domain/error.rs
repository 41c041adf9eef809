//! Domain-level error taxonomy for prdeps.

/// prdeps domain errors.
#[derive(Debug, thiserror::Error)]
pub enum PrDepsError {
    #[error("event error: {0}")]
    Event(String),

    #[error("unrecognized component(s): {}", names.join(", "))]
    UnknownComponent { names: Vec<String> },

    #[error("invalid build order: {0}")]
    InvalidBuildOrder(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("git error: {0}")]
    GitError(String),

    #[error("command `{program}` failed to run: {reason}")]
    Command { program: String, reason: String },

    #[error("descriptor error in {path}: {reason}")]
    Descriptor { path: String, reason: String },

    #[error("error building {component}: exit code {exit_code}")]
    BuildFailed { component: String, exit_code: i32 },

    #[error("pull request source error: {0}")]
    Source(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for prdeps domain operations.
pub type Result<T> = std::result::Result<T, PrDepsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_component_lists_every_name() {
        let err = PrDepsError::UnknownComponent {
            names: vec!["jigasi".to_string(), "jibri".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("jigasi"));
        assert!(msg.contains("jibri"));
    }

    #[test]
    fn test_build_failed_error() {
        let err = PrDepsError::BuildFailed {
            component: "jicoco".to_string(),
            exit_code: 1,
        };
        assert_eq!(err.to_string(), "error building jicoco: exit code 1");
    }

    #[test]
    fn test_descriptor_error_names_path() {
        let err = PrDepsError::Descriptor {
            path: "rtp/pom.xml".to_string(),
            reason: "no <version> under <project>".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rtp/pom.xml"));
        assert!(msg.contains("<version>"));
    }
}
