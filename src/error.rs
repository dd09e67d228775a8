//! Error types for the scene pipeline

use thiserror::Error;

use crate::overlap::{ConfigError, SolverError};
use crate::scene::SceneError;

/// Errors that can occur while resolving a scene
#[derive(Debug, Error)]
pub enum NonOverlapError {
    /// Error loading or building the scene
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Error loading a configuration file
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error inside the incremental solver
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_error_display() {
        let err: NonOverlapError = SceneError::DuplicateName {
            name: "a".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("scene error:"));
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_solver_error_display() {
        let err: NonOverlapError = SolverError::Internal("boom".to_string()).into();
        assert_eq!(
            err.to_string(),
            "constraint solver error: Internal solver error: boom"
        );
    }
}
