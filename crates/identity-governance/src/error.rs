use serde::Serialize;
use shared::error::CommonError;
use thiserror::Error;

/// Errors surfaced by the governance facade.
///
/// Store and registry failures are folded into [`GovernanceError::ConfigAccess`]
/// with the original cause kept as the source, except a missing resident
/// identity provider which stays distinguishable as [`GovernanceError::NotFound`].
#[derive(Error, Debug, Serialize)]
pub enum GovernanceError {
    #[error("could not find resource: {msg}")]
    NotFound {
        msg: String,
        lookup_id: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("could not access governance configuration: {msg}")]
    ConfigAccess {
        msg: String,
        #[serde(skip)]
        #[source]
        source: anyhow::Error,
    },
    #[error("invalid request: {msg}")]
    InvalidRequest {
        msg: String,
        #[serde(skip)]
        #[source]
        source: Option<anyhow::Error>,
    },
    #[error("unknown error")]
    Unknown(
        #[serde(skip)]
        #[from]
        anyhow::Error,
    ),
}

impl GovernanceError {
    /// Wrap a collaborator failure, keeping `NotFound` intact.
    pub fn config_access(msg: impl Into<String>, err: CommonError) -> Self {
        match err {
            CommonError::NotFound {
                msg,
                lookup_id,
                source,
            } => GovernanceError::NotFound {
                msg,
                lookup_id,
                source,
            },
            other => GovernanceError::ConfigAccess {
                msg: msg.into(),
                source: other.into(),
            },
        }
    }
}

impl From<CommonError> for GovernanceError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::InvalidRequest { msg, source } => {
                GovernanceError::InvalidRequest { msg, source }
            }
            other => GovernanceError::config_access("collaborator call failed", other),
        }
    }
}

impl From<serde_yaml::Error> for GovernanceError {
    fn from(err: serde_yaml::Error) -> Self {
        GovernanceError::InvalidRequest {
            msg: format!("Failed to parse governance config: {err}"),
            source: Some(err.into()),
        }
    }
}

impl From<std::io::Error> for GovernanceError {
    fn from(err: std::io::Error) -> Self {
        GovernanceError::InvalidRequest {
            msg: format!("Failed to read governance config: {err}"),
            source: Some(err.into()),
        }
    }
}

#[cfg(all(test, feature = "unit_test"))]
mod unit_test {
    use super::*;

    #[test]
    fn test_config_access_keeps_not_found() {
        let err = GovernanceError::config_access(
            "read failed",
            CommonError::NotFound {
                msg: "Resident identity provider not found".to_string(),
                lookup_id: "acme.com".to_string(),
                source: None,
            },
        );

        match err {
            GovernanceError::NotFound { lookup_id, .. } => assert_eq!(lookup_id, "acme.com"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_config_access_wraps_repository_error() {
        let err = GovernanceError::config_access(
            "Error while retrieving resident identity provider for acme.com tenant",
            CommonError::Repository {
                msg: "connection refused".to_string(),
                source: None,
            },
        );

        match &err {
            GovernanceError::ConfigAccess { msg, source } => {
                assert!(msg.contains("acme.com"));
                assert!(source.downcast_ref::<CommonError>().is_some());
            }
            other => panic!("expected ConfigAccess, got {other:?}"),
        }
        assert!(err.to_string().contains("acme.com"));
    }

    #[test]
    fn test_invalid_request_passes_through() {
        let err: GovernanceError = CommonError::InvalidRequest {
            msg: "duplicate connector".to_string(),
            source: None,
        }
        .into();

        assert!(matches!(err, GovernanceError::InvalidRequest { .. }));
    }
}
