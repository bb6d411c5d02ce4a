//! Who this process is: the project it runs under and its service name.

pub mod metadata;

use metadata::MetadataClient;

/// Resolved once during init and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub project_id: String,
    pub service_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("failed to get project-id from metadata service: {0}")]
    Metadata(String),
    #[error("service name is not set (expected {0})")]
    MissingServiceName(&'static str),
}

impl ProcessIdentity {
    /// Resolve the identity. An explicit project id skips the metadata lookup.
    pub async fn resolve(
        project_id: Option<String>,
        service_name: Option<String>,
        metadata_host: &str,
    ) -> Result<Self, IdentityError> {
        let service_name = service_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(IdentityError::MissingServiceName(
                crate::consts::SERVICE_NAME_ENV,
            ))?;

        let project_id = match project_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => MetadataClient::new(metadata_host)?.project_id().await?,
        };

        Ok(Self {
            project_id,
            service_name,
        })
    }

    /// Span every request runs inside, tagging its events with this identity.
    pub fn request_span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            project = %self.project_id,
            service = %self.service_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_project_id_skips_metadata() {
        // Port 9 (discard) is never a metadata service; resolving must not touch it.
        let identity = ProcessIdentity::resolve(
            Some("local-project".to_string()),
            Some("fn-compute-pricelist-histories".to_string()),
            "127.0.0.1:9",
        )
        .await
        .unwrap();

        assert_eq!(identity.project_id, "local-project");
        assert_eq!(identity.service_name, "fn-compute-pricelist-histories");
    }

    #[tokio::test]
    async fn missing_service_name_is_an_error() {
        let err = ProcessIdentity::resolve(Some("p".to_string()), None, "127.0.0.1:9")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::MissingServiceName("FUNCTION_NAME")));
    }

    #[tokio::test]
    async fn blank_service_name_is_an_error() {
        let err =
            ProcessIdentity::resolve(Some("p".to_string()), Some("  ".to_string()), "127.0.0.1:9")
                .await
                .unwrap_err();
        assert!(matches!(err, IdentityError::MissingServiceName(_)));
    }

    #[test]
    fn request_span_is_constructible_without_subscriber() {
        let identity = ProcessIdentity {
            project_id: "p".to_string(),
            service_name: "s".to_string(),
        };
        let _span = identity.request_span();
    }
}
