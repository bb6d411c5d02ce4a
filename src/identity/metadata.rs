use std::time::Duration;

use crate::consts::{METADATA_FLAVOR, METADATA_FLAVOR_HEADER, METADATA_TIMEOUT_SECS, PROJECT_ID_PATH};

use super::IdentityError;

/// Minimal client for the hosting platform's metadata service.
pub struct MetadataClient {
    base_url: String,
    client: reqwest::Client,
}

impl MetadataClient {
    /// `host` is a bare `host[:port]`, as in `GCE_METADATA_HOST`.
    pub fn new(host: &str) -> Result<Self, IdentityError> {
        // The metadata service is link-local; never route it through a proxy.
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(METADATA_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Metadata(e.to_string()))?;
        Ok(Self {
            base_url: format!("http://{}", host.trim_end_matches('/')),
            client,
        })
    }

    /// Fetch the project id this process runs under.
    pub async fn project_id(&self) -> Result<String, IdentityError> {
        self.get(PROJECT_ID_PATH).await
    }

    async fn get(&self, path: &str) -> Result<String, IdentityError> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR)
            .send()
            .await
            .map_err(|e| IdentityError::Metadata(format!("{url}: {e}")))?;

        if !resp.status().is_success() {
            return Err(IdentityError::Metadata(format!(
                "{url}: unexpected status {}",
                resp.status()
            )));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| IdentityError::Metadata(format!("{url}: {e}")))?;
        let value = text.trim();
        if value.is_empty() {
            return Err(IdentityError::Metadata(format!("{url}: empty response")));
        }
        Ok(value.to_string())
    }
}
