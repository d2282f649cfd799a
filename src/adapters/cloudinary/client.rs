//! Cloudinary REST client
//!
//! Uploads and single deletes go through the signed upload API; prefix and folder
//! removal go through the admin API with basic authentication.

use super::signature::sign;
use crate::adapters::blob_store::BlobStore;
use crate::config::schema::CloudinaryConfig;
use crate::domain::{AssetDescriptor, BlobKind, BlobStoreError, FolderKey, FolioError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary implementation of [`BlobStore`]
pub struct CloudinaryBlobStore {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryBlobStore {
    /// Create a new Cloudinary client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FolioError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name,
            path
        )
    }

    fn basic_auth(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.api_key,
            self.config.api_secret.expose_secret().as_str()
        );
        format!("Basic {}", general_purpose::STANDARD.encode(credentials.as_bytes()))
    }

    /// Parameters plus `api_key`, `timestamp` and `signature`
    fn signed(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", chrono::Utc::now().timestamp().to_string()));
        params.push(("signature_algorithm", "sha256".to_string()));
        let signature = sign(&params, self.config.api_secret.expose_secret().as_str());
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| BlobStoreError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            Err(BlobStoreError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into())
        } else {
            Err(BlobStoreError::ClientError {
                status: status.as_u16(),
                message,
            }
            .into())
        }
    }

    async fn admin_delete(&self, path: &str, query: &[(&str, &str)]) -> Result<()> {
        let request = self
            .client
            .delete(self.endpoint(path))
            .header("Authorization", self.basic_auth())
            .query(query);
        Self::send(request).await.map(|_| ())
    }
}

#[async_trait]
impl BlobStore for CloudinaryBlobStore {
    fn backend_name(&self) -> &str {
        "cloudinary"
    }

    async fn upload(
        &self,
        local_path: &Path,
        dest_prefix: &FolderKey,
        kind: BlobKind,
    ) -> Result<AssetDescriptor> {
        let bytes = tokio::fs::read(local_path).await.map_err(|e| {
            BlobStoreError::LocalFile(format!("{}: {}", local_path.display(), e))
        })?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        for (key, value) in self.signed(vec![("folder", dest_prefix.to_string())]) {
            form = form.text(key, value);
        }

        let request = self
            .client
            .post(self.endpoint(&format!("{}/upload", kind.as_str())))
            .multipart(form);
        let descriptor: AssetDescriptor = Self::send(request)
            .await?
            .json()
            .await
            .map_err(|e| BlobStoreError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            remote_id = %descriptor.remote_id,
            folder = %dest_prefix,
            "Uploaded asset to Cloudinary"
        );
        Ok(descriptor)
    }

    async fn delete(&self, remote_id: &str, kind: BlobKind) -> Result<()> {
        let params = self.signed(vec![("public_id", remote_id.to_string())]);
        let request = self
            .client
            .post(self.endpoint(&format!("{}/destroy", kind.as_str())))
            .form(&params);

        let outcome: DestroyResponse = Self::send(request)
            .await
            .map_err(|e| BlobStoreError::DeleteFailed {
                remote_id: remote_id.to_string(),
                message: e.to_string(),
            })?
            .json()
            .await
            .map_err(|e| BlobStoreError::InvalidResponse(e.to_string()))?;

        match outcome.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                tracing::debug!(remote_id, "Asset already absent from Cloudinary");
                Ok(())
            }
            other => Err(BlobStoreError::DeleteFailed {
                remote_id: remote_id.to_string(),
                message: other.to_string(),
            }
            .into()),
        }
    }

    async fn delete_by_prefix(&self, prefix: &FolderKey) -> Result<()> {
        for kind in [BlobKind::Image, BlobKind::Raw] {
            self.admin_delete(
                &format!("resources/{}/upload", kind.as_str()),
                &[("prefix", prefix.as_str())],
            )
            .await
            .map_err(|e| BlobStoreError::FolderRemovalFailed {
                prefix: prefix.to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    async fn delete_folder(&self, prefix: &FolderKey) -> Result<()> {
        self.admin_delete(&format!("folders/{prefix}"), &[])
            .await
            .map_err(|e| {
                BlobStoreError::FolderRemovalFailed {
                    prefix: prefix.to_string(),
                    message: e.to_string(),
                }
                .into()
            })
    }
}
