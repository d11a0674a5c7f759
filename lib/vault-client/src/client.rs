use crate::error::VaultError;
use crate::models::{KvData, KvVersion};
use std::collections::HashMap;
use std::time::Duration;

const DEFAULT_MOUNT: &str = "secret";
const DEFAULT_FIELD: &str = "value";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct VaultClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    mount: Option<String>,
    field: Option<String>,
    application_name: Option<String>,
    timeout: Duration,
}

impl Default for VaultClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            mount: None,
            field: None,
            application_name: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// KV v2 mount point, `secret` unless overridden
    pub fn mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = Some(mount.into());
        self
    }

    /// Field inside the secret data that holds the value
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve_config(&self) -> Result<ResolvedConfig, VaultError> {
        let base_url = self
            .base_url
            .clone()
            .or_else(|| std::env::var("VAULT_ADDR").ok())
            .filter(|url| !url.is_empty())
            .ok_or(VaultError::VaultNotDetected)?;

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("VAULT_TOKEN").ok())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| VaultError::AuthError("VAULT_TOKEN not set".to_string()))?;

        let mount = self
            .mount
            .clone()
            .or_else(|| std::env::var("VAULT_MOUNT").ok())
            .unwrap_or_else(|| DEFAULT_MOUNT.to_string());

        let field = self
            .field
            .clone()
            .or_else(|| std::env::var("VAULT_SECRET_FIELD").ok())
            .unwrap_or_else(|| DEFAULT_FIELD.to_string());

        Ok(ResolvedConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            mount,
            field,
        })
    }

    pub fn build(self) -> Result<VaultClient, VaultError> {
        let config = self.resolve_config()?;

        let mut http = reqwest::Client::builder().timeout(self.timeout);
        if let Some(app_name) = self.application_name {
            http = http.user_agent(app_name);
        }
        let http = http
            .build()
            .map_err(|e| VaultError::RequestError(e.to_string()))?;

        Ok(VaultClient {
            base_url: config.base_url,
            token: config.token,
            mount: config.mount,
            field: config.field,
            http,
        })
    }
}

struct ResolvedConfig {
    base_url: String,
    token: String,
    mount: String,
    field: String,
}

pub struct VaultClient {
    base_url: String,
    token: String,
    mount: String,
    field: String,
    http: reqwest::Client,
}

impl VaultClient {
    pub fn from_env() -> Result<Self, VaultError> {
        VaultClientBuilder::new().build()
    }

    pub fn builder() -> VaultClientBuilder {
        VaultClientBuilder::new()
    }

    /// Read the configured field of a named secret.
    ///
    /// Returns `Ok(None)` when the secret exists but the field is absent or not a string.
    pub async fn get_secret(&self, name: &str) -> Result<Option<String>, VaultError> {
        let data = self.kv_read(&self.mount, name).await?;
        Ok(data
            .data
            .get(&self.field)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    pub async fn kv_read(&self, mount: &str, path: &str) -> Result<KvData, VaultError> {
        let url = format!("{}/v1/{}/data/{}", self.base_url, mount, path);
        tracing::debug!(mount = %mount, path = %path, "Reading secret from Vault");

        let response = self
            .http
            .get(&url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .map_err(|e| VaultError::RequestError(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(VaultError::SecretNotFound {
                path: path.to_string(),
            });
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(VaultError::ClientError {
                status,
                message: body,
            });
        }

        #[derive(serde::Deserialize)]
        struct KvResponse {
            data: KvResponseData,
        }

        #[derive(serde::Deserialize)]
        struct KvResponseData {
            data: Option<HashMap<String, serde_json::Value>>,
            metadata: KvVersionResponse,
        }

        #[derive(serde::Deserialize)]
        struct KvVersionResponse {
            version: u64,
            created_time: String,
            #[serde(default)]
            destroyed: bool,
        }

        let resp: KvResponse = response
            .json()
            .await
            .map_err(|e| VaultError::RequestError(format!("Invalid response: {}", e)))?;

        Ok(KvData {
            // destroyed or soft-deleted versions come back with `data: null`
            data: resp.data.data.unwrap_or_default(),
            metadata: KvVersion {
                version: resp.data.metadata.version,
                created_time: resp
                    .data
                    .metadata
                    .created_time
                    .parse()
                    .map_err(|e| VaultError::RequestError(format!("Invalid timestamp: {}", e)))?,
                destroyed: resp.data.metadata.destroyed,
            },
        })
    }
}
