//! Remote calendar client for sync operations.
//!
//! Each task maps to one `.ics` resource under a collection URL. Writes are
//! whole-resource `PUT`s, so pushing the same task twice is harmless.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::ConfigError;
use crate::storage::SyncConfig;
use crate::sync::types::{RemoteError, ResourceId};

const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Remote side of the sync: somewhere resources can be written and removed.
///
/// Implementations perform no retries; the reconciler decides what to do
/// with a failure.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Create or replace a resource.
    async fn upsert(&self, resource: &ResourceId, document: &str) -> Result<(), RemoteError>;

    /// Remove a resource. Removing an absent resource succeeds.
    async fn delete(&self, resource: &ResourceId) -> Result<(), RemoteError>;

    /// Pick up a replaced configuration.
    fn reconfigure(&mut self, _config: &SyncConfig) -> Result<(), ConfigError> {
        Ok(()) // default no-op
    }
}

struct Endpoint {
    collection: Url,
    username: String,
    password: String,
}

impl Endpoint {
    fn resource_url(&self, resource: &ResourceId) -> Result<Url, RemoteError> {
        let name = format!("{}.ics", urlencoding::encode(resource.as_str()));
        self.collection
            .join(&name)
            .map_err(|e| RemoteError::Unavailable(format!("invalid resource url for {resource}: {e}")))
    }
}

/// HTTP client for a CalDAV-style collection.
///
/// While sync is disabled the client holds no endpoint and every call
/// succeeds without touching the network.
pub struct CalDavClient {
    http: Client,
    endpoint: Option<Endpoint>,
}

impl CalDavClient {
    /// Create a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if sync is enabled and the collection URL is invalid.
    pub fn new(config: &SyncConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: Client::new(),
            endpoint: Self::endpoint_for(config)?,
        })
    }

    fn endpoint_for(config: &SyncConfig) -> Result<Option<Endpoint>, ConfigError> {
        if !config.enabled {
            return Ok(None);
        }
        Ok(Some(Endpoint {
            collection: config.collection_url()?,
            username: config.credentials.username.clone(),
            password: config.credentials.password.clone(),
        }))
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Full URL of a resource, if sync is enabled.
    pub fn resource_url(&self, resource: &ResourceId) -> Option<Url> {
        self.endpoint
            .as_ref()
            .and_then(|ep| ep.resource_url(resource).ok())
    }
}

impl RemoteStore for CalDavClient {
    async fn upsert(&self, resource: &ResourceId, document: &str) -> Result<(), RemoteError> {
        let Some(endpoint) = &self.endpoint else {
            debug!(resource_id = %resource, "remote sync disabled; skipping upsert");
            return Ok(());
        };

        let resp = self
            .http
            .put(endpoint.resource_url(resource)?)
            .basic_auth(&endpoint.username, Some(&endpoint.password))
            .header(CONTENT_TYPE, ICS_CONTENT_TYPE)
            .body(document.to_owned())
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(rejected(resp).await)
        }
    }

    async fn delete(&self, resource: &ResourceId) -> Result<(), RemoteError> {
        let Some(endpoint) = &self.endpoint else {
            debug!(resource_id = %resource, "remote sync disabled; skipping delete");
            return Ok(());
        };

        let resp = self
            .http
            .delete(endpoint.resource_url(resource)?)
            .basic_auth(&endpoint.username, Some(&endpoint.password))
            .send()
            .await?;

        match resp.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(resource_id = %resource, "remote resource already absent");
                Ok(())
            }
            _ => Err(rejected(resp).await),
        }
    }

    fn reconfigure(&mut self, config: &SyncConfig) -> Result<(), ConfigError> {
        self.endpoint = Self::endpoint_for(config)?;
        Ok(())
    }
}

async fn rejected(resp: Response) -> RemoteError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    RemoteError::Rejected { status, body }
}
