//! Boundary to the remote data service.

use std::marker::PhantomData;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::error::{ApiError, ApiException, ErrorCode};
use tracing::debug;

use crate::{config::ClientSettings, resource::Resource};

/// CRUD contract for one resource kind. Every failure is opaque to callers.
#[async_trait]
pub trait Gateway<R: Resource>: Send + Sync {
    async fn list(&self) -> Result<Vec<R::Entity>>;
    async fn create(&self, payload: &R::Create) -> Result<R::Entity>;
    async fn update(&self, id: R::Id, payload: &R::Update) -> Result<R::Entity>;
    async fn delete(&self, id: R::Id) -> Result<()>;
}

pub struct HttpGateway<R> {
    http: Client,
    base_url: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpGateway<R> {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .context("failed to build http client")?;
        Ok(Self::with_client(http, settings.base_url()?))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            _resource: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::KIND.path())
    }

    fn item_url(&self, id: R::Id) -> String {
        format!("{}/{}/{id}", self.base_url, R::KIND.path())
    }
}

/// Turns a non-success response into an [`ApiException`], using the
/// service's error body when it sent one.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ApiError>(&body).unwrap_or_else(|_| {
        let code = if status == reqwest::StatusCode::NOT_FOUND {
            ErrorCode::NotFound
        } else {
            ErrorCode::Internal
        };
        ApiError::new(code, status.to_string())
    });
    Err(ApiException::new(status.as_u16(), error).into())
}

#[async_trait]
impl<R: Resource> Gateway<R> for HttpGateway<R> {
    async fn list(&self) -> Result<Vec<R::Entity>> {
        debug!(resource = R::KIND.path(), "gateway list");
        let response = self.http.get(self.collection_url()).send().await?;
        let entities = ensure_success(response).await?.json().await?;
        Ok(entities)
    }

    async fn create(&self, payload: &R::Create) -> Result<R::Entity> {
        debug!(resource = R::KIND.path(), "gateway create");
        let response = self
            .http
            .post(self.collection_url())
            .json(payload)
            .send()
            .await?;
        let entity = ensure_success(response).await?.json().await?;
        Ok(entity)
    }

    async fn update(&self, id: R::Id, payload: &R::Update) -> Result<R::Entity> {
        debug!(resource = R::KIND.path(), %id, "gateway update");
        let response = self.http.put(self.item_url(id)).json(payload).send().await?;
        let entity = ensure_success(response).await?.json().await?;
        Ok(entity)
    }

    async fn delete(&self, id: R::Id) -> Result<()> {
        debug!(resource = R::KIND.path(), %id, "gateway delete");
        let response = self.http.delete(self.item_url(id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
