use crate::config::Settings;
use crate::error::ServiceError;
use crate::models::{CreateProductPayload, CreatedProduct, Model, PartNumber, UploadedPicture};
use crate::services::traits::{
    CatalogService, PartNumberService, PictureUploadService, ProductCreateService,
};
use crate::services::types::{Credentials, ErrorBody, RefreshRequest, RefreshResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const MODELS_PATH: &str = "/api/store/modelmobile/";
const PICTURE_PATH: &str = "/api/store/picture/";
const PART_NUMBERS_PATH: &str = "/api/store/pardnumber";
const PRODUCT_PATH: &str = "/api/store/product/";
const REFRESH_PATH: &str = "/api/user/refresh/";

/// HTTP client for the store backend
///
/// Attaches the bearer token to every request. An authorization failure
/// triggers one token refresh and one retry; whatever comes back after that
/// is final.
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: RwLock<Credentials>,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            credentials: RwLock::new(Credentials {
                access_token: settings.access_token.clone(),
                refresh_token: settings.refresh_token.clone(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Current access token, after any refresh
    pub async fn access_token(&self) -> Option<String> {
        self.credentials.read().await.access_token.clone()
    }

    async fn send<F>(&self, build: F) -> Result<Response, ServiceError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let response = self.send_once(&build).await?;
        if !is_auth_failure(response.status()) {
            return ensure_success(response).await;
        }

        warn!("Request unauthorized ({}), refreshing session", response.status());
        self.refresh().await?;

        let retried = self.send_once(&build).await?;
        ensure_success(retried).await
    }

    async fn send_once<F>(&self, build: &F) -> Result<Response, ServiceError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let token = self.access_token().await;
        let mut request = build(&self.client);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    async fn refresh(&self) -> Result<(), ServiceError> {
        let refresh = self
            .credentials
            .read()
            .await
            .refresh_token
            .clone()
            .ok_or(ServiceError::Unauthorized)?;

        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Session refresh failed with status {}", response.status());
            let mut credentials = self.credentials.write().await;
            *credentials = Credentials::default();
            return Err(ServiceError::Unauthorized);
        }

        let body: RefreshResponse = response.json().await?;
        self.credentials.write().await.access_token = Some(body.access_token);
        info!("Session refreshed");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.send(|client| client.get(&url)).await?;
        Ok(response.json().await?)
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    warn!("Backend returned status {}: {}", status, message);
    Err(ServiceError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CatalogService for ApiClient {
    async fn list_models(&self) -> Result<Vec<Model>, ServiceError> {
        let models: Vec<Model> = self.get_json(MODELS_PATH).await?;
        debug!("Fetched {} models", models.len());
        Ok(models)
    }
}

#[async_trait]
impl PartNumberService for ApiClient {
    async fn list(&self) -> Result<Vec<PartNumber>, ServiceError> {
        self.get_json(PART_NUMBERS_PATH).await
    }
}

#[async_trait]
impl PictureUploadService for ApiClient {
    async fn upload(
        &self,
        file_bytes: Vec<u8>,
        file_name: &str,
    ) -> Result<UploadedPicture, ServiceError> {
        let url = self.url(PICTURE_PATH);
        debug!("Uploading {} ({} bytes)", file_name, file_bytes.len());

        // The form is consumed by send, so each attempt rebuilds it.
        let response = self
            .send(|client| {
                let part = Part::bytes(file_bytes.clone()).file_name(file_name.to_string());
                let form = Form::new()
                    .part("file", part)
                    .text("name", file_name.to_string());
                client.post(&url).multipart(form)
            })
            .await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ProductCreateService for ApiClient {
    async fn create(&self, payload: &CreateProductPayload) -> Result<CreatedProduct, ServiceError> {
        let url = self.url(PRODUCT_PATH);
        debug!("POST {}", url);
        let response = self.send(|client| client.post(&url).json(payload)).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
