//! HTTP-backed portfolio service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::models::{
    Certification, ContactMessage, ExperienceEntry, Miniature, MiniatureTheme, Profile, Project,
    SkillGroup,
};
use super::{ApiResponse, MessageService, PortfolioService};
use crate::error::Failure;

/// Per-request timeout. Requests past this surface as 408 and retry.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shape of the backend's error bodies, when it sends one.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Portfolio service backed by a real HTTP API.
///
/// All transport and status errors are converted to [`Failure`] here, at the
/// boundary. Non-2xx responses keep their status and, when the body is a JSON
/// object with a `message` field, that message.
#[derive(Debug, Clone)]
pub struct HttpPortfolioApi {
    client: Client,
    base_url: String,
}

impl HttpPortfolioApi {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Failure> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Failure::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Failure> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "fetching");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(match message {
                Some(msg) => Failure::status_with_message(status.as_u16(), msg),
                None => Failure::status(status.as_u16()),
            });
        }

        let data = response
            .json::<T>()
            .await
            .map_err(|e| Failure::network(format!("failed to parse response: {}", e)))?;
        Ok(ApiResponse { data })
    }
}

/// Contact-message service backed by the message API deployment.
///
/// Shares the boundary rules of [`HttpPortfolioApi`]: transport errors and
/// non-2xx statuses become [`Failure`] values here and nowhere else.
#[derive(Debug, Clone)]
pub struct HttpMessageApi {
    client: Client,
    base_url: String,
}

impl HttpMessageApi {
    /// Creates a client for the message API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Failure> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Failure::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MessageService for HttpMessageApi {
    async fn send_contact_message(&self, message: &ContactMessage) -> Result<(), Failure> {
        let url = format!("{}/contact", self.base_url);
        tracing::debug!(%url, "sending contact message");

        let response = self.client.post(&url).json(message).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(match body_message {
                Some(msg) => Failure::status_with_message(status.as_u16(), msg),
                None => Failure::status(status.as_u16()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl PortfolioService for HttpPortfolioApi {
    async fn get_profile(&self) -> Result<ApiResponse<Profile>, Failure> {
        self.get_json("/profile").await
    }

    async fn get_experience(&self) -> Result<ApiResponse<Vec<ExperienceEntry>>, Failure> {
        self.get_json("/experience").await
    }

    async fn get_certifications(&self) -> Result<ApiResponse<Vec<Certification>>, Failure> {
        self.get_json("/certifications").await
    }

    async fn get_skills(&self) -> Result<ApiResponse<Vec<SkillGroup>>, Failure> {
        self.get_json("/skills").await
    }

    async fn get_projects(&self) -> Result<ApiResponse<Vec<Project>>, Failure> {
        self.get_json("/projects").await
    }

    async fn get_project(&self, id: &str) -> Result<ApiResponse<Project>, Failure> {
        self.get_json(&format!("/projects/{}", id)).await
    }

    async fn get_miniature_themes(&self) -> Result<ApiResponse<Vec<MiniatureTheme>>, Failure> {
        self.get_json("/themes").await
    }

    async fn get_miniature_theme(&self, id: &str) -> Result<ApiResponse<MiniatureTheme>, Failure> {
        self.get_json(&format!("/themes/{}", id)).await
    }

    async fn get_miniature(&self, id: &str) -> Result<ApiResponse<Miniature>, Failure> {
        self.get_json(&format!("/miniatures/{}", id)).await
    }
}
