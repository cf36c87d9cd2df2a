//! Portfolio data surface.
//!
//! [`PortfolioService`] is the async seam the loaders fetch through. Two
//! implementations exist: [`HttpPortfolioApi`] for a real backend and
//! [`MockPortfolioApi`] for local fixtures. Both build [`Failure`] values at
//! the boundary so everything above them classifies errors the same way.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Failure;

pub mod client;
pub mod mock;
pub mod models;

pub use client::{HttpMessageApi, HttpPortfolioApi};
pub use mock::MockPortfolioApi;
pub use models::{
    Certification, ContactMessage, ExperienceEntry, FileRef, Miniature, MiniatureTheme, Profile,
    Project, SkillGroup, Technology,
};

/// Envelope every endpoint returns: the payload under a `data` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// The portfolio backend as the loaders see it.
#[async_trait]
pub trait PortfolioService: Send + Sync {
    async fn get_profile(&self) -> Result<ApiResponse<Profile>, Failure>;

    async fn get_experience(&self) -> Result<ApiResponse<Vec<ExperienceEntry>>, Failure>;

    async fn get_certifications(&self) -> Result<ApiResponse<Vec<Certification>>, Failure>;

    async fn get_skills(&self) -> Result<ApiResponse<Vec<SkillGroup>>, Failure>;

    async fn get_projects(&self) -> Result<ApiResponse<Vec<Project>>, Failure>;

    async fn get_project(&self, id: &str) -> Result<ApiResponse<Project>, Failure>;

    async fn get_miniature_themes(&self) -> Result<ApiResponse<Vec<MiniatureTheme>>, Failure>;

    /// Fetches one theme with its miniatures embedded.
    async fn get_miniature_theme(&self, id: &str) -> Result<ApiResponse<MiniatureTheme>, Failure>;

    async fn get_miniature(&self, id: &str) -> Result<ApiResponse<Miniature>, Failure>;
}

/// The contact-message backend: a separate deployment from the portfolio
/// API, reached through its own base URL.
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Submits a visitor message. Failures flow through the same pipeline
    /// as fetches, so the contact form gets retries and notices for free.
    async fn send_contact_message(&self, message: &ContactMessage) -> Result<(), Failure>;
}
