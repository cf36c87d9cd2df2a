//! In-memory portfolio service for development and tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{
    Certification, ContactMessage, ExperienceEntry, FileRef, Miniature, MiniatureTheme, Profile,
    Project, SkillGroup, Technology,
};
use super::{ApiResponse, MessageService, PortfolioService};
use crate::error::Failure;

/// Default simulated network delay.
const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Portfolio service serving fixed local data.
///
/// Every call sleeps for the configured delay so loading states behave the
/// way they do against a real backend. Unknown ids fail with status 404,
/// matching what the HTTP service would produce.
#[derive(Debug, Clone)]
pub struct MockPortfolioApi {
    delay: Duration,
}

impl Default for MockPortfolioApi {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

impl MockPortfolioApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the simulated delay. Tests pass `Duration::ZERO`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn not_found(entity: &str, id: &str) -> Failure {
        Failure::status_with_message(404, format!("{} with id {} not found", entity, id))
    }
}

#[async_trait]
impl PortfolioService for MockPortfolioApi {
    async fn get_profile(&self) -> Result<ApiResponse<Profile>, Failure> {
        self.simulate_latency().await;
        Ok(ApiResponse {
            data: profile_fixture(),
        })
    }

    async fn get_experience(&self) -> Result<ApiResponse<Vec<ExperienceEntry>>, Failure> {
        self.simulate_latency().await;
        Ok(ApiResponse {
            data: experience_fixture(),
        })
    }

    async fn get_certifications(&self) -> Result<ApiResponse<Vec<Certification>>, Failure> {
        self.simulate_latency().await;
        Ok(ApiResponse {
            data: certifications_fixture(),
        })
    }

    async fn get_skills(&self) -> Result<ApiResponse<Vec<SkillGroup>>, Failure> {
        self.simulate_latency().await;
        Ok(ApiResponse {
            data: skills_fixture(),
        })
    }

    async fn get_projects(&self) -> Result<ApiResponse<Vec<Project>>, Failure> {
        self.simulate_latency().await;
        Ok(ApiResponse {
            data: projects_fixture(),
        })
    }

    async fn get_project(&self, id: &str) -> Result<ApiResponse<Project>, Failure> {
        self.simulate_latency().await;
        projects_fixture()
            .into_iter()
            .find(|p| p.id.to_string() == id)
            .map(|data| ApiResponse { data })
            .ok_or_else(|| Self::not_found("Project", id))
    }

    async fn get_miniature_themes(&self) -> Result<ApiResponse<Vec<MiniatureTheme>>, Failure> {
        self.simulate_latency().await;
        Ok(ApiResponse {
            data: themes_fixture(),
        })
    }

    async fn get_miniature_theme(&self, id: &str) -> Result<ApiResponse<MiniatureTheme>, Failure> {
        self.simulate_latency().await;
        let mut theme = themes_fixture()
            .into_iter()
            .find(|t| t.id.to_string() == id)
            .ok_or_else(|| Self::not_found("Miniature theme", id))?;
        theme.miniatures = miniatures_fixture()
            .into_iter()
            .filter(|m| m.theme_id == theme.id)
            .collect();
        Ok(ApiResponse { data: theme })
    }

    async fn get_miniature(&self, id: &str) -> Result<ApiResponse<Miniature>, Failure> {
        self.simulate_latency().await;
        miniatures_fixture()
            .into_iter()
            .find(|m| m.id.to_string() == id)
            .map(|data| ApiResponse { data })
            .ok_or_else(|| Self::not_found("Miniature", id))
    }
}

#[async_trait]
impl MessageService for MockPortfolioApi {
    async fn send_contact_message(&self, message: &ContactMessage) -> Result<(), Failure> {
        self.simulate_latency().await;
        tracing::info!(from = %message.email, "contact message accepted (mock)");
        Ok(())
    }
}

fn profile_fixture() -> Profile {
    Profile {
        name: "John Doe".to_string(),
        title: "Full-Stack Developer".to_string(),
        tagline: "Building reliable web applications".to_string(),
        avatar_file: Some(FileRef {
            url: "https://example.com/avatar.jpg".to_string(),
        }),
        resume_file: Some(FileRef {
            url: "https://example.com/resume.pdf".to_string(),
        }),
    }
}

fn experience_fixture() -> Vec<ExperienceEntry> {
    vec![
        ExperienceEntry {
            id: 1,
            position: "Senior Developer".to_string(),
            company: "Tech Corp".to_string(),
            start_date: "2022-01".to_string(),
            end_date: None,
            is_current: true,
        },
        ExperienceEntry {
            id: 2,
            position: "Developer".to_string(),
            company: "Web Studio".to_string(),
            start_date: "2019-06".to_string(),
            end_date: Some("2021-12".to_string()),
            is_current: false,
        },
    ]
}

fn certifications_fixture() -> Vec<Certification> {
    vec![Certification {
        id: 1,
        name: "AWS Solutions Architect".to_string(),
        issuer: "Amazon Web Services".to_string(),
        issue_date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap_or_default(),
        credential_url: Some("https://aws.amazon.com/cert/123".to_string()),
    }]
}

fn skills_fixture() -> Vec<SkillGroup> {
    vec![
        SkillGroup {
            category: "Frontend".to_string(),
            skills: vec!["Vue.js".to_string(), "TypeScript".to_string()],
        },
        SkillGroup {
            category: "Backend".to_string(),
            skills: vec!["Go".to_string(), "Rust".to_string(), "PostgreSQL".to_string()],
        },
        SkillGroup {
            category: "DevOps & Tools".to_string(),
            skills: vec!["Docker".to_string(), "AWS".to_string()],
        },
    ]
}

fn projects_fixture() -> Vec<Project> {
    vec![Project {
        id: 1,
        title: "Portfolio Platform".to_string(),
        category: "Web Development".to_string(),
        description: "A portfolio site with a headless CMS backend".to_string(),
        long_description: Some(
            "Full-stack portfolio platform with content management and analytics".to_string(),
        ),
        image_file: Some(FileRef {
            url: "https://example.com/project.jpg".to_string(),
        }),
        github_url: Some("https://github.com/user/portfolio".to_string()),
        live_url: Some("https://portfolio.example.com".to_string()),
        start_date: NaiveDate::from_ymd_opt(2023, 1, 15),
        end_date: None,
        is_ongoing: true,
        team_size: Some(1),
        role: Some("Developer".to_string()),
        technologies: vec![
            Technology {
                skill: "Vue.js".to_string(),
                kind: "Frontend".to_string(),
            },
            Technology {
                skill: "Go".to_string(),
                kind: "Backend".to_string(),
            },
        ],
        features: vec![
            "Responsive design".to_string(),
            "Error recovery with automatic retries".to_string(),
        ],
        challenges: vec!["Resilient data loading over flaky connections".to_string()],
    }]
}

fn themes_fixture() -> Vec<MiniatureTheme> {
    vec![
        MiniatureTheme {
            id: 1,
            name: "Undead Legion".to_string(),
            description: Some("Skeleton warriors and necromancers".to_string()),
            miniatures: Vec::new(),
        },
        MiniatureTheme {
            id: 2,
            name: "Imperial Guard".to_string(),
            description: None,
            miniatures: Vec::new(),
        },
    ]
}

fn miniatures_fixture() -> Vec<Miniature> {
    vec![
        Miniature {
            id: 1,
            theme_id: 1,
            name: "Skeleton Champion".to_string(),
            description: Some("Bone-white scheme with verdigris accents".to_string()),
            image_file: Some(FileRef {
                url: "https://example.com/skeleton.jpg".to_string(),
            }),
            year: Some(2023),
        },
        Miniature {
            id: 2,
            theme_id: 1,
            name: "Necromancer".to_string(),
            description: None,
            image_file: None,
            year: Some(2024),
        },
        Miniature {
            id: 3,
            theme_id: 2,
            name: "Guard Sergeant".to_string(),
            description: None,
            image_file: None,
            year: Some(2022),
        },
    ]
}
