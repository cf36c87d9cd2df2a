//! Serde models for the portfolio API payloads.
//!
//! The backend serializes camelCase JSON; every model carries the matching
//! rename so field names stay idiomatic on this side.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A file attachment as the backend exposes it: just a resolvable URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub url: String,
}

/// The site owner's profile shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub tagline: String,
    #[serde(default)]
    pub avatar_file: Option<FileRef>,
    #[serde(default)]
    pub resume_file: Option<FileRef>,
}

/// One position on the resume timeline. Dates are year-month strings
/// ("2022-01"); `end_date` is absent while `is_current` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: u64,
    pub position: String,
    pub company: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_current: bool,
}

/// A professional certification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: u64,
    pub name: String,
    pub issuer: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub credential_url: Option<String>,
}

/// Skills grouped under a display category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

/// A technology used on a project, tagged with its stack layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub skill: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A portfolio project, listed or fetched individually by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub image_file: Option<FileRef>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_ongoing: bool,
    #[serde(default)]
    pub team_size: Option<u32>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
}

/// A miniature painting theme. `miniatures` is populated only by the
/// theme-by-id endpoint; the list endpoint leaves it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniatureTheme {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub miniatures: Vec<Miniature>,
}

/// A visitor message submitted through the contact form, posted to the
/// message API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// A single painted miniature belonging to a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Miniature {
    pub id: u64,
    pub theme_id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_file: Option<FileRef>,
    #[serde(default)]
    pub year: Option<i32>,
}
