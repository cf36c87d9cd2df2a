use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};

use folioweb::api::models::{
    Certification, ContactMessage, ExperienceEntry, MiniatureTheme, Profile, Project, SkillGroup,
};
use folioweb::api::{
    HttpMessageApi, HttpPortfolioApi, MessageService, MockPortfolioApi, PortfolioService,
};
use folioweb::config::SiteConfig;
use folioweb::handler::ErrorHandler;
use folioweb::loader::{DataLoader, FetchFn, LoaderState};
use folioweb::logging::{init_logging, LogLevel, LoggingConfig};
use folioweb::nav::LogNavigator;
use folioweb::notify::LogNotifier;
use folioweb::retry::RetryLedger;

#[derive(Parser, Debug)]
#[command(name = "folioweb")]
#[command(version)]
#[command(about = "Fetches and renders a portfolio as plain text")]
struct Cli {
    /// Serve fixture data instead of calling an API
    #[arg(long)]
    mock: bool,

    /// Base URL of the portfolio API (overrides configuration)
    #[arg(long)]
    api_url: Option<String>,

    /// Base URL of the contact-message API (overrides configuration)
    #[arg(long)]
    message_api_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Send a contact message instead of rendering the portfolio
    #[arg(long, requires = "name", requires = "email")]
    message: Option<String>,

    /// Sender name for --message
    #[arg(long, requires = "message")]
    name: Option<String>,

    /// Sender email for --message
    #[arg(long, requires = "message")]
    email: Option<String>,

    /// Optional subject line for --message
    #[arg(long, requires = "message")]
    subject: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Suppress all log output
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LogLevel::Off
    } else {
        LogLevel::from_verbosity(cli.verbose)
    };
    init_logging(LoggingConfig::new().with_level(level));

    let mut config = match SiteConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    if cli.mock {
        config.use_mock_data = true;
    }
    if let Some(url) = cli.api_url {
        config.api_url = Some(url);
    }
    if let Some(url) = cli.message_api_url {
        config.message_api_url = Some(url);
    }
    if let Err(err) = config.validate() {
        eprintln!("error: {}", err);
        return ExitCode::FAILURE;
    }

    if let Some(text) = cli.message {
        let messages: Arc<dyn MessageService> = if config.use_mock_data {
            tracing::info!("using mock data");
            Arc::new(MockPortfolioApi::new())
        } else {
            // validate() guarantees the URL is present here
            let message_api_url = config.message_api_url.clone().unwrap_or_default();
            match HttpMessageApi::new(message_api_url) {
                Ok(api) => Arc::new(api),
                Err(err) => {
                    eprintln!("error: {}", err);
                    return ExitCode::FAILURE;
                }
            }
        };
        let contact = ContactMessage {
            // clap's `requires` guarantees name and email accompany --message
            name: cli.name.unwrap_or_default(),
            email: cli.email.unwrap_or_default(),
            subject: cli.subject,
            message: text,
        };
        return match messages.send_contact_message(&contact).await {
            Ok(()) => {
                println!("Message sent.");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        };
    }

    let service: Arc<dyn PortfolioService> = if config.use_mock_data {
        tracing::info!("using mock data");
        Arc::new(MockPortfolioApi::new())
    } else {
        // validate() guarantees the URL is present here
        let api_url = config.api_url.clone().unwrap_or_default();
        match HttpPortfolioApi::new(api_url) {
            Ok(api) => Arc::new(api),
            Err(err) => {
                eprintln!("error: {}", err);
                return ExitCode::FAILURE;
            }
        }
    };

    let handler = ErrorHandler::new(
        RetryLedger::new(),
        Arc::new(LogNotifier),
        Arc::new(LogNavigator),
    );

    match render_portfolio(service, handler).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Loads every portfolio section through the loader pipeline and renders
/// whatever arrived. Sections that failed (after retries) simply come back
/// empty; the handler already reported them.
async fn render_portfolio(
    service: Arc<dyn PortfolioService>,
    handler: ErrorHandler,
) -> Result<String, folioweb::loader::ConfigurationError> {
    let profile_state = LoaderState::<Profile>::shared();
    let experience_state = LoaderState::<Vec<ExperienceEntry>>::shared();
    let skills_state = LoaderState::<Vec<SkillGroup>>::shared();
    let certifications_state = LoaderState::<Vec<Certification>>::shared();
    let projects_state = LoaderState::<Vec<Project>>::shared();
    let themes_state = LoaderState::<Vec<MiniatureTheme>>::shared();

    let profile_fetch: FetchFn<Profile> = {
        let service = service.clone();
        Arc::new(move || {
            let service = service.clone();
            Box::pin(async move { service.get_profile().await })
        })
    };
    let experience_fetch: FetchFn<Vec<ExperienceEntry>> = {
        let service = service.clone();
        Arc::new(move || {
            let service = service.clone();
            Box::pin(async move { service.get_experience().await })
        })
    };
    let skills_fetch: FetchFn<Vec<SkillGroup>> = {
        let service = service.clone();
        Arc::new(move || {
            let service = service.clone();
            Box::pin(async move { service.get_skills().await })
        })
    };
    let certifications_fetch: FetchFn<Vec<Certification>> = {
        let service = service.clone();
        Arc::new(move || {
            let service = service.clone();
            Box::pin(async move { service.get_certifications().await })
        })
    };
    let projects_fetch: FetchFn<Vec<Project>> = {
        let service = service.clone();
        Arc::new(move || {
            let service = service.clone();
            Box::pin(async move { service.get_projects().await })
        })
    };
    let themes_fetch: FetchFn<Vec<MiniatureTheme>> = {
        let service = service.clone();
        Arc::new(move || {
            let service = service.clone();
            Box::pin(async move { service.get_miniature_themes().await })
        })
    };

    let profile_loader = DataLoader::builder()
        .state(profile_state.clone())
        .service(profile_fetch)
        .entity_name("profile")
        .handler(handler.clone())
        .build()?;
    let experience_loader = DataLoader::builder()
        .state(experience_state.clone())
        .service(experience_fetch)
        .entity_name("experience")
        .handler(handler.clone())
        .build()?;
    let skills_loader = DataLoader::builder()
        .state(skills_state.clone())
        .service(skills_fetch)
        .entity_name("skills")
        .handler(handler.clone())
        .build()?;
    let certifications_loader = DataLoader::builder()
        .state(certifications_state.clone())
        .service(certifications_fetch)
        .entity_name("certifications")
        .handler(handler.clone())
        .build()?;
    let projects_loader = DataLoader::builder()
        .state(projects_state.clone())
        .service(projects_fetch)
        .entity_name("projects")
        .handler(handler.clone())
        .build()?;
    let themes_loader = DataLoader::builder()
        .state(themes_state.clone())
        .service(themes_fetch)
        .entity_name("themes")
        .handler(handler.clone())
        .build()?;

    tokio::join!(
        profile_loader.load(),
        experience_loader.load(),
        skills_loader.load(),
        certifications_loader.load(),
        projects_loader.load(),
        themes_loader.load(),
    );

    let mut out = String::new();

    if let Some(profile) = profile_state.data() {
        out.push_str(&format!("{}\n{}\n{}\n", profile.name, profile.title, profile.tagline));
    }

    if let Some(entries) = experience_state.data() {
        out.push_str("\nExperience\n");
        for entry in &entries {
            let end = if entry.is_current {
                "present".to_string()
            } else {
                entry.end_date.clone().unwrap_or_default()
            };
            out.push_str(&format!(
                "  {} at {} ({} - {})\n",
                entry.position, entry.company, entry.start_date, end
            ));
        }
    }

    if let Some(groups) = skills_state.data() {
        out.push_str("\nSkills\n");
        for group in &groups {
            out.push_str(&format!("  {}: {}\n", group.category, group.skills.join(", ")));
        }
    }

    if let Some(certifications) = certifications_state.data() {
        out.push_str("\nCertifications\n");
        for cert in &certifications {
            out.push_str(&format!(
                "  {} ({}, {})\n",
                cert.name, cert.issuer, cert.issue_date
            ));
        }
    }

    if let Some(projects) = projects_state.data() {
        out.push_str("\nProjects\n");
        for project in &projects {
            out.push_str(&format!(
                "  {} [{}] - {}\n",
                project.title, project.category, project.description
            ));
        }
    }

    if let Some(themes) = themes_state.data() {
        out.push_str("\nMiniature themes\n");
        for theme in &themes {
            out.push_str(&format!("  {}\n", theme.name));
        }
    }

    Ok(out)
}
