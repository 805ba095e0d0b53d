//! Runtime configuration loaded from the environment (and `.env` when present).

use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_ASSETS_DIR: &str = "./static/assets";
const DEFAULT_JWT_SECRET: &str = "registrar-portal-jwt-secret-change-in-production";
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Institution details printed in letterheads and signature blocks.
#[derive(Debug, Clone)]
pub struct SchoolProfile {
    pub name: String,
    pub address: String,
    pub registrar_name: String,
    pub registrar_title: String,
    pub head_name: String,
    pub head_title: String,
}

impl Default for SchoolProfile {
    fn default() -> Self {
        Self {
            name: "Saint Benedict College".to_string(),
            address: "Rizal Avenue, Poblacion".to_string(),
            registrar_name: "Maria Teresa D. Santos".to_string(),
            registrar_title: "College Registrar".to_string(),
            head_name: "Dr. Ramon L. Villanueva".to_string(),
            head_title: "College President".to_string(),
        }
    }
}

impl SchoolProfile {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env_or("SCHOOL_NAME", defaults.name),
            address: env_or("SCHOOL_ADDRESS", defaults.address),
            registrar_name: env_or("SCHOOL_REGISTRAR_NAME", defaults.registrar_name),
            registrar_title: env_or("SCHOOL_REGISTRAR_TITLE", defaults.registrar_title),
            head_name: env_or("SCHOOL_HEAD_NAME", defaults.head_name),
            head_title: env_or("SCHOOL_HEAD_TITLE", defaults.head_title),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: Option<String>,
    pub student_records_url: Option<String>,
    pub public_base_url: String,
    pub assets_dir: String,
    pub jwt_secret: String,
    pub approval_session_idle: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub school: SchoolProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            database_url: None,
            student_records_url: None,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            assets_dir: DEFAULT_ASSETS_DIR.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            approval_session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            school: SchoolProfile::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using default secret. SET THIS IN PRODUCTION!");
            defaults.jwt_secret.clone()
        });

        let approval_session_idle = match env::var("APPROVAL_SESSION_IDLE_SECS") {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "APPROVAL_SESSION_IDLE_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.approval_session_idle,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        Ok(Self {
            bind_address: env_or("BIND_ADDRESS", defaults.bind_address),
            database_url: env::var("DATABASE_URL").ok(),
            student_records_url: env::var("STUDENT_RECORDS_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            public_base_url: env_or("PUBLIC_BASE_URL", defaults.public_base_url)
                .trim_end_matches('/')
                .to_string(),
            assets_dir: env_or("ASSETS_DIR", defaults.assets_dir),
            jwt_secret,
            approval_session_idle,
            cors_allowed_origins,
            school: SchoolProfile::from_env(),
        })
    }

    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn env_or(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(default)
}
