// ehr_services/src/config.rs
//! Server configuration loading: YAML file with environment-variable
//! overrides, plus the optional bootstrap user list the in-memory store
//! starts from when no external persistence collaborator is wired in.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use serde_yaml2 as serde_yaml;

use models::{PatientProfile, Role, User};

use crate::storage::EhrStore;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// YAML file of users to load into the store at startup.
    #[serde(default)]
    pub bootstrap_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
            bootstrap_path: None,
        }
    }
}

/// Loads the server config from an optional YAML file, then applies
/// `EHR_SERVER_HOST`, `EHR_SERVER_PORT` and `EHR_BOOTSTRAP_PATH`
/// overrides.
pub fn load_server_config(path: Option<&Path>) -> Result<ServerConfig> {
    let mut config = match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .with_context(|| format!("failed to read config file {}", p.display()))?;
            serde_yaml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", p.display()))?
        }
        None => ServerConfig::default(),
    };

    if let Ok(host) = env::var("EHR_SERVER_HOST") {
        config.host = host;
    }
    if let Ok(port) = env::var("EHR_SERVER_PORT") {
        config.port = port.parse().context("EHR_SERVER_PORT must be a port number")?;
    }
    if let Ok(bootstrap) = env::var("EHR_BOOTSTRAP_PATH") {
        config.bootstrap_path = Some(PathBuf::from(bootstrap));
    }

    Ok(config)
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapProfile {
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub patient_profile: Option<BootstrapProfile>,
}

/// Loads a YAML list of bootstrap users into the store. Returns how many
/// users were created.
pub async fn load_bootstrap_users(store: &dyn EhrStore, path: &Path) -> Result<usize> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read bootstrap file {}", path.display()))?;
    let entries: Vec<BootstrapUser> = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse bootstrap file {}", path.display()))?;

    let count = entries.len();
    for entry in entries {
        let user = User::new(entry.name, entry.email, entry.role);
        let user = store
            .insert_user(user)
            .await
            .map_err(|e| anyhow::anyhow!("bootstrap user insert failed: {}", e))?;
        if let Some(profile) = entry.patient_profile {
            let profile = PatientProfile::new(
                user.id,
                profile.date_of_birth,
                profile.blood_group,
                profile.allergies,
            );
            store
                .insert_patient_profile(profile)
                .await
                .map_err(|e| anyhow::anyhow!("bootstrap profile insert failed: {}", e))?;
        }
        info!("bootstrapped user {} ({})", user.name, user.role);
    }
    Ok(count)
}
