use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter directive, e.g. `info` or `attendanced=debug`.
    pub log_level: String,

    pub seed_admin: SeedAdminConfig,

    pub attendance: AttendanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedAdminConfig {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Age in days used by `attendance.deleteOld` when the request names none.
    pub retention_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            seed_admin: SeedAdminConfig::default(),
            attendance: AttendanceConfig::default(),
        }
    }
}

impl Default for SeedAdminConfig {
    fn default() -> Self {
        Self {
            email: "admin@example.com".to_string(),
            name: "Admin User".to_string(),
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self { retention_days: 30 }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.seed_admin.email.trim().is_empty() {
            anyhow::bail!("seed_admin.email must not be empty");
        }
        Ok(())
    }
}
