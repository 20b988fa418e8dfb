//! Configuration handling for the dashboard

use crate::state::body_area::BodyView;
use crate::store::DEFAULT_DELAY_MS;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the simulated save delay
pub const SUBMIT_DELAY_ENV: &str = "CLINICA_SUBMIT_DELAY_MS";

/// User configuration, read from `config.json` in the platform config dir
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ClinicConfig {
    /// Shown in the sidebar header
    pub clinic_name: Option<String>,
    /// Recorded as the author of saved clinical records
    pub doctor_name: Option<String>,
    /// Artificial latency of the simulated store
    pub submit_delay_ms: Option<u64>,
    /// Diagram shown first in the affected-area picker
    pub default_body_view: Option<BodyView>,
    /// Day the agenda opens on (`YYYY-MM-DD`)
    pub agenda_start_date: Option<NaiveDate>,
}

impl ClinicConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("br", "clinica", "clinica-tui")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env_override(std::env::var(SUBMIT_DELAY_ENV).ok().as_deref());
        Ok(config)
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Unparsable values are ignored
    fn apply_env_override(&mut self, raw: Option<&str>) {
        if let Some(ms) = raw.and_then(|v| v.trim().parse().ok()) {
            self.submit_delay_ms = Some(ms);
        }
    }

    pub fn clinic_name(&self) -> &str {
        self.clinic_name.as_deref().unwrap_or("MedDash")
    }

    pub fn doctor_name(&self) -> &str {
        self.doctor_name.as_deref().unwrap_or("Dr. Ricardo")
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms.unwrap_or(DEFAULT_DELAY_MS))
    }

    pub fn body_view(&self) -> BodyView {
        self.default_body_view.unwrap_or_default()
    }

    /// Agenda opening day; the sample agenda lives in April 2024
    pub fn agenda_start(&self) -> NaiveDate {
        self.agenda_start_date
            .or_else(|| NaiveDate::from_ymd_opt(2024, 4, 15))
            .unwrap_or_default()
    }
}
