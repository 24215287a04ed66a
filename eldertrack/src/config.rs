//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Temporary skilling buffs the user ticks off by hand. Purely informational;
/// persisted so the checklist survives restarts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Buffs {
    pub juju: bool,
    pub beaver: bool,
    pub sentinel: bool,
    pub torch: bool,
    pub cape: bool,
    pub aura: bool,
}

/// On-disk configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target game window application name (from `xcap::Window::app_name()`).
    ///
    /// This is reasonably stable across restarts. If multiple windows share
    /// the same app name, the first match is used.
    pub app_name: String,

    /// Poll interval (seconds) for the chat reader.
    pub chat_poll_s: f32,
    /// Poll interval (seconds) for the center depletion popup.
    pub popup_poll_s: f32,
    /// Poll interval (seconds) for the area-name banner.
    pub banner_poll_s: f32,
    /// Poll interval (seconds) for the minimap label fallback.
    pub minimap_poll_s: f32,

    /// Draw the in-game HUD for the active location.
    pub hud: bool,
    /// Audible alerts on completions and pre-alerts.
    pub sound: bool,
    /// Seconds before a chop timer ends to fire the pre-alert (clamped 1..=60).
    pub pre_alert_secs: u64,

    pub buffs: Buffs,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "rs2client".to_string(),
            chat_poll_s: 0.4,
            popup_poll_s: 0.9,
            banner_poll_s: 2.5,
            minimap_poll_s: 3.0,
            hud: false,
            sound: true,
            pre_alert_secs: 10,
            buffs: Buffs::default(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("eldertrack.json"))
    }

    /// Load configuration from disk, falling back to defaults on missing file.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }
}
