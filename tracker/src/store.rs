//! Durable state for timers and counters.
//!
//! One typed document, one serialize/deserialize boundary. Saves are atomic
//! (temp file + rename) so a crash never leaves a half-written document;
//! loads fall back to defaults on anything missing or corrupt.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{Location, LocationState, SessionStats};

/// Everything that survives a restart, written as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
	pub active: Location,
	pub locations: BTreeMap<Location, LocationState>,
	pub stats: SessionStats,
}

impl Default for PersistedState {
	fn default() -> Self {
		Self {
			active: Location::ALL[0],
			locations: BTreeMap::new(),
			stats: SessionStats::default(),
		}
	}
}

/// File-backed persistence adapter.
pub struct Store {
	path: PathBuf,
}

impl Store {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Load the persisted document, falling back to defaults when the file
	/// is missing or unreadable. The data is advisory, so a corrupt file is
	/// logged and replaced rather than treated as fatal.
	pub fn load_or_default(&self) -> PersistedState {
		match self.try_load() {
			Ok(state) => state,
			Err(err) => {
				tracing::warn!(error = %err, path = %self.path.display(), "failed to load state; starting fresh");
				PersistedState::default()
			}
		}
	}

	pub fn try_load(&self) -> Result<PersistedState> {
		if !self.path.exists() {
			return Ok(PersistedState::default());
		}
		let json = fs::read_to_string(&self.path)
			.with_context(|| format!("read {:?}", self.path))?;
		let state = serde_json::from_str(&json)
			.with_context(|| format!("parse {:?}", self.path))?;
		Ok(state)
	}

	/// Atomically replace the persisted document.
	pub fn save(&self, state: &PersistedState) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
		}
		let json = serde_json::to_string_pretty(state).context("serialize state")?;

		let tmp = self.path.with_extension("json.tmp");
		fs::write(&tmp, json).with_context(|| format!("write {:?}", tmp))?;
		fs::rename(&tmp, &self.path).with_context(|| format!("rename {:?}", tmp))?;
		Ok(())
	}
}
