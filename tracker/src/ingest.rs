//! Interpretation of recognized game text.
//!
//! Chat lines, popup text and banner/minimap text each arrive from their own
//! polling trigger; this module translates them into tracker operations.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ActiveSource, Event, Tracker, resolve_location};

static CHOP_STARTED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\byou begin to swipe at the tree\b").unwrap());

static LOG_COLLECTED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\byou get (some|an?) elder log").unwrap());

// Looser fallback for OCR splitting the pickup message oddly.
static LOG_COLLECTED_LOOSE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)elder logs?").unwrap());

static XP_GAINED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3}(?:,\d{3})*(?:\.\d+)?)\s+XP\b").unwrap());

static TREE_DEPLETED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)no branches.*regrow shortly").unwrap());

/// A rule that fired on a chat line. Used by the UI for status/overlay
/// feedback; the tracker mutation has already happened.
#[derive(Debug, Clone, PartialEq)]
pub enum LineHit {
	GatheringStarted,
	LogCollected,
	ExperienceGained(f64),
}

/// Stateful ingestion front-end.
///
/// Holds the last processed chat line so an identical recognized frame is
/// not applied twice (chat only; popup and banner/minimap debounce through
/// their polling intervals).
#[derive(Debug, Default)]
pub struct Ingestor {
	last_line: String,
}

impl Ingestor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Process a whole recognized chat frame: only the newest non-empty line
	/// is considered.
	pub fn chat_frame(&mut self, tracker: &mut Tracker, text: &str, now: u64) -> Vec<LineHit> {
		let Some(line) = text.lines().filter(|l| !l.trim().is_empty()).last() else {
			return Vec::new();
		};
		self.chat_line(tracker, line, now)
	}

	/// Apply the chat pattern rules to one recognized line.
	pub fn chat_line(&mut self, tracker: &mut Tracker, line: &str, now: u64) -> Vec<LineHit> {
		if line.is_empty() || line == self.last_line {
			return Vec::new();
		}
		self.last_line = line.to_string();

		let loc = tracker.active();
		let mut hits = Vec::new();

		if CHOP_STARTED.is_match(line) {
			tracker.start_gathering(loc, now);
			hits.push(LineHit::GatheringStarted);
		}

		if LOG_COLLECTED.is_match(line)
			|| (line.to_lowercase().contains("you get") && LOG_COLLECTED_LOOSE.is_match(line))
		{
			tracker.record_collection(loc);
			hits.push(LineHit::LogCollected);
		}

		if let Some(caps) = XP_GAINED.captures(line) {
			// Strip thousands separators before parsing. Anything that still
			// fails to parse is dropped silently.
			let digits = caps[1].replace(',', "");
			if let Ok(amount) = digits.parse::<f64>() {
				tracker.record_experience(loc, amount);
				hits.push(LineHit::ExperienceGained(amount));
			}
		}

		if !hits.is_empty() {
			tracing::debug!(line, ?hits, "chat line matched");
		}
		hits
	}

	/// Recognized center-popup text. Returns true when the depletion message
	/// started a cooldown.
	pub fn popup(&mut self, tracker: &mut Tracker, text: &str, now: u64) -> bool {
		if TREE_DEPLETED.is_match(text) {
			let loc = tracker.active();
			tracker.start_cooldown(loc, now);
			true
		} else {
			false
		}
	}

	/// Recognized area banner text; a resolver hit switches the active location.
	pub fn banner(&mut self, tracker: &mut Tracker, text: &str) -> Option<Event> {
		let loc = resolve_location(text)?;
		tracker.set_active(loc, ActiveSource::Banner)
	}

	/// Recognized minimap label text (fallback detection path).
	pub fn minimap(&mut self, tracker: &mut Tracker, text: &str) -> Option<Event> {
		let loc = resolve_location(text)?;
		tracker.set_active(loc, ActiveSource::Minimap)
	}
}
