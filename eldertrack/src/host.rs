//! Contract boundary for host-provided recognition, overlay and alert
//! facilities.
//!
//! Text recognition, overlay drawing and alert sounds are supplied by an
//! external capability (an OCR engine, an in-game overlay plugin, the OS
//! sound stack). The tracker treats all of them as black boxes that may
//! fail or be absent; every call site tolerates a missing result. With no
//! recognition provider attached the app runs in manual-only mode.

use std::sync::Arc;

use xcap::image::RgbaImage;

/// Text recognition over a captured screen region.
pub trait TextRecognizer: Send + Sync {
	/// Recognized text, or `None` when recognition failed this time.
	fn recognize(&self, image: &RgbaImage) -> Option<String>;
}

/// Line-oriented chat box reader.
pub trait ChatReader: Send + Sync {
	/// Latest recognized chat lines, newest last. `None` when the chat box
	/// could not be read this tick.
	fn read_lines(&self) -> Option<Vec<String>>;
}

/// In-game overlay text surface.
pub trait OverlaySink: Send + Sync {
	fn text(&self, message: &str, duration_ms: u64);
	fn clear(&self);
}

/// Audible alert output.
pub trait AlertSounder: Send + Sync {
	/// Short attention beep (pre-alert).
	fn pre_alert(&self);
	/// Distinct completion signal.
	fn completion(&self);
}

/// Bundle of host facilities, each optional.
#[derive(Default, Clone)]
pub struct Host {
	pub recognizer: Option<Arc<dyn TextRecognizer>>,
	pub chat: Option<Arc<dyn ChatReader>>,
	pub overlay: Option<Arc<dyn OverlaySink>>,
	pub sounder: Option<Arc<dyn AlertSounder>>,
}

impl Host {
	/// Discover host facilities. Without an attached provider this yields an
	/// empty bundle and the app degrades to manual timers and manual
	/// location selection.
	pub fn detect() -> Self {
		Self::default()
	}

	pub fn recognition_available(&self) -> bool {
		self.recognizer.is_some() || self.chat.is_some()
	}

	pub fn overlay_text(&self, message: &str, duration_ms: u64) {
		if let Some(overlay) = &self.overlay {
			overlay.text(message, duration_ms);
		}
	}

	pub fn overlay_clear(&self) {
		if let Some(overlay) = &self.overlay {
			overlay.clear();
		}
	}

	pub fn sound_pre_alert(&self) {
		if let Some(sounder) = &self.sounder {
			sounder.pre_alert();
		}
	}

	pub fn sound_completion(&self) {
		if let Some(sounder) = &self.sounder {
			sounder.completion();
		}
	}
}
