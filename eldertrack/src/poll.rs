//! Fixed-interval recognition workers.
//!
//! One background worker per recognition source. Each sleeps its interval,
//! captures its screen region (or reads the chat box), runs recognition and
//! forwards the text over a single channel. The UI thread drains that
//! channel in arrival order, so all tracker mutation stays on one logical
//! timeline. A worker whose provider returns nothing simply skips that
//! tick; a worker whose receiver is gone exits.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use crate::capture::{self, Region, WindowBounds};
use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
	Chat,
	Popup,
	Banner,
	Minimap,
}

/// One recognition result, ready for ingestion.
#[derive(Debug, Clone)]
pub struct Recognized {
	pub source: Source,
	pub text: String,
}

/// Live-updatable knobs shared with the workers.
#[derive(Debug, Clone)]
pub struct PollSettings {
	pub app_name: String,
	pub chat_poll_s: f32,
	pub popup_poll_s: f32,
	pub banner_poll_s: f32,
	pub minimap_poll_s: f32,
}

pub type SharedSettings = Arc<RwLock<PollSettings>>;

fn interval_of(settings: &SharedSettings, pick: fn(&PollSettings) -> f32) -> Duration {
	let secs = settings
		.read()
		.map(|s| pick(&s))
		.unwrap_or(1.0)
		.max(0.1);
	Duration::from_secs_f32(secs)
}

fn app_name_of(settings: &SharedSettings) -> String {
	settings
		.read()
		.map(|s| s.app_name.clone())
		.unwrap_or_default()
}

/// Spawn a worker for every facility the host actually provides and return
/// the shared event channel.
pub fn spawn_workers(host: &Host, settings: SharedSettings) -> Receiver<Recognized> {
	let (tx, rx) = channel();

	if let Some(chat) = host.chat.clone() {
		let settings = settings.clone();
		let tx = tx.clone();
		thread::spawn(move || {
			loop {
				thread::sleep(interval_of(&settings, |s| s.chat_poll_s));
				let Some(lines) = chat.read_lines() else {
					continue;
				};
				if lines.is_empty() {
					continue;
				}
				let event = Recognized {
					source: Source::Chat,
					text: lines.join("\n"),
				};
				if tx.send(event).is_err() {
					return;
				}
			}
		});
	}

	if let Some(recognizer) = host.recognizer.clone() {
		spawn_region_worker(
			Source::Popup,
			recognizer.clone(),
			settings.clone(),
			|s| s.popup_poll_s,
			capture::popup_region,
			tx.clone(),
		);
		spawn_region_worker(
			Source::Banner,
			recognizer.clone(),
			settings.clone(),
			|s| s.banner_poll_s,
			capture::banner_region,
			tx.clone(),
		);
		spawn_region_worker(
			Source::Minimap,
			recognizer,
			settings,
			|s| s.minimap_poll_s,
			capture::minimap_region,
			tx,
		);
	}

	rx
}

fn spawn_region_worker(
	source: Source,
	recognizer: Arc<dyn crate::host::TextRecognizer>,
	settings: SharedSettings,
	interval: fn(&PollSettings) -> f32,
	region: fn(WindowBounds) -> Region,
	tx: Sender<Recognized>,
) {
	thread::spawn(move || {
		loop {
			thread::sleep(interval_of(&settings, interval));

			let app_name = app_name_of(&settings);
			let Some(bounds) = capture::window_bounds(&app_name) else {
				continue;
			};
			let Some(image) = capture::capture_region(&app_name, region(bounds)) else {
				continue;
			};
			let Some(text) = recognizer.recognize(&image) else {
				continue;
			};
			if text.trim().is_empty() {
				continue;
			}

			if tx.send(Recognized { source, text }).is_err() {
				return;
			}
		}
	});
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::ChatReader;
	use std::sync::Mutex;

	struct ScriptedChat {
		frames: Mutex<Vec<Option<Vec<String>>>>,
	}

	impl ChatReader for ScriptedChat {
		fn read_lines(&self) -> Option<Vec<String>> {
			self.frames.lock().unwrap().pop().flatten()
		}
	}

	#[test]
	fn chat_worker_forwards_frames_and_skips_failures() {
		let chat = Arc::new(ScriptedChat {
			// Popped back-to-front: a failed read, then a real frame.
			frames: Mutex::new(vec![
				Some(vec!["You get some elder logs.".to_string()]),
				None,
			]),
		});
		let host = Host {
			chat: Some(chat),
			..Host::default()
		};
		let settings = Arc::new(RwLock::new(PollSettings {
			app_name: String::new(),
			chat_poll_s: 0.0, // clamped to the 0.1s floor
			popup_poll_s: 1.0,
			banner_poll_s: 1.0,
			minimap_poll_s: 1.0,
		}));

		let rx = spawn_workers(&host, settings);
		let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
		assert_eq!(event.source, Source::Chat);
		assert_eq!(event.text, "You get some elder logs.");
	}
}
