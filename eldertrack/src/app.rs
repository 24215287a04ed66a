//! Egui panel and in-game HUD glue.
//!
//! All tracker mutation happens here, on the UI thread: recognition results
//! from the background workers are drained from one channel each repaint
//! tick and applied in arrival order, followed by the timer tick.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracker::util::{fmt_hms, fmt_mmss, group_thousands};
use tracker::{ActiveSource, Event, Ingestor, LineHit, Location, Store, TimerKind, Tracker, now_ms};

use crate::config::Config;
use crate::host::Host;
use crate::poll::{PollSettings, Recognized, SharedSettings, Source, spawn_workers};

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);
/// How long the auto-detect label shows a hit before going back to idle.
const DETECT_IDLE_AFTER_MS: u64 = 5_000;

pub struct App {
	config: Config,
	tracker: Tracker,
	ingestor: Ingestor,
	host: Host,

	recognized_rx: Option<Receiver<Recognized>>,
	poll_settings: SharedSettings,

	status: Option<String>,
	last_detect: Option<(Location, ActiveSource, u64)>,
	import_path: String,
	confirm_reset_stats: bool,
}

fn state_path() -> PathBuf {
	dirs::data_dir()
		.unwrap_or_else(|| PathBuf::from("."))
		.join("eldertrack")
		.join("state.json")
}

impl App {
	pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
		let config = Config::load_or_default();
		let tracker = Tracker::new(Store::new(state_path()), now_ms());

		let host = Host::detect();
		if !host.recognition_available() {
			tracing::warn!("no recognition provider attached; running manual-only");
		}

		let poll_settings: SharedSettings = Arc::new(RwLock::new(PollSettings {
			app_name: config.app_name.clone(),
			chat_poll_s: config.chat_poll_s,
			popup_poll_s: config.popup_poll_s,
			banner_poll_s: config.banner_poll_s,
			minimap_poll_s: config.minimap_poll_s,
		}));
		let recognized_rx = host
			.recognition_available()
			.then(|| spawn_workers(&host, poll_settings.clone()));

		Self {
			config,
			tracker,
			ingestor: Ingestor::new(),
			host,
			recognized_rx,
			poll_settings,
			status: None,
			last_detect: None,
			import_path: String::new(),
			confirm_reset_stats: false,
		}
	}

	fn push_poll_settings(&self) {
		if let Ok(mut settings) = self.poll_settings.write() {
			settings.app_name = self.config.app_name.clone();
			settings.chat_poll_s = self.config.chat_poll_s;
			settings.popup_poll_s = self.config.popup_poll_s;
			settings.banner_poll_s = self.config.banner_poll_s;
			settings.minimap_poll_s = self.config.minimap_poll_s;
		}
	}

	fn note_detection(&mut self, event: Option<Event>, now: u64) {
		if let Some(Event::ActiveLocationChanged { loc, source }) = event {
			self.last_detect = Some((loc, source, now));
			self.status = Some(format!("Location: {loc} ({source})"));
			self.host.overlay_text(&format!("Location: {loc} ({source})"), 1_500);
		}
	}

	fn drain_recognized(&mut self, now: u64) {
		let mut batch = Vec::new();
		if let Some(rx) = &self.recognized_rx {
			while let Ok(rec) = rx.try_recv() {
				batch.push(rec);
			}
		}

		for rec in batch {
			match rec.source {
				Source::Chat => {
					let hits = self.ingestor.chat_frame(&mut self.tracker, &rec.text, now);
					for hit in hits {
						match hit {
							LineHit::GatheringStarted => {
								self.host.overlay_text("Chop 5:00 started", 900);
							}
							LineHit::LogCollected | LineHit::ExperienceGained(_) => {}
						}
					}
				}
				Source::Popup => {
					if self.ingestor.popup(&mut self.tracker, &rec.text, now) {
						self.host.overlay_text("Cooldown 10:00 started", 900);
					}
				}
				Source::Banner => {
					let event = self.ingestor.banner(&mut self.tracker, &rec.text);
					self.note_detection(event, now);
				}
				Source::Minimap => {
					let event = self.ingestor.minimap(&mut self.tracker, &rec.text);
					self.note_detection(event, now);
				}
			}
		}
	}

	fn apply_tick(&mut self, now: u64) {
		let active = self.tracker.active();
		let events = self.tracker.tick(now, self.config.pre_alert_secs);

		for event in events {
			match event {
				Event::TimerCompleted { loc, kind } if loc == active => {
					let message = match kind {
						TimerKind::Gathering => "Chop timer done! Tree depleted",
						TimerKind::Cooldown => "Cooldown done! Tree ready",
					};
					self.status = Some(message.to_string());
					self.host.overlay_text(message, 2_000);
					if self.config.sound {
						self.host.sound_completion();
					}
				}
				Event::TimerCompleted { .. } => {}
				Event::PreAlert { secs_remaining, .. } => {
					let message = format!("Chop ending in {secs_remaining}s");
					self.host.overlay_text(&message, 1_200);
					if self.config.sound {
						self.host.sound_pre_alert();
					}
				}
				Event::ActiveLocationChanged { .. } => {}
			}
		}
	}

	fn draw_hud(&self, now: u64) {
		if !self.config.hud {
			self.host.overlay_clear();
			return;
		}

		let active = self.tracker.active();
		let state = self.tracker.location(active);
		let chop = state
			.chop_secs_left(now)
			.map_or_else(|| "--:--".to_string(), fmt_mmss);
		let cool = state
			.cool_secs_left(now)
			.map_or_else(|| "--:--".to_string(), fmt_mmss);

		self.host.overlay_clear();
		self.host.overlay_text(
			&format!("Elder — {active}\nChop: {chop} | Cool: {cool}"),
			(REPAINT_INTERVAL.as_millis() as u64) * 2,
		);
	}

	fn export_now(&mut self, now: u64) {
		let json = self.tracker.export_json(now);
		let path = state_path()
			.with_file_name(format!("eldertrack-backup-{now}.json"));
		match fs::write(&path, json) {
			Ok(()) => {
				self.status = Some(format!("Exported to {}", path.display()));
				self.host.overlay_text("Data exported", 1_000);
			}
			Err(err) => self.status = Some(format!("Export failed: {err}")),
		}
	}

	fn import_now(&mut self, now: u64) {
		let path = self.import_path.trim().to_string();
		if path.is_empty() {
			self.status = Some("Enter a backup file path first".to_string());
			return;
		}
		let result = fs::read_to_string(&path)
			.map_err(anyhow::Error::from)
			.and_then(|json| self.tracker.import_json(&json));
		match result {
			Ok(event) => {
				self.note_detection(event, now);
				self.status = Some("Data imported".to_string());
				self.host.overlay_text("Data imported", 1_500);
			}
			Err(err) => self.status = Some(format!("Import failed: {err:#}")),
		}
	}

	fn ui_location_card(&mut self, ui: &mut egui::Ui, loc: Location, now: u64) {
		let active = self.tracker.active() == loc;
		let state = self.tracker.location(loc);
		let chop = state
			.chop_secs_left(now)
			.map_or_else(|| "—:—".to_string(), fmt_mmss);
		let cool = state
			.cool_secs_left(now)
			.map_or_else(|| "—:—".to_string(), fmt_mmss);
		let logs = group_thousands(state.logs);
		let xp = group_thousands(state.xp.round().max(0.0) as u64);

		ui.group(|ui| {
			ui.horizontal(|ui| {
				let heading = egui::RichText::new(loc.name()).strong();
				let heading = if active {
					heading.color(egui::Color32::LIGHT_BLUE)
				} else {
					heading
				};
				ui.label(heading);
				if !active && ui.small_button("activate").clicked() {
					let event = self.tracker.set_active(loc, ActiveSource::Manual);
					self.note_detection(event, now);
				}
			});
			ui.horizontal(|ui| {
				ui.label(format!("Chop: {chop}"));
				ui.label(format!("Cool: {cool}"));
				ui.label(format!("Logs: {logs}"));
				ui.label(format!("XP: {xp}"));
			});
		});
	}

	fn ui_controls(&mut self, ui: &mut egui::Ui, now: u64) {
		ui.horizontal(|ui| {
			if ui.button("Force chop 5:00").clicked() {
				let loc = self.tracker.active();
				self.tracker.start_gathering(loc, now);
				self.host.overlay_text("Chop 5:00 started", 900);
			}
			if ui.button("Force cooldown 10:00").clicked() {
				let loc = self.tracker.active();
				self.tracker.start_cooldown(loc, now);
				self.host.overlay_text("Cooldown 10:00 started", 900);
			}
			if ui.button("Reset timers & counters").clicked() {
				self.tracker.reset_locations();
			}
		});
	}

	fn ui_stats(&mut self, ui: &mut egui::Ui, now: u64) {
		let stats = self.tracker.stats();
		ui.horizontal(|ui| {
			ui.label(format!("Session: {}", fmt_hms(now.saturating_sub(stats.session_start))));
			ui.label(format!("Chops: {}", group_thousands(stats.total_chops)));
			ui.label(format!("Logs: {}", group_thousands(stats.total_logs)));
			ui.label(format!("XP: {}", group_thousands(stats.total_xp.round().max(0.0) as u64)));
		});

		let label = if self.confirm_reset_stats {
			"Really reset stats?"
		} else {
			"Reset stats"
		};
		if ui.button(label).clicked() {
			if self.confirm_reset_stats {
				self.tracker.reset_stats(now);
				self.confirm_reset_stats = false;
				self.status = Some("Stats reset".to_string());
				self.host.overlay_text("Stats reset", 1_000);
			} else {
				self.confirm_reset_stats = true;
			}
		}
	}

	fn ui_buffs(&mut self, ui: &mut egui::Ui) {
		let buffs = &mut self.config.buffs;
		let mut changed = false;
		ui.horizontal_wrapped(|ui| {
			changed |= ui.checkbox(&mut buffs.juju, "Juju potion").changed();
			changed |= ui.checkbox(&mut buffs.beaver, "Beaver").changed();
			changed |= ui.checkbox(&mut buffs.sentinel, "Sentinel").changed();
			changed |= ui.checkbox(&mut buffs.torch, "Torch").changed();
			changed |= ui.checkbox(&mut buffs.cape, "Skillcape").changed();
			changed |= ui.checkbox(&mut buffs.aura, "Aura").changed();
		});
		if changed {
			self.save_config();
		}
	}

	fn ui_settings(&mut self, ui: &mut egui::Ui) {
		let mut changed = false;

		ui.horizontal(|ui| {
			ui.label("Game window:");
			changed |= ui
				.text_edit_singleline(&mut self.config.app_name)
				.lost_focus();
		});

		changed |= ui.checkbox(&mut self.config.hud, "In-game HUD overlay").changed();
		changed |= ui.checkbox(&mut self.config.sound, "Alert sounds").changed();

		ui.horizontal(|ui| {
			ui.label("Pre-alert seconds:");
			changed |= ui
				.add(egui::DragValue::new(&mut self.config.pre_alert_secs).range(1..=60))
				.changed();
		});

		if changed {
			self.save_config();
		}
	}

	fn ui_backup(&mut self, ui: &mut egui::Ui, now: u64) {
		ui.horizontal(|ui| {
			if ui.button("Export backup").clicked() {
				self.export_now(now);
			}
		});
		ui.horizontal(|ui| {
			ui.label("Import from:");
			ui.text_edit_singleline(&mut self.import_path);
			if ui.button("Import").clicked() {
				self.import_now(now);
			}
		});
	}

	fn save_config(&mut self) {
		if let Err(err) = self.config.save() {
			tracing::warn!(error = %err, "failed to save config");
		}
		self.push_poll_settings();
	}

	fn auto_detect_label(&self, now: u64) -> String {
		match self.last_detect {
			Some((loc, source, at)) if now.saturating_sub(at) < DETECT_IDLE_AFTER_MS => {
				format!("auto: ✔ {loc} ({source})")
			}
			_ if self.recognized_rx.is_some() => "auto: idle…".to_string(),
			_ => "auto: off (manual-only)".to_string(),
		}
	}
}

impl eframe::App for App {
	fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
		ctx.request_repaint_after(REPAINT_INTERVAL);

		let now = now_ms();
		self.drain_recognized(now);
		self.apply_tick(now);
		self.draw_hud(now);

		egui::CentralPanel::default().show(ctx, |ui| {
			ui.horizontal(|ui| {
				ui.heading("Elder Tracker");
				ui.label(self.auto_detect_label(now));
			});
			if self.recognized_rx.is_none() {
				ui.label(
					egui::RichText::new(
						"No recognition provider attached — timers and locations are manual.",
					)
					.weak(),
				);
			}
			ui.separator();

			for loc in Location::ALL {
				self.ui_location_card(ui, loc, now);
			}

			ui.separator();
			self.ui_controls(ui, now);

			ui.separator();
			self.ui_stats(ui, now);

			egui::CollapsingHeader::new("Buffs").show(ui, |ui| self.ui_buffs(ui));
			egui::CollapsingHeader::new("Settings").show(ui, |ui| self.ui_settings(ui));
			egui::CollapsingHeader::new("Backup").show(ui, |ui| self.ui_backup(ui, now));

			if let Some(status) = &self.status {
				ui.separator();
				ui.label(status);
			}
		});
	}
}
